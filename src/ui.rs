use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::{
    app::{App, Modal},
    auth::{AuthForm, Page},
    form::{Field, TaskForm},
    kanban_board::Card,
    store::Storage,
    task,
};

const POLL_INTERVAL: Duration = Duration::from_millis(30);

const SIGNUP_HINT: &str = "Enter: create account  Ctrl-L: log in instead  Esc: quit";
const LOGIN_HINT: &str = "Enter: log in  Ctrl-S: sign up instead  Esc: quit";
const BOARD_HINT: &str = "a add  e edit  d delete  [ ] move  1-3 status  / search  \
                          s status  p priority  f/t due  c clear  l logout  q quit";

pub fn run_app<B: Backend, S: Storage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw<S: Storage>(f: &mut Frame, app: &App<S>) {
    match app.page {
        Page::Signup => draw_auth(f, &app.signup, "Sign up", SIGNUP_HINT),
        Page::Login => draw_auth(f, &app.login, "Log in", LOGIN_HINT),
        Page::Dashboard => draw_board(f, app),
    }

    match &app.modal {
        Some(Modal::Task(form)) => draw_task_form(f, form),
        Some(Modal::ConfirmDelete) => draw_popup(
            f,
            "Confirm",
            vec![
                Line::from("Delete this task permanently?"),
                Line::from(""),
                Line::from("y: yes   n: no"),
            ],
            Color::Red,
        ),
        Some(Modal::Filter { input, value }) => draw_popup(
            f,
            input.label(),
            vec![
                Line::from(format!("{value}_")),
                Line::from(""),
                Line::from("Enter: apply  Esc: close"),
            ],
            Color::Cyan,
        ),
        None => {}
    }

    if let Some(notice) = &app.notice {
        draw_popup(
            f,
            "Notice",
            vec![Line::from(notice.as_str()), Line::from(""), Line::from("Enter: dismiss")],
            Color::Red,
        );
    }
}

fn draw_auth(f: &mut Frame, form: &AuthForm, title: &str, hint: &str) {
    let mut lines = Vec::new();
    for (i, input) in form.inputs.iter().enumerate() {
        let focused = i == form.focus;
        lines.push(Line::from(Span::styled(
            input.label,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("{}{}", input.display(), if focused { "_" } else { "" }),
            field_style(focused),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

    let area = centered_rect(60, lines.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn draw_board<S: Storage>(f: &mut Frame, app: &App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    f.render_widget(filter_bar(app), rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[1]);

    for (status, cards) in app.board.lanes().iter() {
        let i = status.index();
        let selected = app.selected_status == i;
        let items: Vec<ListItem> = cards
            .iter()
            .map(|card| card_item(card, app.is_fading(&card.id)))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status.label(), cards.len()))
                    .borders(Borders::ALL)
                    .border_style(if selected {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if selected && !cards.is_empty() {
            state.select(Some(app.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            BOARD_HINT,
            Style::default().fg(Color::DarkGray),
        ))),
        rows[2],
    );
}

fn filter_bar<S: Storage>(app: &App<S>) -> Paragraph<'static> {
    let filters = app.board.filters();
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(task::format_date)
            .unwrap_or_else(|| "-".to_string())
    };
    let text = format!(
        "Search: {}  Status: {}  Priority: {}  Due: {} .. {}",
        if filters.search.is_empty() { "-" } else { filters.search.as_str() },
        filters.status,
        filters.priority,
        date(filters.due_from),
        date(filters.due_to),
    );
    let style = if filters.is_active() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Paragraph::new(Line::from(Span::styled(text, style)))
        .block(Block::default().title("Filters").borders(Borders::ALL))
}

fn card_item(card: &Card, fading: bool) -> ListItem<'static> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}]", card.badge), badge_style(&card.badge_class)),
        Span::raw(" "),
        Span::styled(card.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
    ])];
    if !card.description.is_empty() {
        lines.push(Line::from(card.description.clone()));
    }
    lines.push(Line::from(Span::styled(
        card.due_label.clone(),
        Style::default().fg(Color::DarkGray),
    )));

    let item = ListItem::new(lines);
    if fading {
        item.style(Style::default().add_modifier(Modifier::DIM))
    } else {
        item
    }
}

fn badge_style(class: &str) -> Style {
    let color = match class {
        "priority-high" => Color::Red,
        "priority-low" => Color::Green,
        _ => Color::Yellow,
    };
    Style::default().fg(color)
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_task_form(f: &mut Frame, form: &TaskForm) {
    let mut lines = Vec::new();
    for field in Field::ALL {
        let focused = form.focus == field;
        let marker = if focused { "> " } else { "  " };
        let value = match field {
            Field::Priority => format!("< {} >", form.priority),
            _ => format!("{}{}", form.value(field), if focused { "_" } else { "" }),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{}: ", field.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, field_style(focused)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab: next field  Enter: save  Esc: close",
        Style::default().fg(Color::DarkGray),
    )));
    draw_popup(f, form.heading(), lines, Color::Cyan);
}

fn draw_popup(f: &mut Frame, title: &str, lines: Vec<Line>, color: Color) {
    let area = centered_rect(64, lines.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        ),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
