use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    auth::{AuthForm, Page},
    error::Error,
    form::{Field, TaskForm},
    kanban_board::{Card, KanbanBoard},
    store::Storage,
    task::{self, Priority, Status},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterInput {
    Search,
    DueFrom,
    DueTo,
}

impl FilterInput {
    pub fn label(self) -> &'static str {
        match self {
            FilterInput::Search => "Search",
            FilterInput::DueFrom => "Due from (YYYY-MM-DD, empty to clear)",
            FilterInput::DueTo => "Due to (YYYY-MM-DD, empty to clear)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Task(TaskForm),
    ConfirmDelete,
    Filter { input: FilterInput, value: String },
}

/// A status change waiting out its fade before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub task_id: String,
    pub status: Status,
    pub due: Instant,
}

#[derive(Debug)]
pub struct App<S> {
    pub page: Page,
    pub signup: AuthForm,
    pub login: AuthForm,
    pub board: KanbanBoard<S>,
    pub modal: Option<Modal>,
    /// Blocking message; swallows input until dismissed.
    pub notice: Option<String>,
    pub selected_status: usize,
    pub selected_task: usize,
    pub transition: Option<Transition>,
    pub transition_delay: Duration,
    pub should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(board: KanbanBoard<S>, page: Page, transition_delay: Duration) -> Self {
        Self {
            page,
            signup: AuthForm::signup(),
            login: AuthForm::login(),
            board,
            modal: None,
            notice: None,
            selected_status: 0,
            selected_task: 0,
            transition: None,
            transition_delay,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.notice = None;
            }
            return;
        }
        if let Some(modal) = self.modal.take() {
            self.modal = self.handle_modal_key(modal, key);
            self.clamp_selection();
            return;
        }
        match self.page {
            Page::Signup | Page::Login => self.handle_auth_key(key),
            Page::Dashboard => self.handle_board_key(key, now),
        }
        self.clamp_selection();
    }

    /// Commits a pending status change once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.transition.as_ref().is_some_and(|t| t.due <= now) {
            self.commit_transition();
        }
    }

    /// A status change still fading lands before the loop exits.
    pub fn quit(&mut self) {
        self.commit_transition();
        self.should_quit = true;
    }

    pub fn navigate(&mut self, page: Page) {
        tracing::debug!(from = ?self.page, to = ?page, "Navigating");
        self.page = page;
    }

    fn notify(&mut self, err: Error) {
        self.notice = Some(err.to_string());
    }

    fn handle_auth_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let page = self.page;
        let form = match page {
            Page::Signup => &mut self.signup,
            _ => &mut self.login,
        };
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('l') if ctrl && page == Page::Signup => self.navigate(Page::Login),
            KeyCode::Char('s') if ctrl && page == Page::Login => self.navigate(Page::Signup),
            KeyCode::Tab | KeyCode::Down => form.focus_next(1),
            KeyCode::BackTab | KeyCode::Up => form.focus_next(-1),
            KeyCode::Enter => match form.submit() {
                Ok(next) => {
                    form.reset();
                    self.navigate(next);
                }
                Err(err) => self.notify(err),
            },
            _ => {
                if let Some(value) = form.focused_mut() {
                    edit_text(value, key);
                }
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('l') => self.navigate(Page::Login),
            KeyCode::Char('a') => self.modal = Some(Modal::Task(TaskForm::create())),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.selected_card().and_then(|c| self.board.get(&c.id)) {
                    self.modal = Some(Modal::Task(TaskForm::edit(task)));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(card) = self.selected_card() {
                    self.board.request_delete(&card.id);
                    self.modal = Some(Modal::ConfirmDelete);
                }
            }
            KeyCode::Char('[') => self.shift_selected(-1, now),
            KeyCode::Char(']') => self.shift_selected(1, now),
            KeyCode::Char(c @ '1'..='3') => {
                let status = Status::ALL[c as usize - '1' as usize];
                if let Some(card) = self.selected_card() {
                    self.start_transition(card.id, status, now);
                }
            }
            KeyCode::Char('/') => {
                self.modal = Some(Modal::Filter {
                    input: FilterInput::Search,
                    value: self.board.filters().search.clone(),
                })
            }
            KeyCode::Char('f') => {
                self.modal = Some(Modal::Filter {
                    input: FilterInput::DueFrom,
                    value: self.board.filters().due_from.map(task::format_date).unwrap_or_default(),
                })
            }
            KeyCode::Char('t') => {
                self.modal = Some(Modal::Filter {
                    input: FilterInput::DueTo,
                    value: self.board.filters().due_to.map(task::format_date).unwrap_or_default(),
                })
            }
            KeyCode::Char('s') => {
                let filters = self.board.filters_mut();
                filters.status = filters.status.cycled(&Status::ALL);
            }
            KeyCode::Char('p') => {
                let filters = self.board.filters_mut();
                filters.priority = filters.priority.cycled(&Priority::ALL);
            }
            KeyCode::Char('c') => self.board.filters_mut().clear(),
            KeyCode::Left => self.selected_status = self.selected_status.saturating_sub(1),
            KeyCode::Right => {
                self.selected_status = (self.selected_status + 1).min(Status::ALL.len() - 1)
            }
            KeyCode::Up => self.selected_task = self.selected_task.saturating_sub(1),
            KeyCode::Down => self.selected_task += 1,
            _ => {}
        }
    }

    /// Returns the modal to keep open, if any.
    fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
        match modal {
            Modal::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    if let Err(err) = self.board.confirm_delete() {
                        self.notify(err);
                    }
                    None
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.board.cancel_delete();
                    None
                }
                _ => Some(Modal::ConfirmDelete),
            },
            Modal::Task(form) => self.handle_form_key(form, key),
            Modal::Filter { input, value } => self.handle_filter_key(input, value, key),
        }
    }

    fn handle_form_key(&mut self, mut form: TaskForm, key: KeyEvent) -> Option<Modal> {
        match key.code {
            KeyCode::Esc => return None,
            KeyCode::Tab | KeyCode::Down => form.focus_next(1),
            KeyCode::BackTab | KeyCode::Up => form.focus_next(-1),
            KeyCode::Enter => {
                let saved = form.draft().and_then(|draft| self.board.upsert(draft));
                match saved {
                    Ok(_) => return None,
                    Err(err) => self.notify(err),
                }
            }
            KeyCode::Left if form.focus == Field::Priority => {
                form.priority = form.priority.cycled(-1)
            }
            KeyCode::Right | KeyCode::Char(' ') if form.focus == Field::Priority => {
                form.priority = form.priority.cycled(1)
            }
            _ => {
                if let Some(value) = form.focused_text_mut() {
                    edit_text(value, key);
                }
            }
        }
        Some(Modal::Task(form))
    }

    fn handle_filter_key(
        &mut self,
        input: FilterInput,
        mut value: String,
        key: KeyEvent,
    ) -> Option<Modal> {
        match (input, key.code) {
            (FilterInput::Search, KeyCode::Enter | KeyCode::Esc) => return None,
            (FilterInput::Search, _) => {
                // Search narrows the board as it is typed.
                edit_text(&mut value, key);
                self.board.filters_mut().search = value.clone();
            }
            (_, KeyCode::Esc) => return None,
            (_, KeyCode::Enter) => {
                let raw = value.trim();
                let bound = if raw.is_empty() {
                    None
                } else {
                    match task::parse_date(raw) {
                        Some(date) => Some(date),
                        None => {
                            self.notify(Error::InvalidDate(raw.to_string()));
                            return Some(Modal::Filter { input, value });
                        }
                    }
                };
                let filters = self.board.filters_mut();
                match input {
                    FilterInput::DueFrom => filters.due_from = bound,
                    _ => filters.due_to = bound,
                }
                return None;
            }
            _ => edit_text(&mut value, key),
        }
        Some(Modal::Filter { input, value })
    }

    pub fn selected_card(&self) -> Option<Card> {
        let lanes = self.board.lanes();
        lanes
            .get(Status::ALL[self.selected_status])
            .get(self.selected_task)
            .cloned()
    }

    fn clamp_selection(&mut self) {
        let len = self.board.lanes().get(Status::ALL[self.selected_status]).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn shift_selected(&mut self, direction: isize, now: Instant) {
        if let Some(card) = self.selected_card() {
            self.start_transition(card.id, card.status.shifted(direction), now);
        }
    }

    /// Queues a status change; any change already waiting is committed first.
    pub fn start_transition(&mut self, task_id: String, status: Status, now: Instant) {
        if self.transition.is_some() {
            self.commit_transition();
        }
        if self.board.get(&task_id).map_or(true, |t| t.status == status) {
            return;
        }
        self.transition = Some(Transition {
            task_id,
            status,
            due: now + self.transition_delay,
        });
    }

    fn commit_transition(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        if let Err(err) = self.board.change_status(&transition.task_id, transition.status) {
            self.notify(err);
        }
        self.clamp_selection();
    }

    pub fn is_fading(&self, task_id: &str) -> bool {
        self.transition.as_ref().is_some_and(|t| t.task_id == task_id)
    }
}

fn edit_text(value: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            value.pop();
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            value.push(c)
        }
        _ => {}
    }
}
