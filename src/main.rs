use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use taskflow::{
    app::App,
    config::{self, Config},
    kanban_board::KanbanBoard,
    logging,
    store::{FileStorage, TaskStore},
    ui,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = config::command().get_matches();
    let config = Config::from_matches(&matches)?;
    logging::init(&config)?;

    // Board setup
    let store = TaskStore::with_key(FileStorage::new(&config.data_dir), config.storage_key.clone());
    let board = KanbanBoard::open(store)?;
    let mut app = App::new(board, config.start_page, config.transition());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!("Terminal loop failed: {err}");
    }
    tracing::info!("Exiting");
    Ok(result?)
}
