//! Terminal User Interface Module
//!
//! Provides the terminal interface for the docvars client.
//! Built with Ratatui for high-performance terminal rendering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  📄 DocVars PDF Variable Extractor              127.0.0.1:8000  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─ Pipeline ──────────────────────────────────────────────┐    │
//! │  │ ✓ Select → ● Analyze → ○ Review   attempt 2/3           │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │  ┌─ Document ──────────┐ ┌─ Extracted Variables ──────────┐    │
//! │  │ report.pdf          │ │ # Field Name  Value  Type  ...  │    │
//! │  │ 2 pages, 148.2 KB   │ │ 1 Invoice No  42     int   ...  │    │
//! │  │ [first-page text]   │ │ 2 Total       100.0  money ...  │    │
//! │  └─────────────────────┘ └────────────────────────────────┘    │
//! │  Ready │ [o] Open [Enter] Analyze [r] Refine [?] Help          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod picker;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, TableCursor, View};
pub use event::{AppAction, EventHandler};
pub use picker::{EntryKind, FilePicker, PickerEntry};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: crate::config::Config, initial_pdf: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    // Create application state before touching the terminal, so a
    // config or client error surfaces as a normal message.
    let mut app = App::new(config, initial_pdf)?;

    let mut terminal = init_terminal()?;

    // Create event handler
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    // Main loop
    let result = run_app(&mut terminal, &mut app, &mut events).await;

    // Restore terminal
    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        // Draw UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle async events from the request tasks
        app.poll_events();

        // Handle user input
        if let Some(action) = events.try_next().await {
            app.handle_action(action);
        }

        if app.should_quit {
            break;
        }

        // Small yield to prevent busy loop
        tokio::task::yield_now().await;
    }

    info!("TUI exited normally");
    Ok(())
}
