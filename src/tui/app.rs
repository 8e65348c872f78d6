//! Application State
//!
//! Contains the main application state and logic for the TUI.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::warn;
use tui_textarea::CursorMove;

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::{AnalysisResult, VariableField, VariableRecord};
use crate::pdf::{PdfPreview, SelectedPdf};
use crate::session::Session;
use crate::tui::event::AppAction;
use crate::tui::picker::FilePicker;
use crate::tui::widgets::CellEditor;

/// Rows jumped by PageUp/PageDown in the table.
const TABLE_PAGE_JUMP: usize = 10;

/// Current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    Picker,
    #[default]
    Workspace,
    Help,
}

/// Focused cell of the variables table.
#[derive(Debug, Clone, Copy)]
pub struct TableCursor {
    pub row: usize,
    pub field: VariableField,
}

impl Default for TableCursor {
    fn default() -> Self {
        Self {
            row: 0,
            field: VariableField::FieldName,
        }
    }
}

/// Events from the async request tasks
#[derive(Debug)]
pub enum AppEvent {
    /// Analysis upload attempt started (1-based)
    AnalyzeAttempt(u32),
    AnalyzeComplete(AnalysisResult),
    AnalyzeFailed(String),
    RefineComplete(Vec<VariableRecord>),
    RefineFailed(String),
}

/// Main application state
pub struct App {
    // Configuration
    pub config: Config,
    api: ApiClient,

    // Session State
    pub session: Session,

    // UI State
    pub view: View,
    pub should_quit: bool,
    pub picker: FilePicker,
    pub cursor: TableCursor,
    pub editor: Option<CellEditor>,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance. A PDF passed on the command
    /// line is selected immediately and the picker is skipped.
    pub fn new(config: Config, initial_pdf: Option<PathBuf>) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let start_dir = std::env::current_dir()
            .ok()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let picker = FilePicker::new(start_dir);
        let (tx, rx) = mpsc::channel(100);

        let mut app = Self {
            config,
            api,
            session: Session::new(),
            view: View::Picker,
            should_quit: false,
            picker,
            cursor: TableCursor::default(),
            editor: None,
            event_rx: rx,
            event_tx: tx,
        };

        if let Some(path) = initial_pdf {
            app.select_path(&path);
            app.view = View::Workspace;
        }
        Ok(app)
    }

    /// Validate and select the file at `path`.
    pub fn select_path(&mut self, path: &Path) {
        match SelectedPdf::load(path) {
            Ok(pdf) => {
                let preview = match PdfPreview::build(&pdf) {
                    Ok(preview) => Some(preview),
                    Err(err) => {
                        warn!("Preview unavailable for {}: {}", pdf.filename, err);
                        None
                    }
                };
                if self.session.select_pdf(pdf, preview) {
                    self.cursor = TableCursor::default();
                }
            }
            Err(err) => {
                warn!("Selection rejected: {}", err);
                self.session.reject_selection(err.to_string());
            }
        }
    }

    /// Poll for async events
    pub fn poll_events(&mut self) {
        // Collect events first to avoid borrow checker issues
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.handle_event(event);
        }
    }

    /// Handle an async event
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AnalyzeAttempt(attempt) => self.session.analyze_attempt(attempt),
            AppEvent::AnalyzeComplete(result) => {
                self.session.complete_analyze(result);
                self.cursor = TableCursor::default();
            }
            AppEvent::AnalyzeFailed(message) => self.session.fail_analyze(&message),
            AppEvent::RefineComplete(variables) => {
                self.session.complete_refine(variables);
                self.clamp_cursor();
            }
            AppEvent::RefineFailed(message) => self.session.fail_refine(&message),
        }
    }

    /// Handle a user action
    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => self.handle_submit(),
            AppAction::ToggleHelp => {
                if self.editor.is_none() {
                    self.view = if self.view == View::Help {
                        View::Workspace
                    } else {
                        View::Help
                    };
                }
            }
            AppAction::Escape => self.handle_escape(),
            AppAction::CursorUp => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.move_cursor(CursorMove::Up);
                } else {
                    match self.view {
                        View::Picker => self.picker.move_up(),
                        _ => self.move_row_up(1),
                    }
                }
            }
            AppAction::CursorDown => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.move_cursor(CursorMove::Down);
                } else {
                    match self.view {
                        View::Picker => self.picker.move_down(),
                        _ => self.move_row_down(1),
                    }
                }
            }
            AppAction::CursorLeft => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.move_cursor(CursorMove::Back);
                } else {
                    match self.view {
                        View::Picker => self.picker.ascend(),
                        _ => self.cursor.field = self.cursor.field.prev(),
                    }
                }
            }
            AppAction::CursorRight => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.move_cursor(CursorMove::Forward);
                } else if self.view != View::Picker {
                    self.cursor.field = self.cursor.field.next();
                }
            }
            AppAction::CursorPageUp => {
                if self.editor.is_none() {
                    match self.view {
                        View::Picker => self.picker.page_up(),
                        _ => self.move_row_up(TABLE_PAGE_JUMP),
                    }
                }
            }
            AppAction::CursorPageDown => {
                if self.editor.is_none() {
                    match self.view {
                        View::Picker => self.picker.page_down(),
                        _ => self.move_row_down(TABLE_PAGE_JUMP),
                    }
                }
            }
            AppAction::NextField => {
                if self.editor.is_none() && self.view == View::Workspace {
                    self.cursor.field = self.cursor.field.next();
                }
            }
            AppAction::PrevField => {
                if self.editor.is_none() && self.view == View::Workspace {
                    self.cursor.field = self.cursor.field.prev();
                }
            }
            AppAction::Input(key) => self.handle_input(key),
            AppAction::Tick => {}
        }
    }

    fn handle_submit(&mut self) {
        // An open editor owns Enter: commit the cell.
        if let Some(editor) = self.editor.take() {
            self.session
                .edit_field(editor.row(), editor.field(), editor.value());
            return;
        }

        match self.view {
            View::Picker => {
                if let Some(path) = self.picker.enter() {
                    self.select_path(&path);
                    self.view = View::Workspace;
                }
            }
            View::Help => self.view = View::Workspace,
            View::Workspace => self.submit_analysis(),
        }
    }

    fn handle_escape(&mut self) {
        if self.editor.take().is_some() {
            return;
        }
        match self.view {
            View::Help | View::Picker => self.view = View::Workspace,
            View::Workspace => {}
        }
    }

    /// Handle keyboard input according to the active view
    fn handle_input(&mut self, key: KeyEvent) {
        if let Some(editor) = self.editor.as_mut() {
            editor.input(key);
            return;
        }

        match self.view {
            View::Help => self.view = View::Workspace,
            View::Picker => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('?') => self.view = View::Help,
                _ => {}
            },
            View::Workspace => match key.code {
                KeyCode::Char('o') => {
                    self.picker.refresh();
                    self.view = View::Picker;
                }
                KeyCode::Char('e') => self.open_editor(),
                KeyCode::Char('a') => {
                    if self.session.add_variable() {
                        self.cursor.row = self.last_row();
                        self.cursor.field = VariableField::FieldName;
                    }
                }
                KeyCode::Char('d') => {
                    if self.session.remove_variable(self.cursor.row) {
                        self.clamp_cursor();
                    }
                }
                KeyCode::Char('r') => self.submit_refine(),
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('?') => self.view = View::Help,
                _ => {}
            },
        }
    }

    /// Open the popup editor over the focused cell.
    fn open_editor(&mut self) {
        if self.session.is_loading() || self.session.variables().is_empty() {
            return;
        }
        let row = self.cursor.row.min(self.last_row());
        let field = self.cursor.field;
        let current = self.session.variables()[row].field(field).to_string();
        self.cursor.row = row;
        self.editor = Some(CellEditor::new(row, field, &current));
    }

    /// Start the analyze upload in a background task.
    fn submit_analysis(&mut self) {
        let max_attempts = self.api.retry_policy().max_attempts;
        let Some(pdf) = self.session.begin_analyze(max_attempts) else {
            return;
        };

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let attempt_tx = tx.clone();
            let result = api
                .analyze_pdf(&pdf, move |attempt| {
                    // Dropped if the channel is full; the counter is
                    // display-only.
                    let _ = attempt_tx.try_send(AppEvent::AnalyzeAttempt(attempt + 1));
                })
                .await;

            let event = match result {
                Ok(analysis) => AppEvent::AnalyzeComplete(analysis),
                Err(err) => AppEvent::AnalyzeFailed(err.to_string()),
            };
            tx.send(event).await.ok();
        });
    }

    /// Start a single-shot refine request in a background task.
    fn submit_refine(&mut self) {
        let Some(payload) = self.session.begin_refine() else {
            return;
        };

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api
                .refine_variables(&payload.document_text, &payload.variables)
                .await;

            let event = match result {
                Ok(variables) => AppEvent::RefineComplete(variables),
                Err(err) => AppEvent::RefineFailed(err.to_string()),
            };
            tx.send(event).await.ok();
        });
    }

    fn last_row(&self) -> usize {
        self.session.variables().len().saturating_sub(1)
    }

    fn move_row_up(&mut self, step: usize) {
        self.cursor.row = self.cursor.row.saturating_sub(step);
    }

    fn move_row_down(&mut self, step: usize) {
        if !self.session.variables().is_empty() {
            self.cursor.row = (self.cursor.row + step).min(self.last_row());
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor.row = self.cursor.row.min(self.last_row());
    }
}
