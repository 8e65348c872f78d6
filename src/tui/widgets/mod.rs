//! TUI Widgets
//!
//! Custom widgets for the docvars TUI.

mod editor;
mod progress;
mod table;

pub use editor::{render_editor, CellEditor};
pub use progress::render_progress;
pub use table::render_table;
