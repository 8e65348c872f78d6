// docvars - Terminal client for PDF variable extraction and refinement

pub mod api;
pub mod config;
pub mod models;
pub mod pdf;
pub mod session;
pub mod tui;       // Terminal User Interface
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::{AnalysisResult, VariableField, VariableRecord};
pub use session::Session;
