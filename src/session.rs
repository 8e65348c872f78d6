//! Session state for one run of the client.
//!
//! Every UI and network event is applied through a named transition
//! method on [`Session`], which keeps the invariants in one place:
//! at most one operation in flight, the error slot cleared whenever a
//! new operation starts, table edits as whole-sequence replacements,
//! and the preview resource dropped before a replacement is installed.
//! Nothing here touches the terminal or the network, so the whole
//! state machine is testable synchronously.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::models::{AnalysisResult, VariableField, VariableRecord};
use crate::pdf::{PdfPreview, SelectedPdf};

/// Shown when the user submits without having picked a file.
pub const NO_FILE_SELECTED_MESSAGE: &str = "Please select a PDF file before uploading.";

/// The one-at-a-time operation state. `Analyzing` carries the attempt
/// counter so the UI can show retry progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Idle,
    Analyzing {
        attempt: u32,
        max_attempts: u32,
    },
    Refining,
}

impl Operation {
    pub fn is_loading(&self) -> bool {
        !matches!(self, Operation::Idle)
    }
}

/// Everything a refine call needs, captured at submission time so the
/// request task owns its data. `document_text` is the verbatim text
/// from the analysis response.
#[derive(Debug, Clone)]
pub struct RefinePayload {
    pub document_text: String,
    pub variables: Vec<VariableRecord>,
}

#[derive(Debug, Default)]
pub struct Session {
    selected: Option<SelectedPdf>,
    preview: Option<PdfPreview>,
    analysis: Option<AnalysisResult>,
    variables: Vec<VariableRecord>,
    operation: Operation,
    error: Option<String>,
    analyzed_at: Option<DateTime<Local>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedPdf> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&PdfPreview> {
        self.preview.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn variables(&self) -> &[VariableRecord] {
        &self.variables
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn analyzed_at(&self) -> Option<DateTime<Local>> {
        self.analyzed_at
    }

    pub fn is_loading(&self) -> bool {
        self.operation.is_loading()
    }

    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    /// The table shows its completion/empty panel when an analysis
    /// exists but every row has been removed (or none were extracted).
    pub fn shows_empty_state(&self) -> bool {
        self.analysis.is_some() && self.variables.is_empty()
    }

    /// Install a newly selected PDF, discarding any previous results.
    /// The old preview is dropped before the new one is stored.
    /// Ignored while an operation is in flight.
    pub fn select_pdf(&mut self, pdf: SelectedPdf, preview: Option<PdfPreview>) -> bool {
        if self.operation.is_loading() {
            return false;
        }

        self.analysis = None;
        self.variables.clear();
        self.error = None;
        self.analyzed_at = None;

        drop(self.preview.take());
        debug!("Selected {}", pdf.filename);
        self.selected = Some(pdf);
        self.preview = preview;
        true
    }

    /// The chosen file could not be selected (not a PDF, or unreadable).
    /// Clears the selection along with any previous results and
    /// surfaces the validation message.
    pub fn reject_selection(&mut self, message: impl Into<String>) {
        if self.operation.is_loading() {
            return;
        }

        self.analysis = None;
        self.variables.clear();
        self.analyzed_at = None;

        drop(self.preview.take());
        self.selected = None;
        let message = message.into();
        warn!("Rejected selection: {}", message);
        self.error = Some(message);
    }

    /// Start an analysis. Returns the file to upload, or `None` when
    /// nothing is selected (sets the message) or an operation is
    /// already running (ignored).
    pub fn begin_analyze(&mut self, max_attempts: u32) -> Option<SelectedPdf> {
        if self.operation.is_loading() {
            return None;
        }

        let Some(pdf) = self.selected.clone() else {
            self.error = Some(NO_FILE_SELECTED_MESSAGE.to_string());
            return None;
        };

        self.analysis = None;
        self.variables.clear();
        self.error = None;
        self.analyzed_at = None;
        self.operation = Operation::Analyzing {
            attempt: 1,
            max_attempts,
        };
        info!("Starting analysis of {}", pdf.filename);
        Some(pdf)
    }

    /// Update the visible attempt counter (1-based).
    pub fn analyze_attempt(&mut self, attempt: u32) {
        if let Operation::Analyzing { max_attempts, .. } = self.operation {
            self.operation = Operation::Analyzing {
                attempt,
                max_attempts,
            };
        }
    }

    pub fn complete_analyze(&mut self, result: AnalysisResult) {
        info!(
            "Analysis of {} complete: {} variables",
            result.filename,
            result.variables.len()
        );
        self.variables = result.variables.clone();
        self.analysis = Some(result);
        self.error = None;
        self.analyzed_at = Some(Local::now());
        self.operation = Operation::Idle;
    }

    pub fn fail_analyze(&mut self, message: &str) {
        warn!("Analysis failed: {}", message);
        self.error = Some(format!(
            "Analysis failed: {message}. Check that the extraction service is running."
        ));
        self.operation = Operation::Idle;
    }

    /// Replace one field of one row. Every other row and field stays
    /// byte-identical. Out-of-range edits are ignored.
    pub fn edit_field(
        &mut self,
        index: usize,
        field: VariableField,
        value: impl Into<String>,
    ) -> bool {
        if self.operation.is_loading() || index >= self.variables.len() {
            return false;
        }

        let value = value.into();
        self.variables = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if i == index {
                    record.with_field(field, value.as_str())
                } else {
                    record.clone()
                }
            })
            .collect();
        true
    }

    /// Append a blank user-added row. Requires an analysis, since the
    /// row is only useful to a later refine call.
    pub fn add_variable(&mut self) -> bool {
        if self.operation.is_loading() || self.analysis.is_none() {
            return false;
        }

        let mut next = self.variables.clone();
        next.push(VariableRecord::user_added());
        self.variables = next;
        true
    }

    /// Drop the row at `index`, preserving the order of the rest.
    pub fn remove_variable(&mut self, index: usize) -> bool {
        if self.operation.is_loading() || index >= self.variables.len() {
            return false;
        }

        self.variables = self
            .variables
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, record)| record.clone())
            .collect();
        true
    }

    /// Start a refinement. Requires an analysis and a non-empty table;
    /// returns the owned payload for the request task.
    pub fn begin_refine(&mut self) -> Option<RefinePayload> {
        if self.operation.is_loading() {
            return None;
        }
        let analysis = self.analysis.as_ref()?;
        if self.variables.is_empty() {
            return None;
        }

        self.error = None;
        self.operation = Operation::Refining;
        info!("Starting refinement of {} variables", self.variables.len());
        Some(RefinePayload {
            document_text: analysis.document_text.clone(),
            variables: self.variables.clone(),
        })
    }

    /// Refinement succeeded: the refined list replaces both the table
    /// and the stored analysis variables. The document text is kept.
    pub fn complete_refine(&mut self, variables: Vec<VariableRecord>) {
        info!("Refinement complete: {} variables", variables.len());
        self.variables = variables.clone();
        if let Some(analysis) = self.analysis.as_mut() {
            analysis.variables = variables;
        }
        self.operation = Operation::Idle;
    }

    /// Refinement failed: surface the message, keep the table as the
    /// user left it.
    pub fn fail_refine(&mut self, message: &str) {
        warn!("Refinement failed: {}", message);
        self.error = Some(format!(
            "Refinement failed: {message}. Ensure your fields have matching text in the document."
        ));
        self.operation = Operation::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::path::PathBuf;

    fn sample_pdf() -> SelectedPdf {
        SelectedPdf {
            path: PathBuf::from("docs/report.pdf"),
            filename: "report.pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    fn sample_preview() -> PdfPreview {
        PdfPreview {
            page_count: 2,
            size_bytes: 8,
            title: Some("Report".to_string()),
            author: None,
            snippet: "Quarterly totals".to_string(),
        }
    }

    fn record(name: &str, value: &str) -> VariableRecord {
        VariableRecord {
            field_name: name.to_string(),
            value: value.to_string(),
            var_type: "string".to_string(),
            description: format!("{name} description"),
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            document_text: "Invoice #42 total 100.00".to_string(),
            filename: "report.pdf".to_string(),
            variables: vec![record("Invoice Number", "42"), record("Total", "100.00")],
        }
    }

    fn analyzed_session() -> Session {
        let mut session = Session::new();
        session.select_pdf(sample_pdf(), Some(sample_preview()));
        session.begin_analyze(3).unwrap();
        session.complete_analyze(sample_result());
        session
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert!(session.selected().is_none());
        assert!(session.preview().is_none());
        assert!(session.analysis().is_none());
        assert!(session.variables().is_empty());
        assert_eq!(session.operation(), Operation::Idle);
        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert!(!session.shows_empty_state());
    }

    #[test]
    fn test_select_pdf_clears_previous_results() {
        let mut session = analyzed_session();
        session.fail_refine("boom");
        assert!(session.error().is_some());

        assert!(session.select_pdf(sample_pdf(), None));
        assert!(session.selected().is_some());
        assert!(session.preview().is_none());
        assert!(session.analysis().is_none());
        assert!(session.variables().is_empty());
        assert!(session.error().is_none());
        assert!(session.analyzed_at().is_none());
    }

    #[test]
    fn test_select_pdf_replaces_preview() {
        let mut session = Session::new();
        session.select_pdf(sample_pdf(), Some(sample_preview()));
        assert_eq!(session.preview().unwrap().page_count, 2);

        let replacement = PdfPreview {
            page_count: 7,
            ..sample_preview()
        };
        session.select_pdf(sample_pdf(), Some(replacement));
        assert_eq!(session.preview().unwrap().page_count, 7);
    }

    #[test]
    fn test_reject_selection_clears_everything() {
        let mut session = analyzed_session();
        session.reject_selection("Please select a valid PDF file.");

        assert!(session.selected().is_none());
        assert!(session.preview().is_none());
        assert!(session.analysis().is_none());
        assert!(session.variables().is_empty());
        assert_eq!(session.error(), Some("Please select a valid PDF file."));
    }

    #[test]
    fn test_begin_analyze_without_file_sets_message() {
        let mut session = Session::new();
        assert!(session.begin_analyze(3).is_none());
        assert_eq!(
            session.error(),
            Some("Please select a PDF file before uploading.")
        );
        assert_eq!(session.operation(), Operation::Idle);
    }

    #[test]
    fn test_begin_analyze_clears_results_and_returns_file() {
        let mut session = analyzed_session();
        let pdf = session.begin_analyze(3).expect("file should be returned");

        assert_eq!(pdf.filename, "report.pdf");
        assert_eq!(
            session.operation(),
            Operation::Analyzing {
                attempt: 1,
                max_attempts: 3
            }
        );
        assert!(session.is_loading());
        assert!(session.analysis().is_none());
        assert!(session.variables().is_empty());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_analyze_attempt_updates_counter() {
        let mut session = Session::new();
        session.select_pdf(sample_pdf(), None);
        session.begin_analyze(3).unwrap();
        session.analyze_attempt(2);
        assert_eq!(
            session.operation(),
            Operation::Analyzing {
                attempt: 2,
                max_attempts: 3
            }
        );
    }

    #[test]
    fn test_complete_analyze_seeds_table() {
        let mut session = Session::new();
        session.select_pdf(sample_pdf(), None);
        session.begin_analyze(3).unwrap();
        session.complete_analyze(sample_result());

        assert_eq!(session.variables().len(), 2);
        assert_eq!(session.variables()[0].field_name, "Invoice Number");
        assert_eq!(session.operation(), Operation::Idle);
        assert!(session.error().is_none());
        assert!(session.analyzed_at().is_some());
        assert!(session.has_analysis());
    }

    #[test]
    fn test_fail_analyze_wraps_message_and_leaves_table_empty() {
        let mut session = Session::new();
        session.select_pdf(sample_pdf(), None);
        session.begin_analyze(3).unwrap();
        session.fail_analyze("HTTP error! Status: 500");

        assert_eq!(
            session.error(),
            Some(
                "Analysis failed: HTTP error! Status: 500. \
                 Check that the extraction service is running."
            )
        );
        assert!(session.variables().is_empty());
        assert!(session.analysis().is_none());
        assert_eq!(session.operation(), Operation::Idle);
    }

    #[test]
    fn test_edit_field_changes_single_cell() {
        let mut session = analyzed_session();
        let before = session.variables().to_vec();

        assert!(session.edit_field(1, VariableField::Value, "250.00"));

        assert_eq!(session.variables()[0], before[0]);
        assert_eq!(session.variables()[1].value, "250.00");
        assert_eq!(session.variables()[1].field_name, before[1].field_name);
        assert_eq!(session.variables()[1].var_type, before[1].var_type);
        assert_eq!(session.variables()[1].description, before[1].description);
    }

    #[test]
    fn test_edit_field_out_of_range_is_ignored() {
        let mut session = analyzed_session();
        let before = session.variables().to_vec();
        assert!(!session.edit_field(5, VariableField::Value, "nope"));
        assert_eq!(session.variables(), before.as_slice());
    }

    #[test]
    fn test_add_variable_appends_sentinel_row() {
        let mut session = analyzed_session();
        let before = session.variables().to_vec();

        assert!(session.add_variable());
        assert_eq!(session.variables().len(), before.len() + 1);
        assert_eq!(&session.variables()[..before.len()], before.as_slice());
        assert_eq!(session.variables().last().unwrap(), &VariableRecord::user_added());
    }

    #[test]
    fn test_add_variable_requires_analysis() {
        let mut session = Session::new();
        assert!(!session.add_variable());
        assert!(session.variables().is_empty());
    }

    #[test]
    fn test_remove_variable_preserves_order() {
        let mut session = analyzed_session();
        session.add_variable();
        let before = session.variables().to_vec();

        assert!(session.remove_variable(1));
        assert_eq!(session.variables().len(), 2);
        assert_eq!(session.variables()[0], before[0]);
        assert_eq!(session.variables()[1], before[2]);
    }

    #[test]
    fn test_remove_variable_out_of_range_is_ignored() {
        let mut session = analyzed_session();
        assert!(!session.remove_variable(9));
        assert_eq!(session.variables().len(), 2);
    }

    #[test]
    fn test_begin_refine_requires_analysis_and_rows() {
        let mut session = Session::new();
        assert!(session.begin_refine().is_none());

        session.select_pdf(sample_pdf(), None);
        session.begin_analyze(3).unwrap();
        session.complete_analyze(AnalysisResult {
            variables: Vec::new(),
            ..sample_result()
        });
        assert!(session.begin_refine().is_none());

        session.add_variable();
        assert!(session.begin_refine().is_some());
    }

    #[test]
    fn test_begin_refine_uses_verbatim_document_text() {
        let mut session = analyzed_session();
        session.edit_field(0, VariableField::Value, "edited");
        session.fail_refine("earlier");
        let payload = session.begin_refine().expect("refine should start");

        assert_eq!(payload.document_text, "Invoice #42 total 100.00");
        assert_eq!(payload.variables[0].value, "edited");
        assert_eq!(session.operation(), Operation::Refining);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_complete_refine_replaces_table_and_analysis() {
        let mut session = analyzed_session();
        session.begin_refine().unwrap();
        let refined = vec![record("Grand Total", "250.00")];
        session.complete_refine(refined.clone());

        assert_eq!(session.variables(), refined.as_slice());
        assert_eq!(session.analysis().unwrap().variables, refined);
        assert_eq!(
            session.analysis().unwrap().document_text,
            "Invoice #42 total 100.00"
        );
        assert_eq!(session.operation(), Operation::Idle);
    }

    #[test]
    fn test_fail_refine_preserves_table() {
        let mut session = analyzed_session();
        session.edit_field(0, VariableField::Value, "edited");
        let before = session.variables().to_vec();
        session.begin_refine().unwrap();
        session.fail_refine("Missing document text or variable list for refinement.");

        assert_eq!(session.variables(), before.as_slice());
        assert_eq!(
            session.error(),
            Some(
                "Refinement failed: Missing document text or variable list for refinement. \
                 Ensure your fields have matching text in the document."
            )
        );
        assert_eq!(session.operation(), Operation::Idle);
    }

    #[test]
    fn test_mutations_ignored_while_loading() {
        // Refining keeps the table populated, so the rejections below
        // exercise the in-flight guard rather than bounds checks.
        let mut session = analyzed_session();
        session.begin_refine().unwrap();
        let before = session.variables().to_vec();

        assert!(!session.edit_field(0, VariableField::Value, "x"));
        assert!(!session.add_variable());
        assert!(!session.remove_variable(0));
        assert!(!session.select_pdf(sample_pdf(), None));
        assert!(session.begin_refine().is_none());
        assert!(session.begin_analyze(3).is_none());

        assert_eq!(session.variables(), before.as_slice());
        assert_eq!(session.operation(), Operation::Refining);
    }

    #[test]
    fn test_refine_returning_no_rows_shows_empty_state() {
        let mut session = analyzed_session();
        session.begin_refine().unwrap();
        session.complete_refine(Vec::new());

        assert!(session.shows_empty_state());
        assert!(session.analysis().unwrap().variables.is_empty());
        assert_eq!(session.operation(), Operation::Idle);
    }

    #[test]
    fn test_empty_state_after_removing_all_rows() {
        let mut session = analyzed_session();
        assert!(!session.shows_empty_state());
        session.remove_variable(1);
        session.remove_variable(0);
        assert!(session.shows_empty_state());

        session.add_variable();
        assert!(!session.shows_empty_state());
    }
}
