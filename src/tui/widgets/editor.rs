//! Cell Editor Widget
//!
//! Popup editor for one table cell, backed by a textarea. Enter
//! commits through the session, Esc discards; both are handled by the
//! app, this widget only owns the text state and rendering.

use crate::models::VariableField;
use crate::tui::theme::Theme;
use crate::tui::ui::centered_rect;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_textarea::{CursorMove, TextArea};

pub struct CellEditor {
    row: usize,
    field: VariableField,
    textarea: TextArea<'static>,
}

impl CellEditor {
    /// Open an editor over `row`/`field`, pre-filled with the current
    /// cell text and the cursor at the end.
    pub fn new(row: usize, field: VariableField, current: &str) -> Self {
        let mut textarea = TextArea::new(current.lines().map(str::to_string).collect());
        textarea.set_cursor_line_style(ratatui::style::Style::default());
        textarea.set_placeholder_style(Theme::placeholder());
        textarea.set_placeholder_text(placeholder_for(field));
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);
        Self {
            row,
            field,
            textarea,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn field(&self) -> VariableField {
        self.field
    }

    pub fn input(&mut self, key: KeyEvent) {
        self.textarea.input(key);
    }

    pub fn move_cursor(&mut self, movement: CursorMove) {
        self.textarea.move_cursor(movement);
    }

    /// The edited text as it would be committed.
    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }
}

/// Placeholders matching the table inputs.
fn placeholder_for(field: VariableField) -> &'static str {
    match field {
        VariableField::FieldName => "Variable Name/Category",
        VariableField::Value => "Extracted Value",
        VariableField::Type => "Type",
        VariableField::Description => "Description",
    }
}

/// Render the editor popup centered over the workspace
pub fn render_editor(frame: &mut Frame, editor: &CellEditor) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(
            " Edit {} (row {}) ",
            editor.field().label(),
            editor.row() + 1
        ))
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(&editor.textarea, chunks[0]);

    let hint = Line::from(vec![
        Span::styled("[Enter]", Theme::shortcut_key()),
        Span::styled(" Save  ", Theme::shortcut_desc()),
        Span::styled("[Esc]", Theme::shortcut_key()),
        Span::styled(" Cancel", Theme::shortcut_desc()),
    ]);
    frame.render_widget(Paragraph::new(hint), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_editor_prefills_current_value_and_appends_at_end() {
        let mut editor = CellEditor::new(1, VariableField::Value, "100.00");
        assert_eq!(editor.value(), "100.00");

        editor.input(KeyEvent::new(KeyCode::Char('!'), KeyModifiers::NONE));
        assert_eq!(editor.value(), "100.00!");
        assert_eq!(editor.row(), 1);
        assert_eq!(editor.field(), VariableField::Value);
    }

    #[test]
    fn test_editor_starts_empty_for_blank_cell() {
        let mut editor = CellEditor::new(0, VariableField::FieldName, "");
        assert_eq!(editor.value(), "");

        editor.input(KeyEvent::new(KeyCode::Char('T'), KeyModifiers::NONE));
        editor.input(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE));
        editor.input(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(editor.value(), "T");
    }
}
