//! Variables Table Widget
//!
//! Renders the editable variable table: header row, one line per
//! record, the focused cell highlighted. Also draws the empty-state
//! panel shown when an analysis produced (or edits left) no rows, and
//! a placeholder before any analysis exists.

use crate::models::{VariableField, USER_ADDED_TYPE};
use crate::session::{Operation, Session};
use crate::tui::app::TableCursor;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Render the variables panel
pub fn render_table(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    cursor: &TableCursor,
    focused: bool,
) {
    let title = match session.analysis() {
        Some(analysis) => format!(" Extracted Variables - {} ", analysis.filename),
        None => " Extracted Variables ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if session.shows_empty_state() {
        render_empty_state(frame, inner);
        return;
    }
    if !session.has_analysis() {
        render_placeholder(frame, inner, session);
        return;
    }

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Field Name"),
        Cell::from("Value"),
        Cell::from("Type"),
        Cell::from("Description"),
    ])
    .style(Theme::heading())
    .height(1);

    let rows: Vec<Row> = session
        .variables()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut cells = vec![Cell::from(
                Span::styled(format!("{}", i + 1), Theme::text_dim()),
            )];
            for field in VariableField::ALL {
                let text = record.field(field).to_string();
                let style = if focused && i == cursor.row && field == cursor.field {
                    Theme::cell_focused()
                } else if field == VariableField::Type && record.var_type == USER_ADDED_TYPE {
                    // Rows the user added by hand still need a refine
                    // pass, so their sentinel type stands out.
                    Theme::active()
                } else {
                    Theme::text()
                };
                cells.push(Cell::from(Span::styled(text, style)));
            }
            Row::new(cells)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(20),
            Constraint::Percentage(24),
            Constraint::Length(16),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .column_spacing(1)
    .highlight_style(ratatui::style::Style::default().bg(Theme::BG_HIGHLIGHT));

    let mut state = TableState::default();
    state.select(Some(cursor.row.min(session.variables().len().saturating_sub(1))));
    frame.render_stateful_widget(table, inner, &mut state);
}

/// All rows gone (or none extracted): completion message plus the one
/// affordance to add a first row. Headers stay hidden.
fn render_empty_state(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Analysis Complete", Theme::title())),
        Line::from(""),
        Line::from(Span::styled(
            "No variables were extracted from the document.",
            Theme::text_secondary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[a]", Theme::shortcut_key()),
            Span::styled(" Add First Variable", Theme::text()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_placeholder(frame: &mut Frame, area: Rect, session: &Session) {
    let message = match session.operation() {
        Operation::Analyzing { .. } => "Analyzing document...",
        _ if session.selected().is_some() => "Variables will appear here after analysis.",
        _ => "No document selected.",
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Theme::text_dim())),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
