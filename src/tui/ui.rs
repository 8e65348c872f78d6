//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::session::Operation;
use crate::tui::app::{App, View};
use crate::tui::picker::EntryKind;
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    match app.view {
        View::Picker => render_picker_view(frame, app),
        View::Workspace | View::Help => render_workspace(frame, app),
    }

    if app.view == View::Help {
        render_help(frame);
    }
    if let Some(editor) = &app.editor {
        widgets::render_editor(frame, editor);
    }
}

/// The main screen: header, pipeline, optional error banner, the
/// document/table split, and the status bar.
fn render_workspace(frame: &mut Frame, app: &App) {
    let has_banner = app.session.error().is_some();

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Length(4), // Pipeline
    ];
    if has_banner {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(10)); // Body
    constraints.push(Constraint::Length(1)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0], app);
    widgets::render_progress(frame, chunks[1], &app.session);

    let mut next = 2;
    if has_banner {
        render_error_banner(frame, chunks[next], app);
        next += 1;
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[next]);

    render_document_panel(frame, body[0], app);
    let table_focused = app.view == View::Workspace && app.editor.is_none();
    widgets::render_table(frame, body[1], &app.session, &app.cursor, table_focused);

    render_status_bar(frame, chunks[next + 1], app);
}

/// Render the header with the configured endpoint host
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title_text = vec![Line::from(vec![
        Span::raw("📄 "),
        Span::styled("DocVars", Theme::title()),
        Span::styled(" PDF Variable Extractor", Theme::text_secondary()),
        Span::raw("  "),
        Span::styled(
            endpoint_host(&app.config.api.analyze_url),
            Theme::text_dim(),
        ),
    ])];

    let title = Paragraph::new(title_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

    frame.render_widget(title, area);
}

/// Host portion of a URL, for display only.
fn endpoint_host(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest).to_string()
}

fn render_error_banner(frame: &mut Frame, area: Rect, app: &App) {
    let message = app.session.error().unwrap_or_default().to_string();

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", Icons::ERROR), Theme::error()),
        Span::styled(message, Theme::error()),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::error()),
    );

    frame.render_widget(paragraph, area);
}

/// Left panel: the selected file and its preview metadata.
fn render_document_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Document ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(pdf) = app.session.selected() else {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No file selected.", Theme::text_dim())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Theme::text_dim()),
                Span::styled("[o]", Theme::shortcut_key()),
                Span::styled(" to browse for a PDF.", Theme::text_dim()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("File: ", Theme::text_secondary()),
            Span::styled(pdf.filename.clone(), Theme::heading()),
        ]),
        Line::from(vec![
            Span::styled("Size: ", Theme::text_secondary()),
            Span::styled(format_size(pdf.bytes.len()), Theme::text()),
        ]),
    ];

    match app.session.preview() {
        Some(preview) => {
            lines.push(Line::from(vec![
                Span::styled("Pages: ", Theme::text_secondary()),
                Span::styled(preview.page_count.to_string(), Theme::text()),
            ]));
            if let Some(title) = &preview.title {
                lines.push(Line::from(vec![
                    Span::styled("Title: ", Theme::text_secondary()),
                    Span::styled(title.clone(), Theme::text()),
                ]));
            }
            if let Some(author) = &preview.author {
                lines.push(Line::from(vec![
                    Span::styled("Author: ", Theme::text_secondary()),
                    Span::styled(author.clone(), Theme::text()),
                ]));
            }
            if !preview.snippet.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "First page:",
                    Theme::text_secondary(),
                )));
                lines.push(Line::from(Span::styled(
                    preview.snippet.clone(),
                    Theme::text_dim(),
                )));
            }
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Preview unavailable.",
                Theme::text_dim(),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Full-screen file browser view
fn render_picker_view(frame: &mut Frame, app: &App) {
    let has_banner = app.picker.error().is_some();

    let mut constraints = vec![Constraint::Length(3)];
    if has_banner {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(5));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0], app);

    let mut next = 1;
    if has_banner {
        let message = app.picker.error().unwrap_or_default().to_string();
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", Icons::ERROR), Theme::error()),
            Span::styled(message, Theme::error()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::error()),
        );
        frame.render_widget(banner, chunks[next]);
        next += 1;
    }

    let items: Vec<ListItem> = app
        .picker
        .entries()
        .iter()
        .map(|entry| {
            let (label, style) = match entry.kind {
                EntryKind::Parent => (entry.name.clone(), Theme::text_dim()),
                EntryKind::Directory => (format!("{}/", entry.name), Theme::text_secondary()),
                EntryKind::Pdf => (entry.name.clone(), Theme::success()),
                EntryKind::Other => (entry.name.clone(), Theme::text_dim()),
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

    let symbol = format!("{} ", Icons::SELECTED);
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Select a PDF - {} ", app.picker.cwd().display()))
                .borders(Borders::ALL)
                .border_style(Theme::border_focused()),
        )
        .highlight_style(Theme::selected())
        .highlight_symbol(&symbol);

    let mut state = ListState::default();
    state.select(Some(app.picker.cursor()));
    frame.render_stateful_widget(list, chunks[next], &mut state);

    render_status_bar(frame, chunks[next + 1], app);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = match app.session.operation() {
        Operation::Analyzing {
            attempt,
            max_attempts,
        } => Span::styled(
            format!("Analyzing (attempt {}/{})...", attempt, max_attempts),
            Theme::active(),
        ),
        Operation::Refining => Span::styled("Refining...", Theme::active()),
        Operation::Idle => {
            if app.session.error().is_some() {
                Span::styled("Error", Theme::error())
            } else {
                Span::styled("Ready", Theme::text_secondary())
            }
        }
    };

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcut_spans(app))
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

fn shortcut_spans(app: &App) -> Vec<Span<'static>> {
    let pairs: &[(&str, &str)] = if app.editor.is_some() {
        &[("[Enter]", " Save "), ("[Esc]", " Cancel")]
    } else {
        match app.view {
            View::Picker => &[
                ("[↑↓]", " Navigate "),
                ("[Enter]", " Open "),
                ("[←]", " Parent "),
                ("[Esc]", " Back "),
                ("[Ctrl+Q]", " Quit"),
            ],
            _ => &[
                ("[o]", " Open "),
                ("[Enter]", " Analyze "),
                ("[e]", " Edit "),
                ("[a]", " Add "),
                ("[d]", " Delete "),
                ("[r]", " Refine "),
                ("[?]", " Help"),
            ],
        }
    };

    pairs
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, Theme::shortcut_key()),
                Span::styled(*desc, Theme::shortcut_desc()),
            ]
        })
        .collect()
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        Line::from(vec![
            Span::styled("o            ", Theme::shortcut_key()),
            Span::styled("Browse for a PDF", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Enter        ", Theme::shortcut_key()),
            Span::styled("Analyze file / Save cell / Open entry", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("e            ", Theme::shortcut_key()),
            Span::styled("Edit the focused cell", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("a            ", Theme::shortcut_key()),
            Span::styled("Add a variable row", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("d            ", Theme::shortcut_key()),
            Span::styled("Delete the focused row", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("r            ", Theme::shortcut_key()),
            Span::styled("Refine variables via the service", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("↑/↓          ", Theme::shortcut_key()),
            Span::styled("Move between rows", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("←/→ or Tab   ", Theme::shortcut_key()),
            Span::styled("Move between columns", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Esc          ", Theme::shortcut_key()),
            Span::styled("Close popup / Cancel", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("q / Ctrl+Q   ", Theme::shortcut_key()),
            Span::styled("Quit", Theme::text()),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+C       ", Theme::shortcut_key()),
            Span::styled("Force quit", Theme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_host_strips_scheme_and_path() {
        assert_eq!(endpoint_host("http://127.0.0.1:8000/analyze-pdf"), "127.0.0.1:8000");
        assert_eq!(endpoint_host("https://api.example.com/v1/x"), "api.example.com");
        assert_eq!(endpoint_host("localhost:9000"), "localhost:9000");
    }

    #[test]
    fn test_format_size_tiers() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
