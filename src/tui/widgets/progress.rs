//! Progress Widget
//!
//! Displays the document pipeline progress: Select, Analyze, Review.

use crate::session::{Operation, Session};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the progress indicator
pub fn render_progress(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default()
        .title(" Pipeline ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    lines.push(Line::from(build_progress_line(session)));
    lines.push(Line::from(detail_spans(session, inner.width as usize)));

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Build the stage line with per-stage icons
fn build_progress_line(session: &Session) -> Vec<Span<'static>> {
    let stages = [
        ("Select", StageState::from_select(session)),
        ("Analyze", StageState::from_analyze(session)),
        ("Review", StageState::from_review(session)),
    ];

    let mut spans = Vec::new();

    for (i, (name, state)) in stages.iter().enumerate() {
        let (icon, style) = match state {
            StageState::Complete => (Icons::COMPLETE, Theme::complete()),
            StageState::Active => (Icons::ACTIVE, Theme::active()),
            StageState::Pending => (Icons::PENDING, Theme::pending()),
            StageState::Error => (Icons::ERROR, Theme::error()),
        };

        spans.push(Span::styled(format!("{} ", icon), style));
        spans.push(Span::styled(name.to_string(), style));

        if i < stages.len() - 1 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
    }

    spans
}

/// Second line: what is happening right now, or what to do next.
fn detail_spans(session: &Session, width: usize) -> Vec<Span<'static>> {
    match session.operation() {
        Operation::Analyzing {
            attempt,
            max_attempts,
        } => vec![Span::styled(
            format!("Uploading for analysis... attempt {}/{}", attempt, max_attempts),
            Theme::active(),
        )],
        Operation::Refining => vec![Span::styled(
            "Refining variables against the document...".to_string(),
            Theme::active(),
        )],
        Operation::Idle => idle_detail(session, width),
    }
}

fn idle_detail(session: &Session, width: usize) -> Vec<Span<'static>> {
    if let Some(analyzed_at) = session.analyzed_at() {
        return vec![Span::styled(
            format!(
                "Analyzed at {} ({} variables)",
                analyzed_at.format("%H:%M:%S"),
                session.variables().len()
            ),
            Theme::text_secondary(),
        )];
    }

    if let Some(pdf) = session.selected() {
        return vec![
            Span::styled(
                truncate_string(&pdf.filename, width.saturating_sub(30)),
                Theme::text(),
            ),
            Span::styled(" ready. Press ".to_string(), Theme::text_secondary()),
            Span::styled("[Enter]", Theme::shortcut_key()),
            Span::styled(" to analyze.".to_string(), Theme::text_secondary()),
        ];
    }

    vec![
        Span::styled("Select a PDF to begin. Press ".to_string(), Theme::text_dim()),
        Span::styled("[o]", Theme::shortcut_key()),
        Span::styled(" to browse.".to_string(), Theme::text_dim()),
    ]
}

/// State of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq)]
enum StageState {
    Pending,
    Active,
    Complete,
    Error,
}

impl StageState {
    fn from_select(session: &Session) -> Self {
        if session.selected().is_some() {
            StageState::Complete
        } else {
            StageState::Active
        }
    }

    fn from_analyze(session: &Session) -> Self {
        match session.operation() {
            Operation::Analyzing { .. } => StageState::Active,
            _ if session.has_analysis() => StageState::Complete,
            _ if session.selected().is_some() && session.error().is_some() => StageState::Error,
            _ => StageState::Pending,
        }
    }

    fn from_review(session: &Session) -> Self {
        match session.operation() {
            Operation::Refining => StageState::Active,
            _ if session.has_analysis() && session.error().is_some() => StageState::Error,
            _ if session.has_analysis() => StageState::Complete,
            _ => StageState::Pending,
        }
    }
}

/// Truncate a string to fit within a given width
fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
