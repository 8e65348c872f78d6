//! Event Handling
//!
//! Handles keyboard and timer events for the TUI. Global chords and
//! navigation keys map to named actions here; everything else is
//! passed through as `Input` and interpreted by the app according to
//! the active view.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Confirm / submit (Enter key)
    Submit,
    /// Toggle help view
    ToggleHelp,
    /// Escape - close popups, cancel
    Escape,
    /// Move the cursor up one row
    CursorUp,
    /// Move the cursor down one row
    CursorDown,
    /// Move the cursor left one column
    CursorLeft,
    /// Move the cursor right one column
    CursorRight,
    /// Jump the cursor up one page
    CursorPageUp,
    /// Jump the cursor down one page
    CursorPageDown,
    /// Move to next field (Tab)
    NextField,
    /// Move to previous field (Shift+Tab)
    PrevField,
    /// Regular input key, interpreted per view
    Input(KeyEvent),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        // Spawn event polling task
        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Try to get the next action without blocking
    pub async fn try_next(&mut self) -> Option<AppAction> {
        self.rx.try_recv().ok()
    }

    /// Map a crossterm event to an app action
    fn map_event(event: Event) -> Option<AppAction> {
        match event {
            Event::Key(key) => Self::map_key_event(key),
            _ => None,
        }
    }

    /// Map a key event to an app action
    fn map_key_event(key: KeyEvent) -> Option<AppAction> {
        match (key.modifiers, key.code) {
            // Quit shortcuts
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

            // Navigation with modifiers
            (KeyModifiers::SHIFT, KeyCode::BackTab) => Some(AppAction::PrevField),

            // No modifiers
            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => Some(AppAction::Escape),
                KeyCode::Enter => Some(AppAction::Submit),
                KeyCode::F(1) => Some(AppAction::ToggleHelp),

                KeyCode::Up => Some(AppAction::CursorUp),
                KeyCode::Down => Some(AppAction::CursorDown),
                KeyCode::Left => Some(AppAction::CursorLeft),
                KeyCode::Right => Some(AppAction::CursorRight),
                KeyCode::PageUp => Some(AppAction::CursorPageUp),
                KeyCode::PageDown => Some(AppAction::CursorPageDown),

                KeyCode::Tab => Some(AppAction::NextField),
                KeyCode::BackTab => Some(AppAction::PrevField),

                // All other keys are view-dependent input
                _ => Some(AppAction::Input(key)),
            },

            // Pass through other key combinations as input
            _ => Some(AppAction::Input(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_global_chords_map_to_quit_actions() {
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(AppAction::ForceQuit)
        ));
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(AppAction::Quit)
        ));
    }

    #[test]
    fn test_plain_characters_pass_through_as_input() {
        // Letter shortcuts are resolved by the app, not here, so the
        // cell editor can receive them as text.
        for ch in ['q', 'o', 'a', 'd', 'r', 'e', '?'] {
            match EventHandler::map_event(key(KeyCode::Char(ch), KeyModifiers::NONE)) {
                Some(AppAction::Input(event)) => assert_eq!(event.code, KeyCode::Char(ch)),
                other => panic!("expected Input for {ch:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_navigation_keys_map_to_cursor_actions() {
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::Up, KeyModifiers::NONE)),
            Some(AppAction::CursorUp)
        ));
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(AppAction::NextField)
        ));
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(AppAction::PrevField)
        ));
        assert!(matches!(
            EventHandler::map_event(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(AppAction::Submit)
        ));
    }

    #[test]
    fn test_resize_events_are_ignored() {
        assert!(EventHandler::map_event(Event::Resize(80, 24)).is_none());
    }
}
