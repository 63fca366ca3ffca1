//! Terminal input handling using crossterm
//!
//! Features:
//! - Non-blocking event capture (keys, mouse, paste)
//! - Mapping raw events to lab actions
//! - Ctrl+C exits from anywhere

use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::execute;
use std::io::{stdout, Result as IoResult};
use std::time::Duration;

/// What a terminal event means to the lab
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Mouse button pressed at a cell
    Click { column: u16, row: u16 },
    Char(char),
    Backspace,
    Enter,
    NextField,
    PrevField,
    Paste(String),
    ToggleInstructions,
    /// Esc: leave the current run, or the lab outside a run
    Back,
    /// Ctrl+C
    Quit,
    /// Screen needs a redraw (resize, focus change)
    Redraw,
}

impl UiAction {
    /// Actions that count toward the run's click/operation total
    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            UiAction::Click { .. } | UiAction::Enter | UiAction::NextField | UiAction::PrevField
        )
    }
}

/// Handles user input from the terminal
pub struct InputHandler {
    /// Timeout for poll operations
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create input handler with a short poll timeout so the run clock keeps ticking
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(100),
        }
    }

    /// Raw mode plus mouse and bracketed-paste reporting
    pub fn enable() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()?;
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)
    }

    /// Undo `enable`
    pub fn disable() -> IoResult<()> {
        execute!(stdout(), DisableBracketedPaste, DisableMouseCapture)?;
        crossterm::terminal::disable_raw_mode()
    }

    /// Poll for an event with timeout; None on timeout or ignored events
    pub fn read_action(&self) -> Result<Option<UiAction>, Box<dyn std::error::Error>> {
        if event::poll(self.poll_timeout)? {
            Ok(Self::map_event(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Translate a crossterm event into a lab action
    pub fn map_event(event: Event) -> Option<UiAction> {
        match event {
            Event::Key(key) => Self::map_key(&key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left | MouseButton::Right) => {
                    Some(UiAction::Click {
                        column: mouse.column,
                        row: mouse.row,
                    })
                }
                _ => None,
            },
            Event::Paste(text) => Some(UiAction::Paste(text)),
            Event::Resize(..) | Event::FocusGained => Some(UiAction::Redraw),
            Event::FocusLost => None,
        }
    }

    /// Translate a key press; releases are dropped, held-key repeats act like presses
    pub fn map_key(key: &KeyEvent) -> Option<UiAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UiAction::Quit)
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(UiAction::Char(c))
            }
            KeyCode::Enter => Some(UiAction::Enter),
            KeyCode::Backspace => Some(UiAction::Backspace),
            KeyCode::Tab | KeyCode::Down => Some(UiAction::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(UiAction::PrevField),
            KeyCode::F(1) => Some(UiAction::ToggleInstructions),
            KeyCode::Esc => Some(UiAction::Back),
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            InputHandler::map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UiAction::Quit)
        );
        assert_eq!(
            InputHandler::map_event(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(UiAction::Char('c'))
        );
    }

    #[test]
    fn test_mouse_down_is_a_click() {
        let down = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 9,
            modifiers: KeyModifiers::NONE,
        });
        let action = InputHandler::map_event(down).unwrap();
        assert_eq!(action, UiAction::Click { column: 4, row: 9 });
        assert!(action.is_operation());

        let moved = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row: 9,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(InputHandler::map_event(moved), None);
    }

    #[test]
    fn test_typing_is_not_an_operation() {
        assert!(!UiAction::Char('a').is_operation());
        assert!(!UiAction::Paste("x".to_string()).is_operation());
        assert!(UiAction::NextField.is_operation());
    }

    #[test]
    fn test_paste_passes_text_through() {
        assert_eq!(
            InputHandler::map_event(Event::Paste("taro".to_string())),
            Some(UiAction::Paste("taro".to_string()))
        );
    }

    #[test]
    fn test_release_is_dropped_and_repeat_kept() {
        let with_kind = |kind| KeyEvent {
            code: KeyCode::Backspace,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        };
        assert_eq!(InputHandler::map_key(&with_kind(KeyEventKind::Release)), None);
        assert_eq!(
            InputHandler::map_key(&with_kind(KeyEventKind::Repeat)),
            Some(UiAction::Backspace)
        );
    }
}
