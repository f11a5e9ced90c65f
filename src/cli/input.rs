//! Keystroke input handling using crossterm
//!
//! Features:
//! - Non-blocking keystroke capture
//! - Normalization of keyboards and TV remotes into `Action`s
//! - Reset shortcut detection (`r` or four quick back presses)
//! - Ctrl+C graceful exit

use crate::action::Action;
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::{Duration, Instant};

/// Back presses needed to open the reset prompt
pub const RESET_BACK_THRESHOLD: usize = 4;
pub const RESET_BACK_WINDOW: Duration = Duration::from_millis(1500);

/// Handles user input from terminal
pub struct InputHandler {
    /// Timeout for poll operations
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create new input handler with default timeout (50ms keeps timed transitions responsive)
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    pub fn disable_raw_mode() -> IoResult<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Poll for a key press with timeout (non-blocking)
    /// Returns None on timeout, on non-key events and on key releases
    pub fn read_key(&self) -> IoResult<Option<KeyEvent>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                event::Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    Ok(Some(key_event))
                }
                _ => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    /// Ctrl+C leaves the program from any screen
    pub fn is_exit(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL))
    }

    /// Printable character without Ctrl/Alt
    pub fn key_to_char(key: &KeyEvent) -> Option<char> {
        match key.code {
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn is_backspace(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Backspace)
    }

    pub fn is_enter(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Enter)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a terminal key to a normalized action.
/// Space and Enter confirm; Esc and Backspace go back.
pub fn normalize_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Esc | KeyCode::Backspace => Action::Back,
        _ => Action::None,
    }
}

/// Legacy numeric key codes sent by TV remotes (Android TV, Tizen, webOS)
pub fn normalize_key_code(code: u32) -> Action {
    match code {
        13 | 66 | 23 => Action::Confirm,
        4 | 10009 | 461 => Action::Back,
        38 => Action::Up,
        40 => Action::Down,
        37 => Action::Left,
        39 => Action::Right,
        _ => Action::None,
    }
}

/// Detects the reset gesture: `r`/`R`, or enough back presses inside the window
#[derive(Debug, Default)]
pub struct ResetShortcut {
    back_presses: Vec<Instant>,
}

impl ResetShortcut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key press; true when the reset prompt should open
    pub fn observe(&mut self, key: &KeyEvent, now: Instant) -> bool {
        if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
            return true;
        }
        if normalize_key(key) != Action::Back {
            return false;
        }

        self.back_presses
            .retain(|t| now.saturating_duration_since(*t) < RESET_BACK_WINDOW);
        self.back_presses.push(now);

        if self.back_presses.len() >= RESET_BACK_THRESHOLD {
            self.back_presses.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_normalize_keys() {
        assert_eq!(normalize_key(&key(KeyCode::Up)), Action::Up);
        assert_eq!(normalize_key(&key(KeyCode::Enter)), Action::Confirm);
        assert_eq!(normalize_key(&key(KeyCode::Char(' '))), Action::Confirm);
        assert_eq!(normalize_key(&key(KeyCode::Esc)), Action::Back);
        assert_eq!(normalize_key(&key(KeyCode::Backspace)), Action::Back);
        assert_eq!(normalize_key(&key(KeyCode::Char('a'))), Action::None);
    }

    #[test]
    fn test_remote_codes() {
        for code in [13, 66, 23] {
            assert_eq!(normalize_key_code(code), Action::Confirm);
        }
        for code in [4, 10009, 461] {
            assert_eq!(normalize_key_code(code), Action::Back);
        }
        assert_eq!(normalize_key_code(37), Action::Left);
        assert_eq!(normalize_key_code(38), Action::Up);
        assert_eq!(normalize_key_code(39), Action::Right);
        assert_eq!(normalize_key_code(40), Action::Down);
        assert_eq!(normalize_key_code(99), Action::None);
    }

    #[test]
    fn test_exit_and_chars() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(InputHandler::is_exit(&ctrl_c));
        assert!(!InputHandler::is_exit(&key(KeyCode::Esc)));
        assert_eq!(InputHandler::key_to_char(&ctrl_c), None);
        assert_eq!(InputHandler::key_to_char(&key(KeyCode::Char('e'))), Some('e'));
    }

    #[test]
    fn test_reset_shortcut_letter() {
        let mut shortcut = ResetShortcut::new();
        assert!(shortcut.observe(&key(KeyCode::Char('R')), Instant::now()));
    }

    #[test]
    fn test_reset_shortcut_back_presses() {
        let mut shortcut = ResetShortcut::new();
        let t0 = Instant::now();
        let esc = key(KeyCode::Esc);
        assert!(!shortcut.observe(&esc, t0));
        assert!(!shortcut.observe(&esc, t0 + Duration::from_millis(300)));
        assert!(!shortcut.observe(&esc, t0 + Duration::from_millis(600)));
        assert!(shortcut.observe(&esc, t0 + Duration::from_millis(900)));

        // presses spread past the window do not accumulate
        let t1 = t0 + Duration::from_secs(10);
        for i in 0..6 {
            assert!(!shortcut.observe(&esc, t1 + Duration::from_millis(i * 800)));
        }
    }
}
