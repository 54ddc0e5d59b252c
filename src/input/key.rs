use crossterm::event::{KeyCode, KeyEvent};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::has_primary_modifier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("Empty key binding")]
    Empty,
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Key combination '{0}' has more than two keys")]
    TooManyKeys(String),
    #[error("Invalid binding for '{action}': {source}")]
    Binding {
        action: String,
        #[source]
        source: Box<KeyParseError>,
    },
}

/// A single key press: the key code plus whether the primary modifier was held.
///
/// Shift is not tracked separately; it is already folded into the character
/// (`G` vs `g`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
}

impl Key {
    pub fn new(code: KeyCode) -> Self {
        Self { code, ctrl: false }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            ctrl: true,
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            ctrl: has_primary_modifier(event.modifiers),
        }
    }
}

/// Parse a key from config syntax.
/// Supports: single characters ("q", "G", "+"), named keys ("Enter", "Esc", "F1")
/// and the Ctrl modifier ("Ctrl+s", or "Opt+s" as shown on macOS).
impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        // "+" alone is a key, not a modifier separator
        // "Opt+" is what macOS displays for the same modifier
        let rest = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("Opt+"));
        if let Some(rest) = rest.filter(|rest| !rest.is_empty()) {
            return Ok(Key {
                code: parse_key_code(rest)?,
                ctrl: true,
            });
        }
        Ok(Key::new(parse_key_code(s)?))
    }
}

fn parse_key_code(key_str: &str) -> Result<KeyCode, KeyParseError> {
    let code = match key_str {
        "Enter" => KeyCode::Enter,
        "Esc" | "Escape" => KeyCode::Esc,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "BackTab" => KeyCode::BackTab,
        "Space" => KeyCode::Char(' '),
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Delete" => KeyCode::Delete,
        "Insert" => KeyCode::Insert,
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(KeyParseError::UnknownKey(key_str.to_string())),
            }
        }
    };
    Ok(code)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            #[cfg(target_os = "macos")]
            write!(f, "Opt+")?;
            #[cfg(not(target_os = "macos"))]
            write!(f, "Ctrl+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Esc => write!(f, "Esc"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::BackTab => write!(f, "BackTab"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn parses_plain_named_and_ctrl_keys() {
        assert_eq!("q".parse::<Key>().unwrap(), Key::char('q'));
        assert_eq!("G".parse::<Key>().unwrap(), Key::char('G'));
        assert_eq!("Enter".parse::<Key>().unwrap(), Key::new(KeyCode::Enter));
        assert_eq!("F12".parse::<Key>().unwrap(), Key::new(KeyCode::F(12)));
        assert_eq!("Ctrl+s".parse::<Key>().unwrap(), Key::ctrl('s'));
        assert_eq!("+".parse::<Key>().unwrap(), Key::char('+'));
        assert_eq!("Space".parse::<Key>().unwrap(), Key::char(' '));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert_eq!(
            "Hyper".parse::<Key>(),
            Err(KeyParseError::UnknownKey("Hyper".to_string()))
        );
        assert_eq!("F13".parse::<Key>(), Err(KeyParseError::UnknownKey("F13".to_string())));
        assert_eq!("  ".parse::<Key>(), Err(KeyParseError::Empty));
    }

    #[test]
    fn shift_is_ignored_but_ctrl_is_kept() {
        let shifted = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(Key::from(shifted), Key::char('G'));

        let ctrl = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(Key::from(ctrl), Key::ctrl('s'));
    }

    #[test]
    fn display_matches_config_syntax() {
        for text in ["q", "Enter", "Space", "F1", "Esc"] {
            assert_eq!(text.parse::<Key>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn displayed_keys_parse_back() {
        assert_eq!("Opt+s".parse::<Key>().unwrap(), Key::ctrl('s'));
        for text in ["Ctrl+s", "Enter", "F5", "g", "Space"] {
            let key = text.parse::<Key>().unwrap();
            assert_eq!(key.to_string().parse::<Key>().unwrap(), key);
        }
    }
}
