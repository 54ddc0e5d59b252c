use std::fmt;
use std::str::FromStr;

use super::key::{Key, KeyParseError};

/// Up to two sequentially pressed keys.
///
/// Doubles as the dispatcher's pending-input state and as the lookup key of
/// the binding table (`Idle` is never bound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyCombination {
    #[default]
    Idle,
    One(Key),
    Two(Key, Key),
}

impl KeyCombination {
    /// Normal-mode transition: fill the next free slot, or start over with
    /// `key` once both slots are taken.
    pub fn press_normal(self, key: Key) -> Self {
        match self {
            KeyCombination::Idle => KeyCombination::One(key),
            KeyCombination::One(first) => KeyCombination::Two(first, key),
            KeyCombination::Two(_, _) => KeyCombination::One(key),
        }
    }

    /// Input-mode transition: a sliding window over the last two keys.
    pub fn press_input(self, key: Key) -> Self {
        match self {
            KeyCombination::Idle => KeyCombination::One(key),
            KeyCombination::One(first) => KeyCombination::Two(first, key),
            KeyCombination::Two(_, second) => KeyCombination::Two(second, key),
        }
    }

    /// Most recently pressed key
    pub fn last(&self) -> Option<Key> {
        match *self {
            KeyCombination::Idle => None,
            KeyCombination::One(key) | KeyCombination::Two(_, key) => Some(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeyCombination::Idle => 0,
            KeyCombination::One(_) => 1,
            KeyCombination::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == KeyCombination::Idle
    }

    pub fn keys(&self) -> Vec<Key> {
        match *self {
            KeyCombination::Idle => Vec::new(),
            KeyCombination::One(a) => vec![a],
            KeyCombination::Two(a, b) => vec![a, b],
        }
    }
}

impl From<Key> for KeyCombination {
    fn from(key: Key) -> Self {
        KeyCombination::One(key)
    }
}

/// Whitespace-separated keys: `"q"`, `"g g"`, `"Ctrl+d d"`
impl FromStr for KeyCombination {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split_whitespace()
            .map(str::parse::<Key>)
            .collect::<Result<Vec<_>, _>>()?;
        match keys.as_slice() {
            [] => Err(KeyParseError::Empty),
            [a] => Ok(KeyCombination::One(*a)),
            [a, b] => Ok(KeyCombination::Two(*a, *b)),
            _ => Err(KeyParseError::TooManyKeys(s.trim().to_string())),
        }
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCombination::Idle => Ok(()),
            KeyCombination::One(a) => write!(f, "{}", a),
            KeyCombination::Two(a, b) => write!(f, "{} {}", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(keys: &str, press: fn(KeyCombination, Key) -> KeyCombination) -> KeyCombination {
        keys.chars()
            .fold(KeyCombination::Idle, |combo, c| press(combo, Key::char(c)))
    }

    #[test]
    fn normal_mode_resets_on_third_key() {
        let combo = press_all("ab", KeyCombination::press_normal);
        assert_eq!(combo, KeyCombination::Two(Key::char('a'), Key::char('b')));

        let combo = press_all("abc", KeyCombination::press_normal);
        assert_eq!(combo, KeyCombination::One(Key::char('c')));
    }

    #[test]
    fn input_mode_keeps_last_two_keys() {
        let combo = press_all("abc", KeyCombination::press_input);
        assert_eq!(combo, KeyCombination::Two(Key::char('b'), Key::char('c')));

        let combo = press_all("abcd", KeyCombination::press_input);
        assert_eq!(combo, KeyCombination::Two(Key::char('c'), Key::char('d')));
    }

    #[test]
    fn parses_one_and_two_key_combinations() {
        assert_eq!("q".parse::<KeyCombination>(), Ok(KeyCombination::One(Key::char('q'))));
        assert_eq!(
            "Ctrl+d  d".parse::<KeyCombination>(),
            Ok(KeyCombination::Two(Key::ctrl('d'), Key::char('d')))
        );
        assert_eq!("".parse::<KeyCombination>(), Err(KeyParseError::Empty));
        assert!(matches!(
            "a b c".parse::<KeyCombination>(),
            Err(KeyParseError::TooManyKeys(_))
        ));
    }

    #[test]
    fn display_and_accessors() {
        let combo: KeyCombination = "g T".parse().unwrap();
        assert_eq!(combo.to_string(), "g T");
        assert_eq!(combo.len(), 2);
        assert_eq!(combo.last(), Some(Key::char('T')));
        assert_eq!(combo.keys(), vec![Key::char('g'), Key::char('T')]);
        assert!(KeyCombination::Idle.is_empty());
        assert_eq!(KeyCombination::Idle.to_string(), "");
    }
}
