//! Key-press dispatch: turns single keys and two-key sequences into
//! callbacks registered per caller.

pub mod combination;
pub mod dispatcher;
pub mod key;
pub mod keymap;

pub use combination::KeyCombination;
pub use dispatcher::{COMBINATION_TIMEOUT, Callback, Dispatcher, InputMode, Observer};
pub use key::{Key, KeyParseError};
pub use keymap::{Action, Caller};
