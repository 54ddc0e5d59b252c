pub mod cli;
pub mod config;
pub mod database;
pub mod entries;
pub mod input;
pub mod logging;
pub mod models;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use entries::EntriesContainer;
pub use models::{Entry, EntryType};
pub use utils::Profile;
