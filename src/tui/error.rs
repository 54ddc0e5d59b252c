use thiserror::Error;

use crate::database::DatabaseError;
use crate::entries::EntriesError;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Key binding error: {0}")]
    KeyBindingError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl From<EntriesError> for TuiError {
    fn from(err: EntriesError) -> Self {
        match err {
            EntriesError::Database(e) => TuiError::DatabaseError(e),
            EntriesError::Validation(e) => TuiError::RenderError(e.to_string()),
        }
    }
}
