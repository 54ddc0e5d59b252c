use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured log filter
pub const LOG_ENV: &str = "MTRACK_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid log filter '{0}'")]
    Filter(String),
}

/// Active logging. Logging stops when this is dropped.
pub struct LogGuard {
    _guard: DefaultGuard,
}

/// Send `tracing` output to `path` (appending) for the lifetime of the
/// returned guard.
///
/// The filter comes from `MTRACK_LOG` when set, else from `level`
/// (any `EnvFilter` directive, e.g. `"info"` or `"mediatrack=debug"`).
/// The terminal is left alone since the TUI owns it.
pub fn init(path: &Path, level: &str) -> Result<LogGuard, LoggingError> {
    let file = open_log_file(path)?;
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|_| LoggingError::Filter(level.to_string()))?,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .finish();

    Ok(LogGuard {
        _guard: tracing::subscriber::set_default(subscriber),
    })
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let open_err = |source| LoggingError::Open {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(open_err)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_err)
}
