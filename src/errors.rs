use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by the calculator, the ledger store and the exporters.
#[derive(Debug, Error)]
pub enum CloseError {
    #[error("Invalid input for `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Ledger `{}` is unreadable ({}); refusing to overwrite it", .path.display(), .reason)]
    LedgerUnreadable { path: PathBuf, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl CloseError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CloseError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<csv::Error> for CloseError {
    fn from(err: csv::Error) -> Self {
        CloseError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloseError>;
