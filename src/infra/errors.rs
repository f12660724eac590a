// src/infra/errors.rs - Error types for promptqa

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QaError {
    // Caller-visible failures: the operation failed and nothing changed
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} already exists: {name}")]
    AlreadyExists { what: &'static str, name: String },

    // Network failures are absorbed into result data by the clients
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl QaError {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        QaError::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn storage(path: &Path, source: std::io::Error) -> Self {
        QaError::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map an io error on `path`, turning `NotFound` into the typed variant.
    pub fn from_io(what: &'static str, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            QaError::not_found(what, path.display().to_string())
        } else {
            QaError::storage(path, source)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QaError::NotFound { .. })
    }

    /// Message without the variant label, for embedding in recorded data.
    pub fn detail(&self) -> String {
        match self {
            QaError::Transport(msg) | QaError::Format(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for QaError {
    fn from(e: reqwest::Error) -> Self {
        QaError::Transport(e.to_string())
    }
}
