//! Error types for the component store and the import/sync pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// File-level parse failures. Reported in import results, never fatal.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub fn syntax(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the persistent component store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction aborted: {0}")]
    Transaction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record at key '{key}': {reason}")]
    InvalidRecord { key: String, reason: String },
}

/// Errors surfaced by the public operations.
///
/// Parse failures and per-file write failures are not represented here: they are
/// collected as strings inside the import and sync reports.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Validation failed with {} error(s): {}", .0.len(), .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Snapshot contains {} invalid row(s): {}", .0.len(), .0.join("; "))]
    SnapshotInvalid(Vec<String>),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<sled::Error> for ApiError {
    fn from(err: sled::Error) -> Self {
        ApiError::StorageError(StorageError::Sled(err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::StorageError(StorageError::Serialization(err))
    }
}
