//! Entry store error types

use thiserror::Error;

use crate::journal::JournalError;

/// Errors that can occur while reading or writing entries
#[derive(Error, Debug)]
pub enum StoreError {
    /// No entry with this id
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// An entry with this id is already stored
    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    /// Submitted entry failed validation
    #[error("Invalid entry: {0}")]
    Validation(#[from] JournalError),

    /// Local database failure
    #[error("SQLite error: {0}")]
    Sqlite(String),

    /// Could not reach the remote store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store answered with a non-success status
    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for StoreError {
    fn from(err: chrono::ParseError) -> Self {
        StoreError::Serialization(format!("invalid date: {}", err))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
