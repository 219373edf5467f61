//! Error types for Marknote.

use thiserror::Error;

/// Common error type for Marknote.
#[derive(Error, Debug)]
pub enum NoteError {
    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The request collides with existing state (e.g. a duplicate sibling name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upload rejected by the upload sink.
    #[error("upload rejected: {0}")]
    Upload(String),

    /// Payload larger than the accepted ceiling, in bytes.
    #[error("payload exceeds the {0} byte limit")]
    TooLarge(u64),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for NoteError {
    fn from(e: sqlx::Error) -> Self {
        NoteError::Database(e.to_string())
    }
}

/// Result type alias for Marknote operations.
pub type Result<T> = std::result::Result<T, NoteError>;
