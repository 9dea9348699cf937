//! Error types for refcal.

use thiserror::Error;

/// Errors that can occur in refcal operations.
#[derive(Error, Debug)]
pub enum RefCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or an ISO 8601 date-time")]
    InvalidDate(String),

    #[error("Invalid month {0}. Expected 1-12")]
    InvalidMonth(u32),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RefCalError {
    fn from(err: serde_json::Error) -> Self {
        RefCalError::Serialization(err.to_string())
    }
}

/// Result type alias for refcal operations.
pub type RefCalResult<T> = Result<T, RefCalError>;
