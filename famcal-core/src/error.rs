//! Error types for famcal.

use thiserror::Error;

/// Errors that can occur in famcal operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FamCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Could not persist store: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Subscription failed: {0}")]
    Subscription(String),
}

impl From<std::io::Error> for FamCalError {
    fn from(err: std::io::Error) -> Self {
        FamCalError::Io(err.to_string())
    }
}

/// Result type alias for famcal operations.
pub type FamCalResult<T> = Result<T, FamCalError>;
