//! Error types for the message system.

use thiserror::Error;

/// Result type for message operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the message system.
#[derive(Debug, Error)]
pub enum Error {
    /// Event code not present in the catalog.
    #[error("Undefined event id: {0}")]
    UndefinedEvent(String),

    /// Message not found or not visible to the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid query input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage operation failed.
    #[error("Storage failed: {0}")]
    Storage(String),
}

impl From<stratus_storage::Error> for Error {
    fn from(err: stratus_storage::Error) -> Self {
        match err {
            stratus_storage::Error::NotFound(msg) => Error::NotFound(msg),
            stratus_storage::Error::InvalidInput(msg) => Error::Validation(msg),
            other => Error::Storage(other.to_string()),
        }
    }
}
