//! Error types for the donations domain.

use thiserror::Error;

/// Result type for donation notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the donations domain.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The mail relay rejected the message or failed to send it.
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Redis stream error.
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<redis::RedisError> for NotificationError {
    fn from(err: redis::RedisError) -> Self {
        NotificationError::Queue(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Internal(format!("JSON serialization error: {}", err))
    }
}
