//! Domain error types.

use thiserror::Error;

/// Validation failures when building value objects from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid room id: {0}")]
    InvalidRoomId(String),

    #[error("display name must be 1 to {max} characters")]
    InvalidDisplayName { max: usize },

    #[error("message text must be 1 to {max} characters")]
    InvalidMessageText { max: usize },
}

/// Errors reported by the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while pushing a frame to a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}
