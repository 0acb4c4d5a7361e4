//! Error types for directory and message-log operations.

use thiserror::Error;

use crate::ids::{MessageId, OfficerId};

/// Lookup failures surfaced to REST callers.
///
/// Delivery and frame-decoding failures never reach callers and live in
/// `relay-server` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// No officer with this id exists in the directory.
    #[error("Officer not found: {0}")]
    OfficerNotFound(OfficerId),
    /// No message with this id exists in the log.
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),
}

impl RelayError {
    /// Short caller-facing description, without the id.
    #[must_use]
    pub const fn detail(&self) -> &'static str {
        match self {
            Self::OfficerNotFound(_) => "Officer not found",
            Self::MessageNotFound(_) => "Message not found",
        }
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
