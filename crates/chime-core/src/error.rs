//! Error types for the transport boundary.

use thiserror::Error;

/// Errors reported by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The session is not connected.
    #[error("transport is not connected")]
    NotConnected,

    /// Message send failed.
    #[error("failed to send message to '{chat}': {reason}")]
    SendFailed {
        /// Destination chat.
        chat: String,
        /// Reason for failure.
        reason: String,
    },

    /// Reaction failed.
    #[error("failed to react in '{chat}': {reason}")]
    ReactFailed {
        /// Chat of the reacted message.
        chat: String,
        /// Reason for failure.
        reason: String,
    },

    /// Block or unblock failed.
    #[error("failed to update block list for '{jid}': {reason}")]
    BlockFailed {
        /// The affected identifier.
        jid: String,
        /// Reason for failure.
        reason: String,
    },

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Creates a send failure.
    pub fn send_failed(chat: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SendFailed {
            chat: chat.into(),
            reason: reason.into(),
        }
    }

    /// Creates a generic transport error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
