//! The transport capability handed to dispatch and handlers.
//!
//! The chat-platform session layer lives outside this workspace. It exposes
//! itself to the framework through the [`Transport`] trait: sending text,
//! reacting to a message, and managing the block list. Payload shapes beyond
//! plain text are the transport's own business.
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_core::{MessageKey, Transport, TransportResult};
//!
//! struct Console;
//!
//! #[async_trait::async_trait]
//! impl Transport for Console {
//!     async fn send_text(&self, chat: &str, text: &str, _quoted: Option<&MessageKey>)
//!         -> TransportResult<()>
//!     {
//!         println!("[{chat}] {text}");
//!         Ok(())
//!     }
//!     // ...
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::message::{MessageKey, NormalizedMessage};

/// Outbound capabilities of a connected chat session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a text message to `chat`, optionally quoting `quoted`.
    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        quoted: Option<&MessageKey>,
    ) -> TransportResult<()>;

    /// Reacts to the message identified by `key` with `emoji`.
    async fn react(&self, chat: &str, key: &MessageKey, emoji: &str) -> TransportResult<()>;

    /// Adds `jid` to the block list.
    async fn block(&self, jid: &str) -> TransportResult<()>;

    /// Removes `jid` from the block list.
    async fn unblock(&self, jid: &str) -> TransportResult<()>;

    /// Replies to `message` in its chat, quoting it.
    async fn reply(&self, message: &NormalizedMessage, text: &str) -> TransportResult<()> {
        self.send_text(message.chat(), text, Some(&message.key))
            .await
    }

    /// Reacts to `message` with `emoji`.
    async fn react_to(&self, message: &NormalizedMessage, emoji: &str) -> TransportResult<()> {
        self.react(message.chat(), &message.key, emoji).await
    }
}

/// Shared, type-erased transport handle.
pub type BoxedTransport = Arc<dyn Transport>;
