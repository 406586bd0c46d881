//! # Chime Core
//!
//! The data contracts shared by every Chime crate:
//!
//! - **Message model**: [`NormalizedMessage`] and its parts, as produced by the
//!   serialization layer for each inbound chat event.
//! - **Event types**: the closed [`EventType`] classification.
//! - **Transport boundary**: the [`Transport`] trait through which dispatch and
//!   handlers send replies and reactions.
//! - **Chat identifiers**: helpers in [`jid`].
//!
//! ```text
//! ┌───────────┐   ┌───────────────┐   ┌───────────────────┐   ┌────────────┐
//! │ Transport │──▶│ Serialization │──▶│ NormalizedMessage │──▶│ Dispatcher │
//! └───────────┘   └───────────────┘   └───────────────────┘   └────────────┘
//!       ▲                                                           │
//!       └──────────────── send / react / block ─────────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod jid;
pub mod message;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use event::{EventType, UnknownEventType};
pub use message::{ButtonLatch, MessageContent, MessageKey, NormalizedMessage, QuotedMessage};
pub use transport::{BoxedTransport, Transport};
