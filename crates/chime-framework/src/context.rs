//! Contexts handed to handler callbacks.
//!
//! Every callback receives the message plus one of two context types:
//!
//! - [`CommandContext`]: for command handlers: the parsed command key, the
//!   free text after it, the argument tokens and the active prefix.
//! - [`EventContext`]: for event handlers: the event type the message was
//!   classified as.
//!
//! Both carry a [`Session`] with the transport handle, a snapshot of the
//! registry the dispatch is running against, and the dispatcher's uptime.

use std::sync::Arc;
use std::time::Duration;

use chime_core::{BoxedTransport, EventType, NormalizedMessage, TransportResult};

use crate::matcher::CommandInput;
use crate::registry::Registry;

// =============================================================================
// Session
// =============================================================================

/// Dispatch-wide resources shared by all callbacks for one message.
#[derive(Clone)]
pub struct Session {
    transport: BoxedTransport,
    registry: Arc<Registry>,
    uptime: Duration,
}

impl Session {
    pub fn new(transport: BoxedTransport, registry: Arc<Registry>, uptime: Duration) -> Self {
        Self {
            transport,
            registry,
            uptime,
        }
    }

    /// The transport the message arrived on.
    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// The registry snapshot this dispatch resolved against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Time since the dispatcher was created.
    pub fn uptime(&self) -> Duration {
        self.uptime
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uptime", &self.uptime)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CommandContext
// =============================================================================

/// Context for a command handler invocation.
#[derive(Clone, Debug)]
pub struct CommandContext {
    /// The lowercased command key.
    pub command: String,
    /// Everything after the key, rejoined with single spaces.
    pub text: String,
    /// The tokens after the key.
    pub args: Vec<String>,
    /// The prefix the command was invoked with.
    pub prefix: String,
    session: Session,
}

impl CommandContext {
    pub fn new(input: CommandInput, prefix: impl Into<String>, session: Session) -> Self {
        Self {
            command: input.command,
            text: input.text,
            args: input.args,
            prefix: prefix.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &BoxedTransport {
        self.session.transport()
    }

    /// Replies to `message`, quoting it.
    pub async fn reply(&self, message: &NormalizedMessage, text: &str) -> TransportResult<()> {
        self.transport().reply(message, text).await
    }
}

// =============================================================================
// EventContext
// =============================================================================

/// Context for an event handler invocation.
#[derive(Clone, Debug)]
pub struct EventContext {
    /// The classified type. `any` handlers see the specific type, reply
    /// handlers see [`EventType::ReplyToBot`].
    pub event_type: EventType,
    session: Session,
}

impl EventContext {
    pub fn new(event_type: EventType, session: Session) -> Self {
        Self {
            event_type,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &BoxedTransport {
        self.session.transport()
    }

    /// Replies to `message`, quoting it.
    pub async fn reply(&self, message: &NormalizedMessage, text: &str) -> TransportResult<()> {
        self.transport().reply(message, text).await
    }
}
