//! Event type classification.
//!
//! Every inbound message that is not consumed by a command is classified into
//! exactly one [`EventType`] by presence-checking its content. Two members of
//! the enumeration are never produced by classification:
//!
//! - [`EventType::Any`]: handlers registered for it run for every classified
//!   message, in addition to the handlers of the specific type.
//! - [`EventType::ReplyToBot`]: selected before classification when the
//!   message quotes one of the bot's own messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_core::EventType;
//!
//! let t: EventType = "video".parse().unwrap();
//! assert_eq!(t, EventType::Video);
//! assert_eq!(EventType::ReplyToBot.as_str(), "reply");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of event types a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Plain text, and the fallback for content that matches nothing else.
    Text,
    Image,
    Video,
    Document,
    Sticker,
    Audio,
    /// A message quoting one of the bot's own messages.
    #[serde(rename = "reply")]
    ReplyToBot,
    /// Runs alongside the handlers of whatever type was classified.
    Any,
    Poll,
    Contact,
    Location,
}

impl EventType {
    /// All event types, in declaration order.
    pub const ALL: [EventType; 11] = [
        EventType::Text,
        EventType::Image,
        EventType::Video,
        EventType::Document,
        EventType::Sticker,
        EventType::Audio,
        EventType::ReplyToBot,
        EventType::Any,
        EventType::Poll,
        EventType::Contact,
        EventType::Location,
    ];

    /// Returns the wire name of this event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Text => "text",
            EventType::Image => "image",
            EventType::Video => "video",
            EventType::Document => "document",
            EventType::Sticker => "sticker",
            EventType::Audio => "audio",
            EventType::ReplyToBot => "reply",
            EventType::Any => "any",
            EventType::Poll => "poll",
            EventType::Contact => "contact",
            EventType::Location => "location",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown event type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: '{0}'")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "text" => EventType::Text,
            "image" => EventType::Image,
            "video" => EventType::Video,
            "document" => EventType::Document,
            "sticker" => EventType::Sticker,
            "audio" => EventType::Audio,
            "reply" | "reply-to-bot" | "reply_to_bot" => EventType::ReplyToBot,
            "any" => EventType::Any,
            "poll" => EventType::Poll,
            "contact" => EventType::Contact,
            "location" => EventType::Location,
            _ => return Err(UnknownEventType(s.to_string())),
        })
    }
}
