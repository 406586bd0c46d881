//! The normalized message record.
//!
//! A [`NormalizedMessage`] is produced once per inbound event by the
//! serialization layer that sits between the chat transport and the
//! dispatcher. Dispatch treats it as read-only, with one exception: the
//! button latch, which is set exactly once when a button selection carried by
//! the raw envelope is reinterpreted as a command.
//!
//! The record is `serde`-compatible with the JSON the serialization layer
//! emits (camelCase field names, `_processedButton` for the latch).
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_core::{MessageKey, NormalizedMessage};
//!
//! let msg = NormalizedMessage::new(
//!     MessageKey::new("ABC123", "2348000000001@s.whatsapp.net"),
//!     "2348000000000@s.whatsapp.net",
//! )
//! .with_sender("2348000000001@s.whatsapp.net")
//! .with_body(".ping");
//!
//! assert_eq!(msg.text(), ".ping");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::event::EventType;
use crate::jid;

/// JSON pointer to the selected button id inside the raw envelope.
const BUTTON_ID_POINTER: &str = "/message/buttonsResponseMessage/selectedButtonId";

// ============================================================================
// MessageKey
// ============================================================================

/// Identifies a message within a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageKey {
    /// Whether the bot's own account sent the message.
    pub from_me: bool,
    /// Platform message id.
    pub id: String,
    /// The chat (private or group) the message belongs to.
    pub remote_jid: String,
}

impl MessageKey {
    /// Creates a key for a message not sent by the bot.
    pub fn new(id: impl Into<String>, remote_jid: impl Into<String>) -> Self {
        Self {
            from_me: false,
            id: id.into(),
            remote_jid: remote_jid.into(),
        }
    }

    /// Marks the key as belonging to a message sent by the bot itself.
    pub fn from_me(mut self, from_me: bool) -> Self {
        self.from_me = from_me;
        self
    }
}

// ============================================================================
// MessageContent
// ============================================================================

/// The content union of a message.
///
/// Only the variants that drive event classification are broken out; every
/// other content field is preserved in [`other`](Self::other).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_creation_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_message: Option<Value>,
    /// Content fields that do not affect classification.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl MessageContent {
    /// Classifies the content into a single [`EventType`].
    ///
    /// Variants are checked in a fixed priority order: image, video,
    /// document, sticker, audio, poll, contact, location. Content matching
    /// none of them is [`EventType::Text`].
    pub fn classify(&self) -> EventType {
        let checks = [
            (&self.image_message, EventType::Image),
            (&self.video_message, EventType::Video),
            (&self.document_message, EventType::Document),
            (&self.sticker_message, EventType::Sticker),
            (&self.audio_message, EventType::Audio),
            (&self.poll_creation_message, EventType::Poll),
            (&self.contact_message, EventType::Contact),
            (&self.location_message, EventType::Location),
        ];

        checks
            .into_iter()
            .find(|(field, _)| field.is_some())
            .map_or(EventType::Text, |(_, event_type)| event_type)
    }
}

// ============================================================================
// QuotedMessage
// ============================================================================

/// The message a record replies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedMessage {
    /// Normalized identifier of the quoted message's author.
    #[serde(default)]
    pub sender: String,
    /// Content of the quoted message, when available.
    #[serde(default)]
    pub message: Option<MessageContent>,
    /// Plain text of the quoted message.
    #[serde(default)]
    pub text: Option<String>,
}

// ============================================================================
// ButtonLatch
// ============================================================================

/// One-shot flag recording that a button selection was already reinterpreted.
#[derive(Default)]
pub struct ButtonLatch(AtomicBool);

impl ButtonLatch {
    /// Sets the latch. Returns `true` only for the call that flipped it.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Returns whether the latch is set.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Clone for ButtonLatch {
    fn clone(&self) -> Self {
        Self(AtomicBool::new(self.is_set()))
    }
}

impl fmt::Debug for ButtonLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ButtonLatch").field(&self.is_set()).finish()
    }
}

impl Serialize for ButtonLatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_set())
    }
}

impl<'de> Deserialize<'de> for ButtonLatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(|set| Self(AtomicBool::new(set)))
    }
}

// ============================================================================
// NormalizedMessage
// ============================================================================

/// A platform message normalized for dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    /// Text body (conversation text, extended text, or media caption).
    #[serde(default)]
    pub body: Option<String>,
    /// Canonical identifier of the author.
    #[serde(default)]
    pub sender: Option<String>,
    pub key: MessageKey,
    #[serde(default)]
    pub quoted: Option<QuotedMessage>,
    /// The bot's own identifier.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub message: MessageContent,
    /// The untouched platform envelope.
    #[serde(default)]
    pub raw: Value,
    #[serde(default)]
    pub mentions: Vec<String>,
    /// Display name of the author, when the platform provides one.
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(rename = "_processedButton", default)]
    processed_button: ButtonLatch,
}

impl NormalizedMessage {
    /// Creates an empty record for the given key and bot identifier.
    pub fn new(key: MessageKey, user: impl Into<String>) -> Self {
        Self {
            key,
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.message = content;
        self
    }

    pub fn with_quoted(mut self, quoted: QuotedMessage) -> Self {
        self.quoted = Some(quoted);
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }

    /// The chat this message belongs to.
    pub fn chat(&self) -> &str {
        &self.key.remote_jid
    }

    /// The text body, or `""` when absent.
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// The author's identifier, or `""` when absent.
    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or_default()
    }

    /// Returns `true` if this message quotes one of the bot's own messages.
    ///
    /// Identifiers are compared by local part, so a device-qualified account
    /// id still matches.
    pub fn is_reply_to_bot(&self) -> bool {
        !jid::local_part(&self.user).is_empty()
            && self
                .quoted
                .as_ref()
                .is_some_and(|quoted| jid::same_user(&quoted.sender, &self.user))
    }

    /// The button id selected by the user, if the raw envelope carries one.
    pub fn button_id(&self) -> Option<&str> {
        self.raw
            .pointer(BUTTON_ID_POINTER)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Records that the button selection has been reinterpreted.
    ///
    /// Returns `true` only for the first call on this record (and its clones
    /// made before the call), so a payload is reinterpreted at most once.
    pub fn mark_button_processed(&self) -> bool {
        self.processed_button.set()
    }

    /// Returns whether the button selection was already reinterpreted.
    pub fn is_button_processed(&self) -> bool {
        self.processed_button.is_set()
    }
}
