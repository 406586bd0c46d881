//! Test doubles shared by the framework's unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use chime_core::{
    BoxedTransport, MessageContent, MessageKey, NormalizedMessage, Transport, TransportResult,
};

pub const BOT: &str = "999@s.whatsapp.net";
pub const STRANGER: &str = "555@s.whatsapp.net";

/// One side effect observed by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat: String, text: String, quoted: Option<String> },
    Reaction { chat: String, message_id: String, emoji: String },
    Block(String),
    Unblock(String),
}

/// A transport that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn boxed(self: &Arc<Self>) -> BoxedTransport {
        self.clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Texts sent, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Reaction emojis sent, in order.
    pub fn reactions(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Reaction { emoji, .. } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        quoted: Option<&MessageKey>,
    ) -> TransportResult<()> {
        self.sent.lock().push(Sent::Text {
            chat: chat.to_string(),
            text: text.to_string(),
            quoted: quoted.map(|k| k.id.clone()),
        });
        Ok(())
    }

    async fn react(&self, chat: &str, key: &MessageKey, emoji: &str) -> TransportResult<()> {
        self.sent.lock().push(Sent::Reaction {
            chat: chat.to_string(),
            message_id: key.id.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn block(&self, jid: &str) -> TransportResult<()> {
        self.sent.lock().push(Sent::Block(jid.to_string()));
        Ok(())
    }

    async fn unblock(&self, jid: &str) -> TransportResult<()> {
        self.sent.lock().push(Sent::Unblock(jid.to_string()));
        Ok(())
    }
}

/// A text message from `sender` in a private chat with the bot.
pub fn text_from(sender: &str, body: &str) -> NormalizedMessage {
    NormalizedMessage::new(MessageKey::new("MSG1", sender), BOT)
        .with_sender(sender)
        .with_body(body)
}

/// A message from a stranger carrying the given content.
pub fn content_from_stranger(content: MessageContent) -> NormalizedMessage {
    NormalizedMessage::new(MessageKey::new("MSG2", STRANGER), BOT)
        .with_sender(STRANGER)
        .with_content(content)
}

/// A button selection from `sender`.
pub fn button_from(sender: &str, id: &str) -> NormalizedMessage {
    NormalizedMessage::new(MessageKey::new("MSG3", sender), BOT)
        .with_sender(sender)
        .with_raw(json!({
            "message": { "buttonsResponseMessage": { "selectedButtonId": id } }
        }))
}
