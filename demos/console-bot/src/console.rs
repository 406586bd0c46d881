//! A transport backed by the terminal.
//!
//! Every stdin line becomes one [`NormalizedMessage`]. Lines starting with `:`
//! are directives that build non-text messages:
//!
//! | Input | Message |
//! |-------|---------|
//! | `:button <id>` | button selection with id `<id>` |
//! | `:image [caption]` | image with an optional caption |
//! | `:reply <text>` | text quoting the bot's last message |
//! | `:quit` | ends the input stream |

use std::sync::atomic::{AtomicU64, Ordering};

use chime::prelude::*;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const BOT_ID: &str = "999@s.whatsapp.net";

/// Prints outbound traffic to stdout.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        quoted: Option<&MessageKey>,
    ) -> TransportResult<()> {
        match quoted {
            Some(key) => println!("[{chat}] bot (re {}):\n{text}\n", key.id),
            None => println!("[{chat}] bot:\n{text}\n"),
        }
        Ok(())
    }

    async fn react(&self, chat: &str, key: &MessageKey, emoji: &str) -> TransportResult<()> {
        println!("[{chat}] bot reacted {emoji} to {}", key.id);
        Ok(())
    }

    async fn block(&self, jid: &str) -> TransportResult<()> {
        println!("bot blocked {jid}");
        Ok(())
    }

    async fn unblock(&self, jid: &str) -> TransportResult<()> {
        println!("bot unblocked {jid}");
        Ok(())
    }
}

/// Turns input lines into messages from one sender.
#[derive(Debug)]
pub struct LineReader {
    sender: String,
    push_name: String,
    next_id: AtomicU64,
}

impl LineReader {
    pub fn new(sender: impl Into<String>, push_name: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            push_name: push_name.into(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Parses one input line. Returns `None` for blank lines.
    pub fn parse(&self, line: &str) -> Option<NormalizedMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let id = format!("CONSOLE{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut message = NormalizedMessage::new(MessageKey::new(id, &self.sender), BOT_ID)
            .with_sender(&self.sender);
        message.push_name = Some(self.push_name.clone());

        let (directive, rest) = match line.strip_prefix(':') {
            Some(d) => d.split_once(' ').unwrap_or((d, "")),
            None => return Some(message.with_body(line)),
        };

        let message = match directive {
            "button" => message.with_raw(json!({
                "message": { "buttonsResponseMessage": { "selectedButtonId": rest } }
            })),
            "image" => {
                let message = message.with_content(MessageContent {
                    image_message: Some(json!({ "caption": rest })),
                    ..Default::default()
                });
                if rest.is_empty() {
                    message
                } else {
                    message.with_body(rest)
                }
            }
            "reply" => message.with_body(rest).with_quoted(chime::core::QuotedMessage {
                sender: BOT_ID.to_string(),
                ..Default::default()
            }),
            other => {
                warn!(directive = other, "Unknown directive, sending as text");
                message.with_body(line)
            }
        };
        Some(message)
    }

    /// Reads stdin until EOF or `:quit`, forwarding messages to `tx`.
    pub async fn pump(self, tx: mpsc::Sender<NormalizedMessage>) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim() == ":quit" {
                break;
            }
            let Some(message) = self.parse(&line) else {
                continue;
            };
            debug!(id = %message.key.id, "Read message from console");
            if tx.send(message).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> LineReader {
        LineReader::new("100@s.whatsapp.net", "Ada")
    }

    #[test]
    fn test_plain_text() {
        let msg = reader().parse("  .ping  ").unwrap();
        assert_eq!(msg.text(), ".ping");
        assert_eq!(msg.sender(), "100@s.whatsapp.net");
        assert_eq!(msg.push_name.as_deref(), Some("Ada"));
        assert!(reader().parse("   ").is_none());
    }

    #[test]
    fn test_directives() {
        let reader = reader();

        let button = reader.parse(":button .menu info").unwrap();
        assert_eq!(button.button_id(), Some(".menu info"));

        let image = reader.parse(":image a cat").unwrap();
        assert_eq!(image.message.classify(), EventType::Image);
        assert_eq!(image.text(), "a cat");

        let reply = reader.parse(":reply thanks").unwrap();
        assert!(reply.is_reply_to_bot());
    }

    #[test]
    fn test_ids_are_unique() {
        let reader = reader();
        let a = reader.parse("a").unwrap();
        let b = reader.parse("b").unwrap();
        assert_ne!(a.key.id, b.key.id);
    }
}
