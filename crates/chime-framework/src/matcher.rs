//! Command text parsing and handler resolution.
//!
//! The matcher turns inbound text into a [`CommandInput`] and picks at most one
//! [`CommandHandler`] for it. It also reinterprets button selections carried
//! in the raw envelope:
//!
//! ```text
//! button id ──┬── starts with prefix ──▶ ButtonResolution::Command(input)
//!             ├── known literal id   ──▶ ButtonResolution::Canned(..)
//!             └── anything else      ──▶ ButtonResolution::Unrecognized
//! ```
//!
//! Resolving a button sets the message's button latch first, so the same
//! payload is reinterpreted at most once however often it is dispatched.

use std::time::Duration;

use chime_core::NormalizedMessage;

use crate::registry::{CommandHandler, Registry};

// =============================================================================
// CommandInput
// =============================================================================

/// Tokenized command text (prefix already removed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInput {
    /// First token with its original casing.
    pub raw_command: String,
    /// First token, lowercased. This is the lookup key.
    pub command: String,
    /// The remaining tokens joined by single spaces.
    pub text: String,
    /// The remaining tokens.
    pub args: Vec<String>,
}

impl CommandInput {
    /// Splits `input` on whitespace into key, free text and arguments.
    pub fn parse(input: &str) -> Self {
        let mut tokens = input.split_whitespace();
        let raw_command = tokens.next().unwrap_or_default().to_string();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        Self {
            command: raw_command.to_lowercase(),
            raw_command,
            text: args.join(" "),
            args,
        }
    }

    /// Parses `body` if it starts with `prefix`.
    pub fn from_prefixed(body: &str, prefix: &str) -> Option<Self> {
        strip_prefix(body, prefix).map(Self::parse)
    }
}

/// Returns the command text after `prefix`, trimmed, or `None` if `body` does
/// not start with it.
pub fn strip_prefix<'a>(body: &'a str, prefix: &str) -> Option<&'a str> {
    body.strip_prefix(prefix).map(str::trim)
}

/// The first command handler whose pattern accepts `input`.
pub fn find_command<'r>(registry: &'r Registry, input: &CommandInput) -> Option<&'r CommandHandler> {
    registry
        .commands()
        .iter()
        .find(|cmd| cmd.pattern.matches(&input.command, &input.raw_command))
}

// =============================================================================
// Buttons
// =============================================================================

/// Literal button ids answered without a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedButton {
    /// Status text with version and uptime.
    Alive,
}

impl CannedButton {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "alive" => Some(CannedButton::Alive),
            _ => None,
        }
    }

    /// The reply text for this button.
    pub fn reply(self, uptime: Duration) -> String {
        match self {
            CannedButton::Alive => format!(
                "*Bot is alive and running!*\n\n• Version: {}\n• Status: Online\n• Uptime: {}",
                env!("CARGO_PKG_VERSION"),
                format_uptime(uptime),
            ),
        }
    }
}

/// What a button selection turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonResolution {
    /// The id carried command text.
    Command { id: String, input: CommandInput },
    Canned(CannedButton),
    /// Neither command-shaped nor a known literal; dispatch continues with
    /// the message body.
    Unrecognized(String),
}

/// Resolves the button selection of `message`, if it has an unprocessed one.
///
/// Returns `None` when the envelope carries no selection or when the
/// selection was already reinterpreted. Otherwise the latch is set before the
/// id is parsed.
pub fn resolve_button(message: &NormalizedMessage, prefix: &str) -> Option<ButtonResolution> {
    let id = message.button_id()?;
    if !message.mark_button_processed() {
        tracing::trace!(button = id, "Button selection already processed");
        return None;
    }

    tracing::debug!(button = id, "Button pressed");
    let resolution = match CommandInput::from_prefixed(id, prefix) {
        Some(input) => ButtonResolution::Command {
            id: id.to_string(),
            input,
        },
        None => match CannedButton::from_id(id) {
            Some(canned) => ButtonResolution::Canned(canned),
            None => ButtonResolution::Unrecognized(id.to_string()),
        },
    };
    Some(resolution)
}

/// Formats a duration as `[Nd ][Nh ][Nm ]Ns`, omitting zero leading units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, seconds) = (rest / 60, rest % 60);

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    if hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::registry::CommandOptions;
    use chime_core::MessageKey;
    use serde_json::json;

    fn registry_with(patterns: Vec<Pattern>) -> Registry {
        let mut registry = Registry::new();
        for pattern in patterns {
            registry.command(CommandOptions::new(pattern), |_msg, _ctx| async {});
        }
        registry
    }

    #[test]
    fn test_parse_splits_key_text_and_args() {
        let input = CommandInput::from_prefixed(".PING  extra   args", ".").unwrap();
        assert_eq!(input.raw_command, "PING");
        assert_eq!(input.command, "ping");
        assert_eq!(input.text, "extra args");
        assert_eq!(input.args, ["extra", "args"]);
    }

    #[test]
    fn test_parse_trims_after_prefix() {
        let input = CommandInput::from_prefixed(".  menu", ".").unwrap();
        assert_eq!(input.command, "menu");
        assert!(input.args.is_empty());
        assert_eq!(input.text, "");
    }

    #[test]
    fn test_no_prefix() {
        assert_eq!(CommandInput::from_prefixed("hello", "."), None);
        assert_eq!(CommandInput::from_prefixed("", "."), None);
    }

    #[test]
    fn test_bare_prefix_is_empty_key() {
        let input = CommandInput::from_prefixed(".", ".").unwrap();
        assert_eq!(input.command, "");

        let registry = registry_with(vec!["ping".into(), "".into()]);
        let found = find_command(&registry, &input).unwrap();
        assert_eq!(found.pattern.as_str(), "");
    }

    #[test]
    fn test_literal_selects_only_its_handler() {
        let registry = registry_with(vec!["pin".into(), "ping".into(), "pingx".into()]);
        let input = CommandInput::parse("PiNg now");
        let found = find_command(&registry, &input).unwrap();
        assert_eq!(found.pattern.as_str(), "ping");
    }

    #[test]
    fn test_first_match_wins() {
        let registry = registry_with(vec![
            Pattern::regex("^p").unwrap(),
            "ping".into(),
        ]);
        let found = find_command(&registry, &CommandInput::parse("ping")).unwrap();
        assert!(!found.pattern.is_literal());
    }

    #[test]
    fn test_regex_sees_raw_key() {
        let registry = registry_with(vec![Pattern::regex("^[A-Z]+$").unwrap()]);
        assert!(find_command(&registry, &CommandInput::parse("LOUD")).is_some());
        assert!(find_command(&registry, &CommandInput::parse("quiet")).is_none());
    }

    fn button_message(id: &str) -> NormalizedMessage {
        NormalizedMessage::new(MessageKey::new("B1", "1@s.whatsapp.net"), "9@s.whatsapp.net")
            .with_raw(json!({
                "message": { "buttonsResponseMessage": { "selectedButtonId": id } }
            }))
    }

    #[test]
    fn test_resolve_button_once() {
        let msg = button_message(".menu tools");
        let first = resolve_button(&msg, ".");
        assert!(matches!(
            first,
            Some(ButtonResolution::Command { ref input, .. }) if input.command == "menu" && input.text == "tools"
        ));
        assert!(msg.is_button_processed());
        assert_eq!(resolve_button(&msg, "."), None);
    }

    #[test]
    fn test_resolve_canned_and_unrecognized() {
        assert_eq!(
            resolve_button(&button_message("alive"), "."),
            Some(ButtonResolution::Canned(CannedButton::Alive))
        );
        assert_eq!(
            resolve_button(&button_message("other"), "."),
            Some(ButtonResolution::Unrecognized("other".into()))
        );
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "59s");
        assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_alive_reply_contains_uptime() {
        let text = CannedButton::Alive.reply(Duration::from_secs(61));
        assert!(text.contains("Uptime: 1m 1s"));
        assert!(text.contains("Status: Online"));
    }
}
