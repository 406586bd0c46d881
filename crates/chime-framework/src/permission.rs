//! Invocation permission checks.

use chime_core::{NormalizedMessage, jid};

/// Who may invoke non-public handlers besides the bot itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPolicy {
    owner: Option<String>,
    sudo: Vec<String>,
}

impl PermissionPolicy {
    /// Builds a policy. Entries may be bare numbers or full identifiers; only
    /// their local part is kept.
    pub fn new<I, S>(owner: Option<&str>, sudo: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            owner: owner
                .map(|o| jid::local_part(o.trim()).to_string())
                .filter(|o| !o.is_empty()),
            sudo: sudo
                .into_iter()
                .map(|s| jid::local_part(s.as_ref().trim()).to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn sudo(&self) -> &[String] {
        &self.sudo
    }

    /// Returns `true` if the sender of `message` may run a handler with the
    /// given visibility.
    ///
    /// Public handlers are open to everyone. Otherwise the message must come
    /// from the bot's own account, or its sender must be the bot, a sudo
    /// user, or the owner.
    pub fn can_invoke(&self, message: &NormalizedMessage, public: bool) -> bool {
        if public || message.key.from_me {
            return true;
        }

        let sender = jid::local_part(message.sender());
        if sender.is_empty() {
            return false;
        }
        if jid::same_user(sender, &message.user) {
            return true;
        }

        self.sudo.iter().any(|s| s == sender) || self.owner.as_deref() == Some(sender)
    }
}
