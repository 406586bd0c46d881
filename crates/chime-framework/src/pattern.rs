//! Command patterns.
//!
//! A command handler is keyed by a [`Pattern`], which is either literal text
//! or a compiled regular expression. Each variant has its own match rule:
//!
//! | Variant | Matches when |
//! |---------|--------------|
//! | [`Pattern::Literal`] | its lowercased text equals the (lowercased) command key |
//!
//! Literals built through `From` are lowercased up front, so `"Ping"` and
//! `"ping"` name the same handler slot.
//! | [`Pattern::Compiled`] | the expression accepts the raw, case-preserved key |
//!
//! ```rust,ignore
//! use chime_framework::Pattern;
//!
//! let ping = Pattern::from("ping");
//! assert!(ping.matches("ping", "PING"));
//!
//! let dl = Pattern::regex(r"^(yt|ig)dl$")?;
//! assert!(dl.matches("ytdl", "ytdl"));
//! ```

use std::fmt;

use regex::Regex;

/// Registration key of a command handler.
#[derive(Clone)]
pub enum Pattern {
    /// Literal command name, compared case-insensitively.
    Literal(String),
    /// Regular expression tested against the raw command key.
    Compiled(Regex),
}

impl Pattern {
    /// Compiles a regular-expression pattern.
    pub fn regex(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(expr).map(Pattern::Compiled)
    }

    /// Tests the pattern against a command key.
    ///
    /// `key` is the lowercased first token of the command text, `raw_key` the
    /// same token with its original casing.
    pub fn matches(&self, key: &str, raw_key: &str) -> bool {
        match self {
            Pattern::Literal(text) => text.to_lowercase() == key,
            Pattern::Compiled(re) => re.is_match(raw_key),
        }
    }

    /// Returns `true` if both patterns identify the same handler slot.
    ///
    /// Literals are identical when their text is equal ignoring case;
    /// compiled patterns when their source expressions are equal.
    pub fn same_key(&self, other: &Pattern) -> bool {
        match (self, other) {
            (Pattern::Literal(a), Pattern::Literal(b)) => a.to_lowercase() == b.to_lowercase(),
            (Pattern::Compiled(a), Pattern::Compiled(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }

    /// Returns the literal text or the regex source.
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Compiled(re) => re.as_str(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Pattern::Literal(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => f.write_str(text),
            Pattern::Compiled(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Pattern::Compiled(re) => f.debug_tuple("Compiled").field(&re.as_str()).finish(),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::Literal(text.to_lowercase())
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Literal(text.to_lowercase())
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Compiled(re)
    }
}
