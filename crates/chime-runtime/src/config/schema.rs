//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use chime_framework::{DEFAULT_PREFIX, PermissionPolicy};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChimeConfig {
    /// Command prefix and privileged users.
    pub bot: BotConfig,

    pub logging: LoggingConfig,

    /// Plugin load settings.
    pub plugins: PluginsConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Dispatch settings, captured once when the runtime is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Leading text that marks a message as a command.
    pub prefix: String,

    /// Owner identifier (number or full chat id).
    #[serde(deserialize_with = "deserialize_owner")]
    pub owner: Option<String>,

    /// Sudo users. Accepts a list or a comma-separated string.
    #[serde(deserialize_with = "deserialize_sudo")]
    pub sudo: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            owner: None,
            sudo: Vec::new(),
        }
    }
}

impl BotConfig {
    /// The permission policy described by `owner` and `sudo`.
    pub fn policy(&self) -> PermissionPolicy {
        PermissionPolicy::new(self.owner.as_deref(), &self.sudo)
    }
}

/// A config scalar that may arrive as text or as a bare number (environment
/// values such as `CHIME_BOT__OWNER=2348012345678` parse as integers).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(u64),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarOrList {
    One(Scalar),
    Many(Vec<Scalar>),
}

fn deserialize_owner<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let owner = Option::<Scalar>::deserialize(d)?;
    Ok(owner
        .map(Scalar::into_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn deserialize_sudo<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let entries = match Option::<ScalarOrList>::deserialize(d)? {
        None => Vec::new(),
        Some(ScalarOrList::One(one)) => one
            .into_string()
            .split(',')
            .map(str::to_string)
            .collect(),
        Some(ScalarOrList::Many(many)) => many.into_iter().map(Scalar::into_string).collect(),
    };
    Ok(entries
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// =============================================================================
// Plugins
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Names of plugin units to skip at load.
    pub disabled: Vec<String>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires `logging.file_path`.
    File,
}

/// Log file rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-module levels, e.g. `chime_framework = "debug"`.
    pub filters: HashMap<String, LogLevel>,
}
