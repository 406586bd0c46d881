//! Configuration for the Chime runtime.
//!
//! Settings are layered with figment: built-in defaults, then a `chime.toml`
//! (or `chime.yaml`) file, then `CHIME_*` environment variables. The result is
//! validated once and captured when the runtime is built; changing a source
//! afterwards has no effect on a running process.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    BotConfig, ChimeConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    PluginsConfig, SpanEventConfig,
};
pub use validation::validate_config;
