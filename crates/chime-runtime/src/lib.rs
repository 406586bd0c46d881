//! # Chime Runtime
//!
//! Orchestration layer for the Chime framework:
//!
//! - [`config`]: layered configuration (defaults, `chime.toml` / `chime.yaml`,
//!   `CHIME_*` environment variables) with validation
//! - [`logging`]: `tracing-subscriber` setup driven by configuration
//! - [`ChimeRuntime`]: loads plugin units, builds the dispatcher and drains a
//!   stream of inbound messages until shutdown
//!
//! ```rust,ignore
//! use chime_runtime::ChimeRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (transport, messages) = connect().await?;
//!     let runtime = ChimeRuntime::builder().transport(transport).build()?;
//!     runtime.run(messages).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ChimeConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{ChimeRuntime, RuntimeBuilder};

pub use figment;
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
