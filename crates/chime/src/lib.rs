//! # Chime
//!
//! A plugin-based command and event dispatch framework for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ NormalizedMessage ┌────────────┐   ┌─────────────────────────────┐
//! │ Transport │──────────────────▶│ Dispatcher │──▶│ command / event handlers    │
//! │ (session) │◀──────────────────│            │   │ (registered by plugin units)│
//! └───────────┘  replies, reacts  └────────────┘   └─────────────────────────────┘
//! ```
//!
//! - **Transport**: the chat session; delivers messages and sends replies
//! - **Dispatcher**: button ids, prefixed commands, then event-type fallback
//! - **Plugin units**: named sets of handlers linked into the binary
//! - **Runtime**: configuration, logging, plugin loading and the message loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chime::prelude::*;
//!
//! fn setup(registry: &mut Registry) -> Result<(), BoxError> {
//!     registry.command(
//!         CommandOptions::new("echo").desc("Repeats its arguments"),
//!         |msg, ctx| async move { ctx.reply(&msg, &ctx.text).await },
//!     );
//!     Ok(())
//! }
//!
//! link_plugin! {
//!     static ECHO = define_plugin! { name: "echo", setup: setup };
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (transport, messages) = my_transport::connect().await?;
//!     let runtime = ChimeRuntime::builder().transport(transport).build()?;
//!     runtime.run(messages).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `chime.toml` configuration files
//! - `yaml-config`: `chime.yaml` configuration files
//! - `json-log`: JSON log output
//! - `builtin-plugins`: the `info` plugin (`ping`, `alive`, `menu`)

pub use chime_core as core;
pub use chime_framework as framework;
pub use chime_runtime as runtime;

/// Re-exported for implementing [`Transport`](chime_core::Transport).
pub use async_trait::async_trait;

/// Commonly used types for building bots.
///
/// ```rust,ignore
/// use chime::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use chime_runtime::{ChimeConfig, ChimeRuntime, ConfigLoader, RuntimeBuilder};

    // Plugin units
    pub use chime_framework::{
        PluginDescriptor, PluginLoader, define_plugin, link_plugin, plugin::LoadReport,
    };

    // Registration
    pub use chime_framework::{BoxError, CommandOptions, EventOptions, Pattern, Registry};

    // Handler contexts
    pub use chime_framework::{CommandContext, EventContext, Session};

    // Dispatch
    pub use chime_framework::{Dispatcher, PermissionPolicy};

    // Message model and transport boundary
    pub use chime_core::{
        BoxedTransport, EventType, MessageContent, MessageKey, NormalizedMessage, Transport,
        TransportError, TransportResult,
    };

    pub use crate::async_trait;
}
