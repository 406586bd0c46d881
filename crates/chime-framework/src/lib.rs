//! # Chime Framework
//!
//! The command/event registry and dispatch engine.
//!
//! This layer provides:
//! - [`Registry`]: command handlers keyed by [`Pattern`] and event handlers
//!   keyed by [`EventType`](chime_core::EventType), with one registration entry
//!   point
//! - Matcher: prefix stripping, tokenization, first-match pattern lookup and
//!   button reinterpretation
//! - [`PermissionPolicy`]: who may run non-public handlers
//! - [`Dispatcher`]: orchestrates matching, permission checks, reaction
//!   feedback and error isolation
//! - Plugin units: [`PluginDescriptor`], [`PluginLoader`], and the
//!   [`define_plugin!`] / [`link_plugin!`] macros
//! - Built-in `info` plugin (with the `builtin` feature)

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod feedback;
pub mod handler;
pub mod matcher;
pub mod pattern;
pub mod permission;
pub mod plugin;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{CommandContext, EventContext, Session};
pub use dispatcher::{DEFAULT_PREFIX, Dispatcher, PERMISSION_DENIED};
pub use error::{HandlerPanicked, PluginError};
pub use feedback::{Feedback, FeedbackLayer, FeedbackService, HandlerKind, Reaction, RunOutcome};
pub use handler::{HandlerResult, HandlerService, Invocation, into_service};
pub use matcher::{ButtonResolution, CannedButton, CommandInput, format_uptime};
pub use pattern::Pattern;
pub use permission::PermissionPolicy;
pub use plugin::{
    CHIME_PLUGIN_API_VERSION, LINKED_PLUGINS, LoadReport, PluginDescriptor, PluginLoader,
};
pub use registry::{
    CommandHandler, CommandOptions, Descriptor, EventHandler, EventOptions, Registry,
    SharedRegistry,
};

pub use tower::BoxError;
