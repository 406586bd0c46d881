//! Plugin units.
//!
//! # Architecture
//!
//! A plugin is a named unit of handler definitions. It is described by a
//! static, `Copy` [`PluginDescriptor`] carrying metadata and a `setup`
//! function that registers the unit's commands and event handlers into a
//! [`Registry`](crate::Registry).
//!
//! Units reach the loader in one of two ways:
//!
//! - **linked**: declared with [`link_plugin!`](crate::link_plugin), which
//!   places the descriptor into the [`LINKED_PLUGINS`] distributed slice at
//!   link time;
//! - **explicit**: passed to [`PluginLoader::load`] directly.
//!
//! The set of units is fixed when the binary is built. There is no path that
//! installs handler code at runtime.
//!
//! # Quick start
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
//!     pub static ECHO = define_plugin! {
//!         name: "echo",
//!         setup: setup,
//!     };
//! }
//! ```

// ─── Submodules ──────────────────────────────────────────────────────────────
pub mod descriptor;
pub mod loader;
pub mod macros;

#[cfg(feature = "builtin")]
pub mod builtin;

// ─── Re-exports from submodules ──────────────────────────────────────────────
pub use descriptor::{CHIME_PLUGIN_API_VERSION, PluginDescriptor, SetupFn};
pub use loader::{LoadReport, PluginLoader};

// ─── Macro-internal re-export (needed by link_plugin! at call sites) ─────────
#[doc(hidden)]
pub use linkme as __linkme;

/// Every plugin declared with [`link_plugin!`](crate::link_plugin) in the
/// final binary.
#[linkme::distributed_slice]
pub static LINKED_PLUGINS: [PluginDescriptor];
