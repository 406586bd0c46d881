//! Built-in plugins shipped with the Chime framework.
//!
//! Enabled by the `builtin` feature flag.
//!
//! | Plugin | Commands | Description |
//! |--------|----------|-------------|
//! | [`INFO_PLUGIN`] | `ping`, `alive`, `menu` | Responsiveness, status and command listing |
//!
//! # Loading built-in plugins
//!
//! ```rust,ignore
//! use chime_framework::plugin::builtin;
//!
//! loader.load(builtin::ALL);
//! ```
//!
//! The runtime loads them together with the linked plugins.

pub mod info;

pub use info::INFO_PLUGIN;

use super::PluginDescriptor;

/// All built-in plugins.
pub static ALL: &[PluginDescriptor] = &[INFO_PLUGIN];
