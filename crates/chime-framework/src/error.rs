//! Error types for the Chime framework.

use std::any::Any;

use thiserror::Error;
use tower::BoxError;

/// Errors produced while loading a plugin unit.
///
/// None of these abort a load pass: the loader logs them per unit and keeps
/// going.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The unit's setup function returned an error.
    #[error("plugin '{plugin}' failed to set up: {source}")]
    SetupFailed {
        plugin: &'static str,
        #[source]
        source: BoxError,
    },

    /// The unit's setup function panicked.
    #[error("plugin '{plugin}' panicked during setup: {message}")]
    SetupPanicked {
        plugin: &'static str,
        message: String,
    },

    /// The unit was built against an incompatible plugin API.
    #[error("plugin '{plugin}' targets API {found:#010x}, host provides {host:#010x}")]
    IncompatibleApi {
        plugin: &'static str,
        found: u32,
        host: u32,
    },
}

impl PluginError {
    /// Name of the unit that failed.
    pub fn plugin(&self) -> &'static str {
        match self {
            PluginError::SetupFailed { plugin, .. }
            | PluginError::SetupPanicked { plugin, .. }
            | PluginError::IncompatibleApi { plugin, .. } => plugin,
        }
    }
}

/// A handler callback panicked. Reported to the user like a returned error.
#[derive(Debug, Clone, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanicked(pub String);

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
