//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running a [`ChimeRuntime`](crate::ChimeRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The builder was finished without a transport.
    #[error("No transport configured; call RuntimeBuilder::transport before build")]
    MissingTransport,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
