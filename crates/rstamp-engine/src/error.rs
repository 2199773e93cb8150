//! Error types for the stamping pipeline.

use thiserror::Error;

/// Errors that can occur while building or applying a stamp.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An error propagated from the core domain layer.
    #[error(transparent)]
    Core(#[from] rstamp_core::Error),

    /// An I/O error outside the core codecs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parameter failed validation.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// Two grids that must share a gridding do not.
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    /// A stamp profile could not be loaded or applied.
    #[error("profile {name}: {message}")]
    Profile { name: String, message: String },

    /// A TOML profile failed to parse.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EngineError {
    /// Returns `true` when the error is caused by user-supplied parameters
    /// rather than by the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::GridMismatch(_) | Self::Profile { .. }
        )
    }
}

/// Convenience alias for engine results.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
