//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// An operator was invoked on a session with no image.
    #[error("no image loaded")]
    NoImageLoaded,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Kernel weights sum to zero in absolute value, so an intensity
    /// response cannot be normalized.
    #[error("degenerate kernel: sum of absolute weights is zero")]
    DegenerateKernel,

    /// Error from the core image types.
    #[error(transparent)]
    Core(#[from] rasterkit_core::Error),
}

impl OpsError {
    /// Shorthand for [`OpsError::InvalidParameter`].
    pub(crate) fn param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
