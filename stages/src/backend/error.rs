//! Backend error types.

use thiserror::Error;

/// Errors reported by a [`ResourceFactory`](super::ResourceFactory).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The device was lost.
    #[error("GPU device lost")]
    DeviceLost,
}
