//! Stage scheduler error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur while scheduling stages or building the image pool.
///
/// None of these are retried by the scheduler. The caller of
/// [`StageDirector::initialize_or_update`](crate::StageDirector::initialize_or_update)
/// decides whether to abort or keep running on the previous schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Two stages declare `Provides` for the same resource name.
    #[error("resource \"{name}\" provided by \"{second}\" is already provided by \"{first}\"")]
    DuplicateResourceName {
        /// The duplicated resource name.
        name: String,
        /// Display name of the first stage providing it.
        first: String,
        /// Display name of the second stage providing it.
        second: String,
    },

    /// No valid stage order exists: either a cycle or a missing producer.
    #[error(
        "unable to resolve stage order: {} remaining stage(s) {remaining:?}, first unmet dependency \"{missing}\"",
        remaining.len()
    )]
    UnsatisfiableDependency {
        /// Display names of the stages that could not be placed, in input order.
        remaining: Vec<String>,
        /// First unmet dependency name of the first remaining stage.
        missing: String,
    },

    /// The resource factory failed to create a physical image.
    #[error("image allocation failed: {0}")]
    AllocationFailure(#[from] BackendError),

    /// The scheduler configuration cannot satisfy the stage graph.
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfiguration(String),
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StageError::DuplicateResourceName {
            name: "out".into(),
            first: "gbuffer".into(),
            second: "raytrace".into(),
        };
        assert_eq!(
            err.to_string(),
            "resource \"out\" provided by \"raytrace\" is already provided by \"gbuffer\""
        );

        let err = StageError::UnsatisfiableDependency {
            remaining: vec!["A".into(), "B".into()],
            missing: "y".into(),
        };
        assert_eq!(
            err.to_string(),
            "unable to resolve stage order: 2 remaining stage(s) [\"A\", \"B\"], first unmet dependency \"y\""
        );
    }

    #[test]
    fn test_backend_error_converts() {
        let err: StageError = BackendError::OutOfMemory.into();
        assert_eq!(err, StageError::AllocationFailure(BackendError::OutOfMemory));
        assert_eq!(err.to_string(), "image allocation failed: out of GPU memory");
    }
}
