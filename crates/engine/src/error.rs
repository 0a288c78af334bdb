use schedule_core::{
    ids::{PreviewId, Version},
    preview::PreviewStatus,
    CoreError,
};
use schedule_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {}", blockers.join("; "))]
    ConstraintViolation { blockers: Vec<String> },

    #[error("version mismatch: preview expects {expected}, schedule is at {current}")]
    VersionMismatch { expected: Version, current: Version },

    #[error("preview expired: {0}")]
    ExpiredPreview(PreviewId),

    #[error("preview {preview} is {}", status.as_str())]
    InvalidState {
        preview: PreviewId,
        status: PreviewStatus,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Missing rows surface as `NotFound` and a failed compare-and-swap as a
/// version mismatch; everything else stays a storage error.
impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            StorageError::VersionConflict {
                expected, current, ..
            } => Self::VersionMismatch {
                expected: Version::new(expected),
                current: Version::new(current),
            },
            other => Self::Storage(other),
        }
    }
}
