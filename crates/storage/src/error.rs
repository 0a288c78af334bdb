use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("version conflict on {schedule}: expected {expected}, found {current}")]
    VersionConflict {
        schedule: String,
        expected: u64,
        current: u64,
    },

    #[error("core error: {0}")]
    Core(#[from] schedule_core::CoreError),
}
