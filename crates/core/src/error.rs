use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid week id: {0}")]
    InvalidWeek(String),

    #[error("invalid time range: {start}-{end}")]
    InvalidTimeRange { start: u16, end: u16 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
