use thiserror::Error;

/// Malformed gate control lists.  Every variant is a configuration error.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("gate schedule must contain at least one duration")]
    Empty,

    #[error("unaccepted duration value (0) at position {index}: durations must be > 0")]
    NonPositiveDuration { index: usize },

    #[error("gate schedule must contain an even number of values, got {len}")]
    OddLength { len: usize },

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
