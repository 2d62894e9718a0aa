use tas_core::{CoreError, TimerHandle};
use tas_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("gate configuration error: {0}")]
    Config(String),

    #[error("invalid gate schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("invalid data rate: {0}")]
    Rate(#[from] CoreError),

    #[error("unknown timer {handle:?} delivered to gate")]
    UnknownTimer { handle: TimerHandle },

    #[error("admission queried while the gate is closed")]
    GateClosed,
}

impl GateError {
    /// `true` for errors raised while validating configuration; `false`
    /// for internal-consistency failures at run time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GateError::Config(_) | GateError::Schedule(_) | GateError::Rate(_))
    }
}

pub type GateResult<T> = Result<T, GateError>;
