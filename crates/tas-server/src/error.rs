use tas_core::TimerHandle;
use tas_gate::GateSignal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server configuration error: {0}")]
    Config(String),

    #[error("unexpected signal {0:?} delivered to server")]
    UnexpectedSignal(GateSignal),

    #[error("unknown timer {handle:?} delivered to server")]
    UnknownTimer { handle: TimerHandle },

    #[error("server is not streaming")]
    NotStreaming,

    #[error("server is already streaming")]
    AlreadyStreaming,

    #[error("provider offered no packet to stream")]
    NothingToPull,
}

impl ServerError {
    /// `true` for errors raised while validating configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ServerError::Config(_))
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
