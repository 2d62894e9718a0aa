use tas_gate::GateError;
use tas_server::ServerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// `true` when the run never started because its inputs were invalid.
    pub fn is_configuration(&self) -> bool {
        match self {
            SimError::Config(_) | SimError::Json(_) | SimError::Io(_) => true,
            SimError::Gate(e) => e.is_configuration(),
            SimError::Server(e) => e.is_configuration(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
