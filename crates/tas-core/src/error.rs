//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` via `From`
//! where a core value (such as a data rate string) fails to parse.

use thiserror::Error;

/// The error type for `tas-core` value parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid data rate {0:?}: expected e.g. \"1Gbps\", \"100Mbps\", \"10kbps\" or \"9600bps\"")]
    InvalidBitrate(String),

    #[error("data rate must be greater than zero")]
    ZeroBitrate,
}

/// Shorthand result type for `tas-core`.
pub type CoreResult<T> = Result<T, CoreError>;
