//! Server configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tas_core::Bitrate;

use crate::{ServerError, ServerResult};

// ── PreemptionMode ────────────────────────────────────────────────────────────

/// Whether the server reacts to the gate's guard band.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PreemptionMode {
    /// Abort the running stream when the guard band activates and hold
    /// until it clears.
    WithHoldRelease,
    /// Ignore the guard band; admission at the gate is the only check.
    #[default]
    WithoutHoldRelease,
}

impl FromStr for PreemptionMode {
    type Err = ServerError;

    fn from_str(s: &str) -> ServerResult<Self> {
        match s {
            "withHoldRelease" => Ok(PreemptionMode::WithHoldRelease),
            "withoutHoldRelease" => Ok(PreemptionMode::WithoutHoldRelease),
            other => Err(ServerError::Config(format!(
                "preemption mode is {other:?} and is only allowed to be \"withHoldRelease\" or \"withoutHoldRelease\""
            ))),
        }
    }
}

impl TryFrom<String> for PreemptionMode {
    type Error = ServerError;

    fn try_from(s: String) -> ServerResult<Self> {
        s.parse()
    }
}

impl fmt::Display for PreemptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreemptionMode::WithHoldRelease => "withHoldRelease",
            PreemptionMode::WithoutHoldRelease => "withoutHoldRelease",
        })
    }
}

impl From<PreemptionMode> for String {
    fn from(mode: PreemptionMode) -> String {
        mode.to_string()
    }
}

// ── ServerConfig ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Rate at which packets are streamed downstream.
    pub datarate: Bitrate,

    #[serde(default)]
    pub preemption_mode: PreemptionMode,

    /// Tie-break priority of the end-of-stream timer (smaller first).
    #[serde(default)]
    pub end_scheduling_priority: i32,
}

impl ServerConfig {
    pub fn new(datarate: Bitrate, preemption_mode: PreemptionMode) -> Self {
        Self { datarate, preemption_mode, end_scheduling_priority: 0 }
    }
}
