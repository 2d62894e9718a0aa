//! Gate configuration.
//!
//! Typically deserialized from the `gate` section of a JSON config by the
//! simulation crate.  Every field has a default so partial configs work;
//! validation happens in [`PeriodicGate::new`][crate::PeriodicGate::new].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tas_core::Bitrate;
use tas_schedule::GateSchedule;

use crate::{DEFAULT_FIXED_OVERHEAD_BYTES, GateError, GateResult};

// ── GuardBandPolicy ───────────────────────────────────────────────────────────

/// How the guard band ahead of each close is sized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GuardBandPolicy {
    /// Sized to the next queued frame.
    BestCase,
    /// Sized to the largest frame the link can carry.
    WorstCase,
}

impl FromStr for GuardBandPolicy {
    type Err = GateError;

    fn from_str(s: &str) -> GateResult<Self> {
        match s {
            "bestCase" => Ok(GuardBandPolicy::BestCase),
            "worstCase" => Ok(GuardBandPolicy::WorstCase),
            other => Err(GateError::Config(format!(
                "guard band policy is {other:?} and is only allowed to be \"bestCase\" or \"worstCase\""
            ))),
        }
    }
}

impl TryFrom<String> for GuardBandPolicy {
    type Error = GateError;

    fn try_from(s: String) -> GateResult<Self> {
        s.parse()
    }
}

impl fmt::Display for GuardBandPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GuardBandPolicy::BestCase => "bestCase",
            GuardBandPolicy::WorstCase => "worstCase",
        })
    }
}

impl From<GuardBandPolicy> for String {
    fn from(policy: GuardBandPolicy) -> String {
        policy.to_string()
    }
}

// ── GateConfig ────────────────────────────────────────────────────────────────

/// Everything a [`PeriodicGate`][crate::PeriodicGate] is built from.
///
/// All durations are ticks (nanoseconds); all lengths are bytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Flat list of open/closed interval durations.  Must be non-empty, of
    /// even length, and every entry `> 0`.
    pub schedule: Vec<u64>,

    /// How far into the cycle the gate starts.
    pub initial_offset: u64,

    /// Openness of interval 0.
    pub initially_open: bool,

    /// Arm timers at absolute deadlines instead of relative delays.
    pub schedule_for_absolute_time: bool,

    pub guard_band_policy: GuardBandPolicy,

    /// When `false`, no guard band is computed and admission reduces to
    /// "is the gate open".
    pub enable_implicit_guard_band: bool,

    /// Largest frame the link may carry (worst-case sizing).
    pub max_frame_length: u64,

    /// Added to `max_frame_length` by the worst-case admission check so the
    /// comparison at the activation instant resolves to "blocked".
    pub fixed_overhead_bytes: u64,

    /// Added to the candidate's length by the best-case check (preamble,
    /// inter-frame gap, …).
    pub extra_length_bytes: u64,

    /// Fixed latency allowance added to every projected transmission.
    pub extra_latency: u64,

    /// Link rate.  `None` models an unrateable link: no guard band.
    pub data_rate: Option<Bitrate>,

    /// Tie-break priority of transitions that open the gate (smaller first).
    pub open_scheduling_priority: i32,

    /// Tie-break priority of transitions that close the gate (smaller first).
    pub close_scheduling_priority: i32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            schedule:                   Vec::new(),
            initial_offset:             0,
            initially_open:             false,
            schedule_for_absolute_time: false,
            guard_band_policy:          GuardBandPolicy::WorstCase,
            enable_implicit_guard_band: true,
            max_frame_length:           1_500,
            fixed_overhead_bytes:       DEFAULT_FIXED_OVERHEAD_BYTES,
            extra_length_bytes:         0,
            extra_latency:              0,
            data_rate:                  None,
            open_scheduling_priority:   0,
            close_scheduling_priority:  0,
        }
    }
}

impl GateConfig {
    /// Validate and build the gate control list.
    pub fn build_schedule(&self) -> GateResult<GateSchedule> {
        Ok(GateSchedule::from_pairs(self.schedule.clone())?)
    }
}
