//! Guard-band sizing and the admission predicate.
//!
//! Everything here is a pure function of the gate's configuration, the
//! current time, the candidate frame and the next scheduled close.  The
//! [`PeriodicGate`][crate::PeriodicGate] owns one calculator and consults
//! it whenever an input changes.
//!
//! # Projected duration
//!
//! ```text
//! worst case:  (max_frame_length + fixed_overhead) * 8 / rate + extra_latency
//! best case:   (packet_length   + extra_length)    * 8 / rate + extra_latency
//! ```
//!
//! A candidate is admitted iff `now + projected ≤ next_close`.  The guard
//! band is active iff the gate is open and the head-of-line candidate (any
//! candidate, under the worst case) would not be admitted.

use tas_core::{Bitrate, Packet, Tick};

use crate::{GateConfig, GuardBandPolicy};

/// Overhead added to the worst-case frame by the admission check.
pub const DEFAULT_FIXED_OVERHEAD_BYTES: u64 = 100;

/// Guard-band decisions for one gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardBandCalculator {
    pub policy:           GuardBandPolicy,
    pub data_rate:        Option<Bitrate>,
    pub implicit:         bool,
    pub max_frame_length: u64,
    pub fixed_overhead:   u64,
    pub extra_length:     u64,
    pub extra_latency:    u64,
}

impl GuardBandCalculator {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            policy:           config.guard_band_policy,
            data_rate:        config.data_rate,
            implicit:         config.enable_implicit_guard_band,
            max_frame_length: config.max_frame_length,
            fixed_overhead:   config.fixed_overhead_bytes,
            extra_length:     config.extra_length_bytes,
            extra_latency:    config.extra_latency,
        }
    }

    /// How long before a close the worst-case guard band starts: the
    /// serialization time of the largest frame.
    ///
    /// `None` when no timed guard band applies (best-case policy, unbounded
    /// rate, or implicit guard band disabled).
    pub fn worst_case_lead(&self) -> Option<u64> {
        if self.policy != GuardBandPolicy::WorstCase || !self.implicit {
            return None;
        }
        self.data_rate
            .map(|rate| rate.transmission_ticks_for_bytes(self.max_frame_length))
    }

    /// Projected transmission time of `candidate`, including the latency
    /// allowance.  `None` on an unbounded link, or for a missing candidate
    /// under the best-case policy.
    pub fn projected_duration(&self, candidate: Option<&Packet>) -> Option<u64> {
        let rate = self.data_rate?;
        let bytes = match self.policy {
            GuardBandPolicy::WorstCase => self.max_frame_length + self.fixed_overhead,
            GuardBandPolicy::BestCase => candidate?.length_bytes + self.extra_length,
        };
        Some(rate.transmission_ticks_for_bytes(bytes) + self.extra_latency)
    }

    /// Can `candidate` start at `now` and finish by `next_close`?
    ///
    /// Assumes the gate is open.  With no close scheduled every candidate
    /// is admitted.
    pub fn admits(&self, now: Tick, candidate: Option<&Packet>, next_close: Option<Tick>) -> bool {
        if self.data_rate.is_none() {
            return true;
        }
        if self.policy == GuardBandPolicy::BestCase && candidate.is_none() {
            return false;
        }
        if !self.implicit {
            return true;
        }
        let Some(duration) = self.projected_duration(candidate) else {
            return true;
        };
        next_close.is_none_or(|close| now + duration <= close)
    }

    /// Whether the guard band is active for the given gate state.
    pub fn evaluate(
        &self,
        is_open:    bool,
        now:        Tick,
        head:       Option<&Packet>,
        next_close: Option<Tick>,
    ) -> bool {
        if !is_open {
            return false;
        }
        // An empty queue cannot miss a deadline under the best case.
        let sized = self.policy == GuardBandPolicy::WorstCase || head.is_some();
        sized && !self.admits(now, head, next_close)
    }
}
