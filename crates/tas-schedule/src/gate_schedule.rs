//! `GateSchedule` and the phase it implies at a given offset.
//!
//! # Cycle model
//!
//! The schedule is an ordered list of interval durations (ticks) that
//! repeats forever.  Interval `0` has the gate's configured initial
//! openness; each subsequent interval toggles it.  With an odd number of
//! intervals the openness of interval `i` therefore alternates between
//! cycles, which the reduction below handles naturally because it toggles
//! per interval rather than deriving openness from the index.
//!
//! A schedule is immutable once built.  Reconfiguration replaces it.

use crate::{ScheduleError, ScheduleResult};

// ── PhaseState ────────────────────────────────────────────────────────────────

/// Where in the cycle a gate is: interval `index`, `offset` ticks into it,
/// and whether the gate is open during it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PhaseState {
    pub index:   usize,
    /// Ticks already consumed in interval `index`.
    pub offset:  u64,
    pub is_open: bool,
}

// ── GateSchedule ──────────────────────────────────────────────────────────────

/// A validated gate control list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GateSchedule {
    durations:      Vec<u64>,
    total_duration: u64,
}

impl GateSchedule {
    /// Build a schedule from interval durations.
    ///
    /// Fails if `durations` is empty or any duration is zero.
    pub fn new(durations: Vec<u64>) -> ScheduleResult<Self> {
        if durations.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if let Some(index) = durations.iter().position(|&d| d == 0) {
            return Err(ScheduleError::NonPositiveDuration { index });
        }
        let total_duration = durations.iter().sum();
        Ok(Self { durations, total_duration })
    }

    /// Build a schedule from a flat list of open/closed pairs.
    ///
    /// Same as [`new`][Self::new] but additionally rejects odd lengths, so
    /// every cycle starts in the same phase.
    pub fn from_pairs(durations: Vec<u64>) -> ScheduleResult<Self> {
        if durations.len() % 2 != 0 {
            return Err(ScheduleError::OddLength { len: durations.len() });
        }
        Self::new(durations)
    }

    pub fn durations(&self) -> &[u64] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Always `false`: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Length of one full cycle in ticks.  Always `> 0`.
    pub fn total_duration(&self) -> u64 {
        self.total_duration
    }

    /// Duration of interval `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn duration(&self, index: usize) -> u64 {
        self.durations[index]
    }

    /// The interval after `index`, wrapping at the end of the cycle.
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.durations.len()
    }

    /// Resolve `initial_offset` into a phase.
    ///
    /// Whole phase periods are discarded first, then whole intervals are
    /// consumed one at a time, toggling openness for each.  The result
    /// satisfies `offset < duration(index)`.
    pub fn phase_at(&self, initial_offset: u64, initially_open: bool) -> PhaseState {
        let mut phase = PhaseState {
            index:   0,
            offset:  initial_offset % self.phase_period(),
            is_open: initially_open,
        };
        while phase.offset >= self.durations[phase.index] {
            phase.offset -= self.durations[phase.index];
            phase.is_open = !phase.is_open;
            phase.index = self.next_index(phase.index);
        }
        phase
    }

    /// The span after which the phase pattern repeats exactly: one cycle for
    /// an even number of intervals, two for an odd number (the openness of
    /// every interval flips between consecutive cycles).
    pub fn phase_period(&self) -> u64 {
        if self.durations.len() % 2 == 0 {
            self.total_duration
        } else {
            2 * self.total_duration
        }
    }
}
