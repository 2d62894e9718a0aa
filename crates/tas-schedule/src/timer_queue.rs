//! `TimerQueue` — ordered store of armed timers.
//!
//! # Ordering
//!
//! Timers are keyed by their [`TimerHandle`], whose derived ordering is
//! `(at, priority, seq)`:
//!
//! 1. earlier `at` first;
//! 2. at the same tick, smaller `priority` first;
//! 3. at the same tick and priority, the timer armed first runs first.
//!
//! The gate relies on (2) to make simultaneous open and close events
//! deterministic.
//!
//! Cancellation removes the key, so a cancelled timer can never be popped.

use std::collections::BTreeMap;

use tas_core::{Tick, TimerHandle, TimerTarget};

/// A priority queue of armed timers.
#[derive(Default)]
pub struct TimerQueue {
    inner:    BTreeMap<TimerHandle, TimerTarget>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `target` at `at`.  Returns the handle identifying this arming.
    pub fn push(&mut self, at: Tick, priority: i32, target: TimerTarget) -> TimerHandle {
        let handle = TimerHandle { at, priority, seq: self.next_seq };
        self.next_seq += 1;
        self.inner.insert(handle, target);
        handle
    }

    /// Disarm `handle`.  Returns its target, or `None` if it was not armed.
    pub fn remove(&mut self, handle: TimerHandle) -> Option<TimerTarget> {
        self.inner.remove(&handle)
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.inner.contains_key(&handle)
    }

    /// Remove and return the first timer in dispatch order.
    pub fn pop_next(&mut self) -> Option<(TimerHandle, TimerTarget)> {
        self.inner.pop_first()
    }

    /// The due time of the first timer, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().map(|h| h.at)
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of armed timers for `target`.
    pub fn count(&self, target: TimerTarget) -> usize {
        self.inner.values().filter(|&&t| t == target).count()
    }
}
