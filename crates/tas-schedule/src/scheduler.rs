//! `EventScheduler` — the clock plus the timer queue.
//!
//! This is the minimal event kernel the gate and server run on: it answers
//! `now()`, arms and cancels timers, and hands due timers back to the
//! caller one at a time, advancing the clock as it goes.

use tas_core::{SimClock, Tick, TimerHandle, TimerHost, TimerTarget};

use crate::TimerQueue;

#[derive(Default)]
pub struct EventScheduler {
    pub clock: SimClock,
    queue:     TimerQueue,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the next timer due at or before `until`, advancing the clock to
    /// its due time.  Returns `None` (and leaves the clock alone) if the
    /// next timer lies beyond `until`.
    pub fn pop_due(&mut self, until: Tick) -> Option<(TimerHandle, TimerTarget)> {
        if self.queue.next_tick()? > until {
            return None;
        }
        let (handle, target) = self.queue.pop_next()?;
        self.clock.advance_to(handle.at);
        tracing::trace!(at = %handle.at, priority = handle.priority, %target, "dispatching timer");
        Some((handle, target))
    }

    /// Move the clock to `tick` without dispatching anything.
    ///
    /// # Panics
    /// Panics in debug mode if a timer is due before `tick`.
    pub fn advance_to(&mut self, tick: Tick) {
        debug_assert!(
            self.queue.next_tick().is_none_or(|t| t >= tick),
            "advancing past an undispatched timer"
        );
        self.clock.advance_to(tick);
    }

    /// Due time of the next armed timer.
    pub fn next_tick(&self) -> Option<Tick> {
        self.queue.next_tick()
    }

    /// Read-only view of the armed timers.
    pub fn queue(&self) -> &TimerQueue {
        &self.queue
    }
}

impl TimerHost for EventScheduler {
    fn now(&self) -> Tick {
        self.clock.current_tick
    }

    fn schedule_at(&mut self, at: Tick, priority: i32, target: TimerTarget) -> TimerHandle {
        debug_assert!(at >= self.now(), "cannot arm a timer in the past");
        self.queue.push(at, priority, target)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.queue.remove(handle).is_some()
    }

    fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.queue.contains(handle)
    }
}
