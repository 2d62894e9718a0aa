//! Timer capability shared by every clock-driven component.
//!
//! Components never own an event loop.  They receive a `&mut impl TimerHost`
//! on each entry point, arm or cancel timers through it, and are called back
//! by the host with the [`TimerHandle`] that fired.

use std::fmt;

use crate::Tick;

/// Which component timer an event belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TimerTarget {
    /// The gate's next open/close transition.
    GatePhase,
    /// The gate's worst-case guard-band activation.
    GuardBandActivation,
    /// The server's end-of-stream timer.
    StreamEnd,
    /// The next packet from the traffic source.
    Arrival,
}

impl fmt::Display for TimerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerTarget::GatePhase           => "gate-phase",
            TimerTarget::GuardBandActivation => "guard-band-activation",
            TimerTarget::StreamEnd           => "stream-end",
            TimerTarget::Arrival             => "arrival",
        };
        f.write_str(name)
    }
}

/// An armed timer.
///
/// The fields form the total dispatch order `(at, priority, seq)`; `seq` is
/// unique per host, so two handles are equal only if they name the same
/// arming.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimerHandle {
    pub at:       Tick,
    /// Tie-break for timers due at the same tick: smaller runs first.
    pub priority: i32,
    pub seq:      u64,
}

/// A time source that can schedule and cancel timed callbacks.
pub trait TimerHost {
    /// The current simulation time.
    fn now(&self) -> Tick;

    /// Arm `target` to fire at the absolute time `at`.
    fn schedule_at(&mut self, at: Tick, priority: i32, target: TimerTarget) -> TimerHandle;

    /// Arm `target` to fire `delay` ticks from now.
    fn schedule_after(&mut self, delay: u64, priority: i32, target: TimerTarget) -> TimerHandle {
        let at = self.now() + delay;
        self.schedule_at(at, priority, target)
    }

    /// Cancel an armed timer.  Returns `false` if it already fired or was
    /// cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// `true` while `handle` is armed and has not fired.
    fn is_scheduled(&self, handle: TimerHandle) -> bool;
}
