//! The `PeriodicGate` engine.
//!
//! # Timers
//!
//! At most two timers are armed at any instant:
//!
//! - the **phase timer**, due at the end of the current interval;
//! - under the worst-case policy, the **guard-band timer**, due
//!   `worst_case_lead` ticks before a close.
//!
//! When the phase timer fires the gate re-arms the next transition *first*
//! and only then opens or closes, so the next close is already known when
//! the guard band and admission are evaluated for the new phase.
//!
//! # Tie-breaking
//!
//! A phase timer that ends an open interval (a close) carries
//! `close_scheduling_priority`; one that ends a closed interval (an open)
//! carries `open_scheduling_priority`.  The guard-band timer inherits the
//! priority of the close it precedes.  The timer host runs smaller
//! priorities first at equal times.

use tas_core::{Packet, Tick, TimerHandle, TimerHost, TimerTarget};
use tas_schedule::GateSchedule;

use crate::{
    GateConfig, GateError, GateResult, GateSignal, GuardBandCalculator, GuardBandPolicy,
};

pub struct PeriodicGate {
    schedule:                   GateSchedule,
    initial_offset:             u64,
    initially_open:             bool,
    schedule_for_absolute_time: bool,
    open_priority:              i32,
    close_priority:             i32,
    guard_band:                 GuardBandCalculator,

    // ── Phase state ───────────────────────────────────────────────────────
    /// Interval the phase timer will time next.
    index:  usize,
    /// Ticks already consumed of interval `index`; reset once armed.
    offset: u64,
    is_open: bool,

    // ── Derived state ─────────────────────────────────────────────────────
    in_guard_band:        bool,
    transmission_allowed: bool,

    phase_timer:      Option<TimerHandle>,
    guard_band_timer: Option<TimerHandle>,
}

impl PeriodicGate {
    /// Validate `config` and build a gate.
    ///
    /// The gate reports closed and arms no timers until
    /// [`initialize`][Self::initialize] resolves its starting phase.
    pub fn new(config: &GateConfig) -> GateResult<Self> {
        let schedule = config.build_schedule()?;
        let phase = schedule.phase_at(config.initial_offset, config.initially_open);
        Ok(Self {
            schedule,
            initial_offset:             config.initial_offset,
            initially_open:             config.initially_open,
            schedule_for_absolute_time: config.schedule_for_absolute_time,
            open_priority:              config.open_scheduling_priority,
            close_priority:             config.close_scheduling_priority,
            guard_band:                 GuardBandCalculator::from_config(config),
            index:                      phase.index,
            offset:                     phase.offset,
            is_open:                    false,
            in_guard_band:              false,
            transmission_allowed:       false,
            phase_timer:                None,
            guard_band_timer:           None,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_in_guard_band(&self) -> bool {
        self.in_guard_band
    }

    /// `is_open && !is_in_guard_band`.
    pub fn is_transmission_allowed(&self) -> bool {
        self.transmission_allowed
    }

    pub fn initial_offset(&self) -> u64 {
        self.initial_offset
    }

    pub fn initially_open(&self) -> bool {
        self.initially_open
    }

    pub fn durations(&self) -> &[u64] {
        self.schedule.durations()
    }

    pub fn schedule(&self) -> &GateSchedule {
        &self.schedule
    }

    pub fn policy(&self) -> GuardBandPolicy {
        self.guard_band.policy
    }

    pub fn guard_band(&self) -> &GuardBandCalculator {
        &self.guard_band
    }

    /// The armed phase timer, if any.
    pub fn phase_timer(&self) -> Option<TimerHandle> {
        self.phase_timer
    }

    /// The armed guard-band activation timer, if any.
    pub fn guard_band_timer(&self) -> Option<TimerHandle> {
        self.guard_band_timer
    }

    /// When the gate will next close, if it is open now.
    pub fn next_close_time(&self) -> Option<Tick> {
        if self.is_open {
            self.phase_timer.map(|h| h.at)
        } else {
            None
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Resolve the phase from the configured offset, cancel any pending
    /// timers and arm the next transition.
    pub fn initialize<T: TimerHost>(
        &mut self,
        head:   Option<&Packet>,
        timers: &mut T,
    ) -> Vec<GateSignal> {
        let mut signals = Vec::new();
        self.initialize_gating(head, timers, &mut signals);
        signals
    }

    /// Replace the schedule and starting phase, then re-initialize.
    ///
    /// The new list is validated before anything is touched: on error the
    /// gate keeps running its previous schedule.
    pub fn reconfigure<T: TimerHost>(
        &mut self,
        durations:      Vec<u64>,
        initial_offset: u64,
        initially_open: bool,
        head:           Option<&Packet>,
        timers:         &mut T,
    ) -> GateResult<Vec<GateSignal>> {
        let schedule = GateSchedule::from_pairs(durations)?;
        tracing::info!(
            intervals = schedule.len(),
            cycle = schedule.total_duration(),
            initial_offset,
            initially_open,
            "reconfiguring gate schedule"
        );
        self.schedule = schedule;
        self.initial_offset = initial_offset;
        self.initially_open = initially_open;
        Ok(self.initialize(head, timers))
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Handle a fired timer.  `head` is the current head-of-line packet of
    /// the gate's provider.
    pub fn on_timer<T: TimerHost>(
        &mut self,
        handle: TimerHandle,
        head:   Option<&Packet>,
        timers: &mut T,
    ) -> GateResult<Vec<GateSignal>> {
        let mut signals = Vec::new();
        if self.phase_timer == Some(handle) {
            self.phase_timer = None;
            let next_interval_open = !self.is_open;
            self.schedule_next_transition(next_interval_open, head, timers, &mut signals);
            tracing::debug!(at = %timers.now(), open = next_interval_open, "processing change timer");
            if self.is_open {
                self.close(&mut signals);
            } else {
                self.open(head, timers.now(), &mut signals);
            }
        } else if self.guard_band_timer == Some(handle) {
            self.guard_band_timer = None;
            self.update_guard_band(head, timers.now(), &mut signals);
        } else {
            return Err(GateError::UnknownTimer { handle });
        }
        Ok(signals)
    }

    /// The upstream provider's offer changed (new head of line, queue
    /// emptied, …).  Re-evaluates the guard band and, if open, forwards the
    /// change downstream.
    pub fn on_can_pull_changed<T: TimerHost>(
        &mut self,
        head:   Option<&Packet>,
        timers: &T,
    ) -> Vec<GateSignal> {
        let mut signals = Vec::new();
        self.update_guard_band(head, timers.now(), &mut signals);
        if self.is_open {
            signals.push(GateSignal::CanPullChanged);
        }
        signals
    }

    /// The downstream collector's capacity changed.  Re-evaluates the guard
    /// band and, if open, forwards the change upstream.
    pub fn on_can_push_changed<T: TimerHost>(
        &mut self,
        head:   Option<&Packet>,
        timers: &T,
    ) -> Vec<GateSignal> {
        let mut signals = Vec::new();
        self.update_guard_band(head, timers.now(), &mut signals);
        if self.is_open {
            signals.push(GateSignal::CanPushChanged);
        }
        signals
    }

    // ── Admission ─────────────────────────────────────────────────────────

    /// Can `candidate` start now and finish before the next close?
    ///
    /// Asking a closed gate is an internal-consistency error.
    pub fn can_admit(&self, candidate: Option<&Packet>, now: Tick) -> GateResult<bool> {
        if !self.is_open {
            return Err(GateError::GateClosed);
        }
        Ok(self.guard_band.admits(now, candidate, self.next_close_time()))
    }

    /// [`can_admit`][Self::can_admit] that answers `false` for a closed gate.
    pub fn allows_flow(&self, candidate: Option<&Packet>, now: Tick) -> bool {
        self.is_open && self.guard_band.admits(now, candidate, self.next_close_time())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn initialize_gating<T: TimerHost>(
        &mut self,
        head:    Option<&Packet>,
        timers:  &mut T,
        signals: &mut Vec<GateSignal>,
    ) {
        let phase = self.schedule.phase_at(self.initial_offset, self.initially_open);
        self.index = phase.index;
        self.offset = phase.offset;

        if let Some(h) = self.phase_timer.take() {
            timers.cancel(h);
        }
        if let Some(h) = self.guard_band_timer.take() {
            timers.cancel(h);
        }

        if self.is_open != phase.is_open {
            self.is_open = phase.is_open;
            signals.push(GateSignal::GateStateChanged(self.is_open));
        }
        tracing::debug!(
            index = self.index,
            offset = self.offset,
            open = self.is_open,
            "initialized gating"
        );

        self.schedule_next_transition(self.is_open, head, timers, signals);
        let was_allowed = self.transmission_allowed;
        self.update_guard_band(head, timers.now(), signals);
        if !was_allowed && self.transmission_allowed {
            signals.push(GateSignal::CanPushChanged);
            signals.push(GateSignal::CanPullChanged);
        }
    }

    /// Arm the phase timer for the end of interval `index`, whose openness
    /// is `interval_open`, and advance `index`.
    fn schedule_next_transition<T: TimerHost>(
        &mut self,
        interval_open: bool,
        head:          Option<&Packet>,
        timers:        &mut T,
        signals:       &mut Vec<GateSignal>,
    ) {
        let duration = self.schedule.duration(self.index);
        self.index = self.schedule.next_index(self.index);
        let remaining = duration - self.offset;

        let priority = if interval_open { self.close_priority } else { self.open_priority };
        let handle = if self.schedule_for_absolute_time {
            let at = timers.now() + remaining;
            timers.schedule_at(at, priority, TimerTarget::GatePhase)
        } else {
            timers.schedule_after(remaining, priority, TimerTarget::GatePhase)
        };
        self.phase_timer = Some(handle);

        // Only closes get a timed guard band.
        let lead = if interval_open { self.guard_band.worst_case_lead() } else { None };
        if let Some(lead) = lead {
            if remaining > lead {
                let delay = remaining - lead;
                tracing::debug!(at = %(timers.now() + delay), "scheduling guard band timer");
                let handle = if self.schedule_for_absolute_time {
                    let at = timers.now() + delay;
                    timers.schedule_at(at, priority, TimerTarget::GuardBandActivation)
                } else {
                    timers.schedule_after(delay, priority, TimerTarget::GuardBandActivation)
                };
                self.guard_band_timer = Some(handle);
            } else {
                // Already inside the guard band of this close.
                self.update_guard_band(head, timers.now(), signals);
            }
        }

        self.offset = 0;
    }

    fn open(&mut self, head: Option<&Packet>, now: Tick, signals: &mut Vec<GateSignal>) {
        self.is_open = true;
        signals.push(GateSignal::GateStateChanged(true));
        self.update_guard_band(head, now, signals);
        if self.is_open && !self.in_guard_band {
            signals.push(GateSignal::CanPushChanged);
            signals.push(GateSignal::CanPullChanged);
        }
    }

    fn close(&mut self, signals: &mut Vec<GateSignal>) {
        if self.guard_band.implicit && self.in_guard_band {
            self.in_guard_band = false;
            tracing::debug!(in_guard_band = false, "changing guard band state");
            signals.push(GateSignal::GuardBandChanged(false));
        }
        self.is_open = false;
        signals.push(GateSignal::GateStateChanged(false));
        self.sync_transmission_allowed(signals);
    }

    fn update_guard_band(&mut self, head: Option<&Packet>, now: Tick, signals: &mut Vec<GateSignal>) {
        let in_guard_band =
            self.guard_band
                .evaluate(self.is_open, now, head, self.next_close_time());
        if in_guard_band != self.in_guard_band {
            self.in_guard_band = in_guard_band;
            tracing::debug!(at = %now, in_guard_band, "changing guard band state");
            signals.push(GateSignal::GuardBandChanged(in_guard_band));
        }
        self.sync_transmission_allowed(signals);
    }

    fn sync_transmission_allowed(&mut self, signals: &mut Vec<GateSignal>) {
        let allowed = self.is_open && !self.in_guard_band;
        if allowed != self.transmission_allowed {
            self.transmission_allowed = allowed;
            signals.push(GateSignal::TransmissionAllowedChanged(allowed));
        }
    }
}
