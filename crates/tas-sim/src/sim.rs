//! The `Sim` struct and its event loop.

use std::collections::VecDeque;

use tas_core::{Packet, Tick, TimerHandle, TimerHost, TimerTarget};
use tas_gate::{GateSignal, PeriodicGate};
use tas_schedule::EventScheduler;
use tas_server::{PreemptingServer, ServerEvent, ServerResult, StreamContext};

use crate::{
    GatedProvider, LinkSink, PacketQueue, SimConfig, SimObserver, SimResult, TrafficSource,
};

/// Arrivals run after gate and stream timers due at the same tick.
const ARRIVAL_PRIORITY: i32 = 1;

/// A notification waiting to be routed.
enum Work {
    Gate(GateSignal),
    Server(ServerEvent),
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation runner.
///
/// Owns every component of the topology and the event kernel.  Components
/// never call each other directly: each reaction returns plain values
/// (`GateSignal`, `ServerEvent`) that the loop routes to the next
/// component.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    /// Clock and timer queue shared by the gate, the server and the source.
    pub scheduler: EventScheduler,

    pub queue: PacketQueue,

    pub gate: PeriodicGate,

    pub server: PreemptingServer,

    pub sink: LinkSink,

    pub traffic: Option<TrafficSource>,

    started: bool,
}

impl Sim {
    pub(crate) fn from_parts(
        config:    SimConfig,
        scheduler: EventScheduler,
        queue:     PacketQueue,
        gate:      PeriodicGate,
        server:    PreemptingServer,
        sink:      LinkSink,
        traffic:   Option<TrafficSource>,
    ) -> Self {
        Self { config, scheduler, queue, gate, server, sink, traffic, started: false }
    }

    // ── Public API ────────────────────────────────────────────────────────

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    /// Run from the current tick to `config.end_tick()`, then report the
    /// final guard-band state and call `on_sim_end`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.run_until(self.config.end_tick(), observer)?;
        let now = self.now();
        observer.on_guard_band_changed(now, self.gate.is_in_guard_band());
        observer.on_sim_end(now);
        tracing::info!(
            at = %now,
            streams = self.sink.receptions().len(),
            delivered_bytes = self.sink.delivered_bytes(),
            backlog = self.queue.len(),
            "simulation finished"
        );
        Ok(())
    }

    /// Process every timer due at or before `until` and leave the clock at
    /// `until`.  Useful for tests and incremental stepping.
    pub fn run_until<O: SimObserver>(&mut self, until: Tick, observer: &mut O) -> SimResult<()> {
        self.start(observer)?;
        while let Some((handle, target)) = self.scheduler.pop_due(until) {
            let mut work = VecDeque::new();
            self.dispatch(handle, target, &mut work)?;
            self.drain(work, observer)?;
        }
        if until > self.now() {
            self.scheduler.advance_to(until);
        }
        Ok(())
    }

    /// Initialize the gate and arm the first arrival.  Called implicitly by
    /// the run methods; later calls do nothing.
    pub fn start<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let signals = self.gate.initialize(self.queue.head(), &mut self.scheduler);
        if let Some(at) = self.traffic.as_ref().and_then(TrafficSource::first_arrival) {
            self.scheduler.schedule_at(at, ARRIVAL_PRIORITY, TimerTarget::Arrival);
        }
        self.drain(signals.into_iter().map(Work::Gate).collect(), observer)?;
        observer.on_guard_band_changed(self.now(), self.gate.is_in_guard_band());
        Ok(())
    }

    /// Enqueue `packet` at the current tick.
    pub fn inject<O: SimObserver>(&mut self, packet: Packet, observer: &mut O) -> SimResult<()> {
        self.start(observer)?;
        let mut work = VecDeque::new();
        self.enqueue(packet, &mut work);
        self.drain(work, observer)
    }

    /// Mark the link busy or free.  The gate re-evaluates its guard band
    /// first; freeing the link then lets an idle server start.
    pub fn set_link_busy<O: SimObserver>(&mut self, busy: bool, observer: &mut O) -> SimResult<()> {
        self.start(observer)?;
        self.sink.set_busy(busy);
        let signals = self.gate.on_can_push_changed(self.queue.head(), &self.scheduler);
        self.drain(signals.into_iter().map(Work::Gate).collect(), observer)?;
        if busy {
            return Ok(());
        }
        let events = self.with_server(|server, ctx| server.on_can_push_changed(ctx))?;
        self.drain(events.into_iter().map(Work::Server).collect(), observer)
    }

    /// Swap the gate control list at the current tick.
    pub fn reconfigure_gate<O: SimObserver>(
        &mut self,
        durations:      Vec<u64>,
        initial_offset: u64,
        initially_open: bool,
        observer:       &mut O,
    ) -> SimResult<()> {
        self.start(observer)?;
        let signals = self.gate.reconfigure(
            durations,
            initial_offset,
            initially_open,
            self.queue.head(),
            &mut self.scheduler,
        )?;
        self.drain(signals.into_iter().map(Work::Gate).collect(), observer)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn dispatch(
        &mut self,
        handle: TimerHandle,
        target: TimerTarget,
        work:   &mut VecDeque<Work>,
    ) -> SimResult<()> {
        match target {
            TimerTarget::GatePhase | TimerTarget::GuardBandActivation => {
                let signals = self.gate.on_timer(handle, self.queue.head(), &mut self.scheduler)?;
                work.extend(signals.into_iter().map(Work::Gate));
            }
            TimerTarget::StreamEnd => {
                let event = self.with_server(|server, ctx| server.on_timer(handle, ctx))?;
                work.push_back(Work::Server(event));
            }
            TimerTarget::Arrival => {
                let now = self.now();
                let Some(traffic) = self.traffic.as_mut() else {
                    return Ok(());
                };
                let packet = traffic.emit();
                if let Some(at) = traffic.next_arrival(now) {
                    self.scheduler.schedule_at(at, ARRIVAL_PRIORITY, TimerTarget::Arrival);
                }
                self.enqueue(packet, work);
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, packet: Packet, work: &mut VecDeque<Work>) {
        tracing::debug!(at = %self.now(), %packet, "packet arrived");
        if self.queue.push(packet) {
            let signals = self.gate.on_can_pull_changed(self.queue.head(), &self.scheduler);
            work.extend(signals.into_iter().map(Work::Gate));
        }
    }

    // ── Routing ───────────────────────────────────────────────────────────

    fn drain<O: SimObserver>(&mut self, mut work: VecDeque<Work>, observer: &mut O) -> SimResult<()> {
        while let Some(item) = work.pop_front() {
            match item {
                Work::Gate(signal) => self.route_gate_signal(signal, &mut work, observer)?,
                Work::Server(event) => self.route_server_event(event, &mut work, observer),
            }
        }
        Ok(())
    }

    fn route_gate_signal<O: SimObserver>(
        &mut self,
        signal:   GateSignal,
        work:     &mut VecDeque<Work>,
        observer: &mut O,
    ) -> SimResult<()> {
        let now = self.now();
        match signal {
            GateSignal::GateStateChanged(open) => observer.on_gate_changed(now, open),
            GateSignal::GuardBandChanged(active) => {
                observer.on_guard_band_changed(now, active);
                if self.server.subscribes_to_guard_band() {
                    let events = self.with_server(|server, ctx| server.receive_signal(signal, ctx))?;
                    work.extend(events.into_iter().map(Work::Server));
                }
            }
            GateSignal::TransmissionAllowedChanged(allowed) => {
                observer.on_transmission_allowed_changed(now, allowed);
            }
            GateSignal::CanPullChanged => {
                let events = self.with_server(|server, ctx| server.on_can_pull_changed(ctx))?;
                work.extend(events.into_iter().map(Work::Server));
            }
            // The traffic source is timer-driven and never waits on the gate.
            GateSignal::CanPushChanged => {}
        }
        Ok(())
    }

    fn route_server_event<O: SimObserver>(
        &mut self,
        event:    ServerEvent,
        work:     &mut VecDeque<Work>,
        observer: &mut O,
    ) {
        match event {
            ServerEvent::StreamStarted { packet, at } => observer.on_stream_started(at, &packet),
            ServerEvent::StreamEnded { packet, complete, at } => {
                observer.on_stream_ended(at, &packet, complete);
                // The queue dropped or shortened its head.
                let signals = self.gate.on_can_pull_changed(self.queue.head(), &self.scheduler);
                work.extend(signals.into_iter().map(Work::Gate));
            }
        }
    }

    /// Run `f` against the server with a context borrowing the queue (seen
    /// through the gate), the link and the scheduler.
    fn with_server<R>(
        &mut self,
        f: impl FnOnce(&mut PreemptingServer, &mut StreamContext<'_>) -> ServerResult<R>,
    ) -> SimResult<R> {
        let now = self.scheduler.now();
        let mut provider = GatedProvider::new(&mut self.queue, &self.gate, now);
        let mut ctx = StreamContext::new(&mut provider, &mut self.sink, &mut self.scheduler);
        Ok(f(&mut self.server, &mut ctx)?)
    }
}
