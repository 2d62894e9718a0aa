//! The `PreemptingServer` state machine.
//!
//! ```text
//!            start_streaming
//!   Idle ───────────────────────► Streaming(tx)
//!    ▲                                 │
//!    └──── end / interrupt / push ─────┘
//!            processed
//! ```
//!
//! A stream is bracketed by `pull_packet_start`/`push_packet_start` and
//! `pull_packet_end`/`push_packet_end`.  Ending early (interrupt, flush)
//! reports only the bytes serialized so far; the provider keeps the rest.

use tas_core::{Bitrate, Packet, Tick, TimerHandle, TimerTarget};
use tas_gate::GateSignal;

use crate::{PreemptionMode, ServerConfig, ServerError, ServerEvent, ServerResult, StreamContext};

/// The stream in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub packet:     Packet,
    pub started_at: Tick,
    pub rate:       Bitrate,
    pub end_timer:  TimerHandle,
}

impl Transaction {
    /// Bytes fully serialized by `now`, capped at the packet length.
    pub fn sent_bytes(&self, now: Tick) -> u64 {
        self.rate
            .bytes_in(now.since(self.started_at))
            .min(self.packet.length_bytes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Streaming(Transaction),
}

pub struct PreemptingServer {
    datarate:     Bitrate,
    mode:         PreemptionMode,
    end_priority: i32,
    state:        State,
    /// Set while a guard band holds the server.
    blocked:      bool,
}

impl PreemptingServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            datarate:     config.datarate,
            mode:         config.preemption_mode,
            end_priority: config.end_scheduling_priority,
            state:        State::Idle,
            blocked:      false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn datarate(&self) -> Bitrate {
        self.datarate
    }

    pub fn preemption_mode(&self) -> PreemptionMode {
        self.mode
    }

    /// Whether the server listens to guard-band changes at all.
    pub fn subscribes_to_guard_band(&self) -> bool {
        self.mode == PreemptionMode::WithHoldRelease
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, State::Streaming(_))
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.state {
            State::Streaming(tx) => Some(tx),
            State::Idle => None,
        }
    }

    // ── Streaming ─────────────────────────────────────────────────────────

    /// Upstream has a packet and downstream has room.
    pub fn can_start_streaming(&self, ctx: &StreamContext<'_>) -> bool {
        ctx.provider.can_pull_some_packet() && ctx.consumer.can_push_some_packet()
    }

    /// Pull the head packet, forward the stream start downstream and arm
    /// the end timer.
    pub fn start_streaming(&mut self, ctx: &mut StreamContext<'_>) -> ServerResult<ServerEvent> {
        if self.is_streaming() {
            return Err(ServerError::AlreadyStreaming);
        }
        let packet = ctx
            .provider
            .pull_packet_start(self.datarate)
            .ok_or(ServerError::NothingToPull)?;
        let now = ctx.timers.now();
        tracing::info!(at = %now, %packet, rate = %self.datarate, "starting streaming packet");

        ctx.consumer.push_packet_start(&packet, self.datarate, now);
        let duration = self.datarate.transmission_ticks(packet.length_bits());
        let end_timer = ctx
            .timers
            .schedule_after(duration, self.end_priority, TimerTarget::StreamEnd);

        self.state = State::Streaming(Transaction {
            packet:     packet.clone(),
            started_at: now,
            rate:       self.datarate,
            end_timer,
        });
        Ok(ServerEvent::StreamStarted { packet, at: now })
    }

    /// Finish the running stream at the current time.
    ///
    /// The end timer is cancelled if still armed, so this also serves the
    /// early-termination paths.
    pub fn end_streaming(&mut self, ctx: &mut StreamContext<'_>) -> ServerResult<ServerEvent> {
        self.finish(ctx, true)?.ok_or(ServerError::NotStreaming)
    }

    /// Cut the running stream short.  No-op when idle.
    pub fn interrupt_streaming(
        &mut self,
        ctx: &mut StreamContext<'_>,
    ) -> ServerResult<Option<ServerEvent>> {
        if !self.is_streaming() {
            return Ok(None);
        }
        tracing::debug!(at = %ctx.timers.now(), "interrupting stream");
        self.end_streaming(ctx).map(Some)
    }

    // ── Notifications ─────────────────────────────────────────────────────

    /// React to a gate signal.  Only `GuardBandChanged` is meaningful, and
    /// only under hold/release; any other signal is a wiring error.
    pub fn receive_signal(
        &mut self,
        signal: GateSignal,
        ctx:    &mut StreamContext<'_>,
    ) -> ServerResult<Vec<ServerEvent>> {
        let GateSignal::GuardBandChanged(active) = signal else {
            return Err(ServerError::UnexpectedSignal(signal));
        };
        if !self.subscribes_to_guard_band() {
            return Ok(Vec::new());
        }
        tracing::debug!(at = %ctx.timers.now(), active, "processing guard band state change");

        let mut events = Vec::new();
        if active {
            events.extend(self.interrupt_streaming(ctx)?);
        }
        self.blocked = active;
        Ok(events)
    }

    /// Downstream capacity changed.
    pub fn on_can_push_changed(
        &mut self,
        ctx: &mut StreamContext<'_>,
    ) -> ServerResult<Vec<ServerEvent>> {
        if !self.is_streaming() && !self.blocked && self.can_start_streaming(ctx) {
            return Ok(vec![self.start_streaming(ctx)?]);
        }
        Ok(Vec::new())
    }

    /// Upstream availability changed.  A running stream is flushed; an
    /// idle server starts the next one if it can.
    pub fn on_can_pull_changed(
        &mut self,
        ctx: &mut StreamContext<'_>,
    ) -> ServerResult<Vec<ServerEvent>> {
        if self.is_streaming() {
            return Ok(vec![self.end_streaming(ctx)?]);
        }
        if !self.blocked && self.can_start_streaming(ctx) {
            return Ok(vec![self.start_streaming(ctx)?]);
        }
        Ok(Vec::new())
    }

    /// Downstream finished consuming the pushed packet on its own.
    ///
    /// Completes the pull upstream and releases the transaction without
    /// forwarding another stream end.
    pub fn handle_push_processed(
        &mut self,
        ctx: &mut StreamContext<'_>,
    ) -> ServerResult<Option<ServerEvent>> {
        self.finish(ctx, false)
    }

    /// Handle a fired timer.
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        ctx:    &mut StreamContext<'_>,
    ) -> ServerResult<ServerEvent> {
        let ours = matches!(&self.state, State::Streaming(tx) if tx.end_timer == handle);
        if !ours {
            return Err(ServerError::UnknownTimer { handle });
        }
        self.end_streaming(ctx)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Release the transaction, completing the pull upstream and, when
    /// `forward` is set, the push downstream.  `None` when idle.
    fn finish(
        &mut self,
        ctx:     &mut StreamContext<'_>,
        forward: bool,
    ) -> ServerResult<Option<ServerEvent>> {
        let State::Streaming(tx) = std::mem::replace(&mut self.state, State::Idle) else {
            return Ok(None);
        };
        ctx.timers.cancel(tx.end_timer);

        let now = ctx.timers.now();
        let sent = tx.sent_bytes(now);
        let complete = sent == tx.packet.length_bytes;
        let packet = match ctx.provider.pull_packet_end(sent) {
            Some(packet) => packet,
            None => tx.packet.split_at(sent).0,
        };
        tracing::info!(at = %now, %packet, complete, forward, "ending streaming packet");

        if forward {
            ctx.consumer.push_packet_end(packet.clone(), complete, now);
        }
        Ok(Some(ServerEvent::StreamEnded { packet, complete, at: now }))
    }
}
