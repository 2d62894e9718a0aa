//! `TraceObserver<W>` — bridges `SimObserver` to a `TraceWriter`.

use tas_core::{Packet, Tick};
use tas_sim::SimObserver;

use crate::row::{GateEventKind, GateEventRow, StreamRow};
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes gate flag changes and finished streams to
/// any [`TraceWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct TraceObserver<W: TraceWriter> {
    writer:     W,
    /// Start of the stream in flight; the link carries one at a time.
    started_at: Option<Tick>,
    last_error: Option<OutputError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, started_at: None, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn gate_event(&mut self, at: Tick, kind: GateEventKind, value: bool) {
        let row = GateEventRow { tick: at.0, kind, value };
        let result = self.writer.write_gate_event(&row);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: TraceWriter> SimObserver for TraceObserver<W> {
    fn on_gate_changed(&mut self, at: Tick, open: bool) {
        self.gate_event(at, GateEventKind::Gate, open);
    }

    fn on_guard_band_changed(&mut self, at: Tick, active: bool) {
        self.gate_event(at, GateEventKind::GuardBand, active);
    }

    fn on_transmission_allowed_changed(&mut self, at: Tick, allowed: bool) {
        self.gate_event(at, GateEventKind::TransmissionAllowed, allowed);
    }

    fn on_stream_started(&mut self, at: Tick, _packet: &Packet) {
        self.started_at = Some(at);
    }

    fn on_stream_ended(&mut self, at: Tick, packet: &Packet, complete: bool) {
        let row = StreamRow {
            packet_id:  packet.id.0,
            started_at: self.started_at.take().unwrap_or(at).0,
            ended_at:   at.0,
            sent_bytes: packet.length_bytes,
            complete,
        };
        let result = self.writer.write_stream(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
