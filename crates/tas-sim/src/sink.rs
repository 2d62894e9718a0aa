//! The link the server streams into.

use tas_core::{Bitrate, Packet, PacketConsumer, PacketId, Tick};

/// One stream as seen by the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reception {
    pub packet_id:  PacketId,
    /// Bytes that made it onto the wire.
    pub sent_bytes: u64,
    pub started_at: Tick,
    pub ended_at:   Tick,
    /// `false` for a preempted fragment.
    pub complete:   bool,
}

/// Records every stream.  Can be marked busy to refuse new streams.
#[derive(Default, Debug)]
pub struct LinkSink {
    receptions: Vec<Reception>,
    in_flight:  Option<(PacketId, Tick)>,
    busy:       bool,
}

impl LinkSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn receptions(&self) -> &[Reception] {
        &self.receptions
    }

    /// The stream currently arriving, with its start time.
    pub fn in_flight(&self) -> Option<(PacketId, Tick)> {
        self.in_flight
    }

    /// Bytes received so far, fragments included.
    pub fn delivered_bytes(&self) -> u64 {
        self.receptions.iter().map(|r| r.sent_bytes).sum()
    }
}

impl PacketConsumer for LinkSink {
    fn can_push_some_packet(&self) -> bool {
        !self.busy && self.in_flight.is_none()
    }

    fn push_packet_start(&mut self, packet: &Packet, _rate: Bitrate, at: Tick) {
        self.in_flight = Some((packet.id, at));
    }

    fn push_packet_end(&mut self, packet: Packet, complete: bool, at: Tick) {
        let started_at = match self.in_flight.take() {
            Some((_, started_at)) => started_at,
            None => at,
        };
        self.receptions.push(Reception {
            packet_id: packet.id,
            sent_bytes: packet.length_bytes,
            started_at,
            ended_at: at,
            complete,
        });
    }
}
