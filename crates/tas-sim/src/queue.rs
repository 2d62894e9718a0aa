//! The transmission queue and its view through the gate.

use std::collections::VecDeque;

use tas_core::{Bitrate, Packet, PacketProvider, Tick};
use tas_gate::PeriodicGate;

// ── PacketQueue ───────────────────────────────────────────────────────────────

/// FIFO of frames waiting for the link.
///
/// The head stays queued while it is being streamed.  If the stream is cut,
/// the untransmitted remainder replaces the head so the frame resumes from
/// where it stopped.
#[derive(Default, Debug)]
pub struct PacketQueue {
    packets: VecDeque<Packet>,
    pulling: bool,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `packet`.  Returns `true` if it became the head of line.
    pub fn push(&mut self, packet: Packet) -> bool {
        self.packets.push_back(packet);
        self.packets.len() == 1
    }

    pub fn head(&self) -> Option<&Packet> {
        self.packets.front()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// `true` between `pull_packet_start` and `pull_packet_end`.
    pub fn is_pulling(&self) -> bool {
        self.pulling
    }

    /// Total queued bytes, remainders included.
    pub fn backlog_bytes(&self) -> u64 {
        self.packets.iter().map(|p| p.length_bytes).sum()
    }
}

impl PacketProvider for PacketQueue {
    fn can_pull_some_packet(&self) -> bool {
        !self.pulling && !self.packets.is_empty()
    }

    fn pull_packet_start(&mut self, _rate: Bitrate) -> Option<Packet> {
        if self.pulling {
            return None;
        }
        let packet = self.packets.front()?.clone();
        self.pulling = true;
        Some(packet)
    }

    fn pull_packet_end(&mut self, sent_bytes: u64) -> Option<Packet> {
        if !self.pulling {
            return None;
        }
        self.pulling = false;
        let (sent, rest) = self.packets.pop_front()?.split_at(sent_bytes);
        if let Some(rest) = rest {
            tracing::debug!(packet = %rest, "keeping preempted remainder at head of line");
            self.packets.push_front(rest);
        }
        Some(sent)
    }
}

// ── GatedProvider ─────────────────────────────────────────────────────────────

/// The queue as the server sees it: pullable only while the gate admits the
/// head of line.
pub struct GatedProvider<'a> {
    queue: &'a mut PacketQueue,
    gate:  &'a PeriodicGate,
    now:   Tick,
}

impl<'a> GatedProvider<'a> {
    pub fn new(queue: &'a mut PacketQueue, gate: &'a PeriodicGate, now: Tick) -> Self {
        Self { queue, gate, now }
    }
}

impl PacketProvider for GatedProvider<'_> {
    fn can_pull_some_packet(&self) -> bool {
        self.queue.can_pull_some_packet() && self.gate.allows_flow(self.queue.head(), self.now)
    }

    fn pull_packet_start(&mut self, rate: Bitrate) -> Option<Packet> {
        self.queue.pull_packet_start(rate)
    }

    fn pull_packet_end(&mut self, sent_bytes: u64) -> Option<Packet> {
        self.queue.pull_packet_end(sent_bytes)
    }
}
