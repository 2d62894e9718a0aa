//! Flow-control capabilities between a streaming server and its peers.
//!
//! Upstream, the server pulls from a [`PacketProvider`]; downstream, it
//! pushes into a [`PacketConsumer`].  A stream is bracketed by a
//! `*_start` and a `*_end` call on both sides.

use crate::{Bitrate, Packet, Tick};

/// The upstream side of a streaming server (queue, gate, …).
pub trait PacketProvider {
    /// `true` if a packet can be pulled right now.
    fn can_pull_some_packet(&self) -> bool;

    /// Begin streaming the head packet out.  The packet stays owned by the
    /// provider until [`pull_packet_end`][Self::pull_packet_end]; the
    /// returned value is a copy for the server's in-flight bookkeeping.
    fn pull_packet_start(&mut self, rate: Bitrate) -> Option<Packet>;

    /// Finish the pull after `sent_bytes` have left.  Returns the part that
    /// was transmitted.  If `sent_bytes` is short of the packet length the
    /// provider keeps the remainder at its head.
    fn pull_packet_end(&mut self, sent_bytes: u64) -> Option<Packet>;
}

/// The downstream side of a streaming server (MAC, link, …).
pub trait PacketConsumer {
    /// `true` if the consumer can accept a new stream.
    fn can_push_some_packet(&self) -> bool;

    /// A stream of `packet` starts at `at`.
    fn push_packet_start(&mut self, packet: &Packet, rate: Bitrate, at: Tick);

    /// The stream ends at `at`.  `complete` is `false` when the stream was
    /// cut short; `packet` then holds only the transmitted prefix.
    fn push_packet_end(&mut self, packet: Packet, complete: bool, at: Tick);
}
