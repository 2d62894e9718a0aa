//! Frames as seen by the gate and the transmission server.
//!
//! Only the length matters to timing; payload is not modelled.

use std::fmt;

use crate::PacketId;

/// A frame queued for transmission.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub id:           PacketId,
    /// Length on the wire in bytes.
    pub length_bytes: u64,
}

impl Packet {
    pub fn new(id: PacketId, length_bytes: u64) -> Self {
        Self { id, length_bytes }
    }

    #[inline]
    pub fn length_bits(&self) -> u64 {
        self.length_bytes * 8
    }

    /// Split after `sent_bytes`: the transmitted prefix and, if anything is
    /// left, the untransmitted remainder.  Both halves keep the frame's id.
    pub fn split_at(self, sent_bytes: u64) -> (Packet, Option<Packet>) {
        if sent_bytes >= self.length_bytes {
            return (self, None);
        }
        let head = Packet::new(self.id, sent_bytes);
        let rest = Packet::new(self.id, self.length_bytes - sent_bytes);
        (head, Some(rest))
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} B]", self.id, self.length_bytes)
    }
}
