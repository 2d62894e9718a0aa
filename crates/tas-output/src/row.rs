//! Plain data row types written by trace backends.

use std::fmt;

/// Which gate flag a [`GateEventRow`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEventKind {
    Gate,
    GuardBand,
    TransmissionAllowed,
}

impl fmt::Display for GateEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GateEventKind::Gate => "gate",
            GateEventKind::GuardBand => "guard_band",
            GateEventKind::TransmissionAllowed => "transmission_allowed",
        })
    }
}

/// One change of a gate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateEventRow {
    pub tick:  u64,
    pub kind:  GateEventKind,
    pub value: bool,
}

/// One finished stream; preempted fragments get their own row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRow {
    pub packet_id:  u64,
    pub started_at: u64,
    pub ended_at:   u64,
    pub sent_bytes: u64,
    pub complete:   bool,
}
