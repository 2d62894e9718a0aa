//! Notifications produced by the server.

use tas_core::{Packet, Tick};

/// What the server did in one reaction.
///
/// The simulation loop feeds these back into the topology: a finished
/// stream changes the provider's head of line, which the gate must
/// re-evaluate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    StreamStarted {
        packet: Packet,
        at:     Tick,
    },

    /// `packet` is what actually left: the whole frame when `complete`,
    /// otherwise the prefix transmitted before the cut.
    StreamEnded {
        packet:   Packet,
        complete: bool,
        at:       Tick,
    },
}
