//! Notifications emitted by [`PeriodicGate`][crate::PeriodicGate].

/// A state change the gate reports to its peers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateSignal {
    /// The gate opened (`true`) or closed (`false`).
    GateStateChanged(bool),

    /// The guard band became active (`true`) or cleared (`false`).
    GuardBandChanged(bool),

    /// `is_open && !in_guard_band` flipped.
    TransmissionAllowedChanged(bool),

    /// Downstream collector: packets may have become pullable through the gate.
    CanPullChanged,

    /// Upstream producer: packets may have become pushable into the gate.
    CanPushChanged,
}
