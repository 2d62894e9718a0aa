//! `tas-gate` — a periodic transmission gate with guard bands.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`config`]     | `GateConfig`, `GuardBandPolicy`                            |
//! | [`guard_band`] | `GuardBandCalculator` — activation timing and admission    |
//! | [`gate`]       | `PeriodicGate` — phase timers, open/close, guard-band state |
//! | [`signal`]     | `GateSignal` — notifications returned by every entry point |
//! | [`error`]      | `GateError`, `GateResult<T>`                               |
//!
//! # Notification contract
//!
//! Every mutating entry point of [`PeriodicGate`] returns the
//! [`GateSignal`]s it emitted, in emission order.  A signal is produced
//! only for an actual state flip, and only after the gate's own state has
//! been updated, so a consumer reacting to it observes the post-transition
//! gate.
//!
//! ```text
//! phase timer ─► re-arm next transition ─► open()/close()
//!                                            │
//!                         GateStateChanged ◄─┤
//!                         GuardBandChanged ◄─┤  (only on flips)
//!               TransmissionAllowedChanged ◄─┤
//!              CanPushChanged/CanPullChanged ◄┘  (open and not guarded)
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod guard_band;
pub mod signal;

#[cfg(test)]
mod tests;

pub use config::{GateConfig, GuardBandPolicy};
pub use error::{GateError, GateResult};
pub use gate::PeriodicGate;
pub use guard_band::{DEFAULT_FIXED_OVERHEAD_BYTES, GuardBandCalculator};
pub use signal::GateSignal;
