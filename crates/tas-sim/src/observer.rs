//! Simulation observer trait for tracing and data collection.

use tas_core::{Packet, Tick};

/// Callbacks invoked by [`Sim`][crate::Sim] as the gate and server change
/// state.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — guard-band printer
///
/// ```rust,ignore
/// struct GuardBandPrinter;
///
/// impl SimObserver for GuardBandPrinter {
///     fn on_guard_band_changed(&mut self, at: Tick, active: bool) {
///         println!("{at}: guard band {}", if active { "on" } else { "off" });
///     }
/// }
/// ```
pub trait SimObserver {
    /// The gate opened or closed.
    fn on_gate_changed(&mut self, _at: Tick, _open: bool) {}

    /// The guard band flipped.  Also called once with the current state when
    /// the run starts and when it ends.
    fn on_guard_band_changed(&mut self, _at: Tick, _active: bool) {}

    /// `is_open && !in_guard_band` flipped.
    fn on_transmission_allowed_changed(&mut self, _at: Tick, _allowed: bool) {}

    fn on_stream_started(&mut self, _at: Tick, _packet: &Packet) {}

    /// `packet` holds what actually left; `complete` is `false` for a
    /// preempted fragment.
    fn on_stream_ended(&mut self, _at: Tick, _packet: &Packet, _complete: bool) {}

    /// Called once after the run completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
