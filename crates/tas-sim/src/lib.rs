//! `tas-sim` — event-loop orchestrator for the rust_tas framework.
//!
//! # Topology
//!
//! ```text
//! TrafficSource ─► PacketQueue ─► PeriodicGate ─► PreemptingServer ─► LinkSink
//!                       ▲              │  GateSignal        │ ServerEvent
//!                       └──── head-of-line changes ◄────────┘
//! ```
//!
//! # Event loop
//!
//! ```text
//! loop:
//!   ① Dispatch — pop the next due timer (time, priority, FIFO) and hand it
//!                to its owner: gate phase / guard band → gate,
//!                stream end → server, arrival → traffic source.
//!   ② Drain    — route every GateSignal and ServerEvent produced by ① through
//!                a FIFO work-list until it is empty:
//!                  GuardBandChanged  → observer, server (hold/release only)
//!                  CanPullChanged    → server
//!                  StreamEnded       → observer, gate (head of line changed)
//! ```
//!
//! Every reaction runs to completion before the next timer is popped.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tas_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let mut sim = SimBuilder::new(SimConfig::scenario()).build()?;
//! sim.run(&mut NoopObserver)?;
//! println!("{} streams", sim.sink.receptions().len());
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod queue;
pub mod sim;
pub mod sink;
pub mod traffic;


pub use builder::SimBuilder;
pub use config::{SimConfig, TrafficConfig, load_config_file, load_config_json};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use queue::{GatedProvider, PacketQueue};
pub use sim::Sim;
pub use sink::{LinkSink, Reception};
pub use traffic::TrafficSource;
