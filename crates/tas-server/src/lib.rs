//! `tas-server` — a streaming transmission server that can be preempted by
//! a gate's guard band.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`config`]  | `ServerConfig`, `PreemptionMode`                          |
//! | [`context`] | `StreamContext` — the peers borrowed for one reaction     |
//! | [`event`]   | `ServerEvent` — stream start/end notifications            |
//! | [`server`]  | `PreemptingServer` — the Idle/Streaming state machine     |
//! | [`error`]   | `ServerError`, `ServerResult<T>`                          |
//!
//! # Hold and release
//!
//! Under [`PreemptionMode::WithHoldRelease`] the server listens to the
//! gate's `GuardBandChanged` signal.  Activation aborts any running stream
//! in the same reaction and blocks new ones; deactivation lifts the block
//! but does not restart anything by itself.  The next availability change
//! from upstream or downstream starts the following stream.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod server;


pub use config::{PreemptionMode, ServerConfig};
pub use context::StreamContext;
pub use error::{ServerError, ServerResult};
pub use event::ServerEvent;
pub use server::{PreemptingServer, Transaction};
