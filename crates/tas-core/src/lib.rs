//! `tas-core` — foundational types for the `rust_tas` time-aware gate framework.
//!
//! This crate is a dependency of every other `tas-*` crate.  It has no
//! `tas-*` dependencies and minimal external ones (`rand` and `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`ids`]         | `PacketId`                                              |
//! | [`time`]        | `Tick`, `Bitrate`, `SimClock`                           |
//! | [`packet`]      | `Packet`, fragment splitting                            |
//! | [`timer`]       | `TimerHost` capability, `TimerHandle`, `TimerTarget`    |
//! | [`flow`]        | `PacketProvider` / `PacketConsumer` capabilities        |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                        |
//! | [`error`]       | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public value types.  |

pub mod error;
pub mod flow;
pub mod ids;
pub mod packet;
pub mod rng;
pub mod time;
pub mod timer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use flow::{PacketConsumer, PacketProvider};
pub use ids::PacketId;
pub use packet::Packet;
pub use rng::SimRng;
pub use time::{Bitrate, SimClock, Tick, TICKS_PER_SECOND};
pub use timer::{TimerHandle, TimerHost, TimerTarget};
