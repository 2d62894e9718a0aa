//! `tas-output` — trace writers for the rust_tas framework.
//!
//! | Backend | Files created                          |
//! |---------|----------------------------------------|
//! | CSV     | `gate_events.csv`, `streams.csv`       |
//!
//! Backends implement [`TraceWriter`] and are driven by [`TraceObserver`],
//! which implements `tas_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tas_output::{CsvTraceWriter, TraceObserver};
//!
//! let writer = CsvTraceWriter::new(Path::new("./output"))?;
//! let mut obs = TraceObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvTraceWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{GateEventKind, GateEventRow, StreamRow};
pub use writer::TraceWriter;
