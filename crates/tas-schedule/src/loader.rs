//! CSV gate-control-list loader.
//!
//! # CSV format
//!
//! One row per open/closed pair, in cycle order.  Durations are ticks
//! (nanoseconds).  The first column of the first row is the interval that
//! starts in the gate's `initially_open` state.
//!
//! ```csv
//! first_ticks,second_ticks
//! 100000,50000
//! 100000,50000
//! ```
//!
//! Because each row carries a pair, the resulting list always has an even
//! number of intervals.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{GateSchedule, ScheduleError, ScheduleResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PairRecord {
    first_ticks:  u64,
    second_ticks: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`GateSchedule`] from a CSV file.
pub fn load_schedule_csv(path: &Path) -> ScheduleResult<GateSchedule> {
    let file = std::fs::File::open(path)?;
    load_schedule_reader(file)
}

/// Like [`load_schedule_csv`] but accepts any `Read` source.
pub fn load_schedule_reader<R: Read>(reader: R) -> ScheduleResult<GateSchedule> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut durations = Vec::new();

    for result in csv_reader.deserialize::<PairRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        durations.push(row.first_ticks);
        durations.push(row.second_ticks);
    }

    GateSchedule::from_pairs(durations)
}
