//! CSV trace backend.
//!
//! Creates two files in the configured output directory:
//! - `gate_events.csv`
//! - `streams.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::TraceWriter;
use crate::{GateEventRow, OutputResult, StreamRow};

/// Writes the trace to two CSV files.
pub struct CsvTraceWriter {
    gate_events: Writer<File>,
    streams:     Writer<File>,
    finished:    bool,
}

impl CsvTraceWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut gate_events = Writer::from_path(dir.join("gate_events.csv"))?;
        gate_events.write_record(["tick", "kind", "value"])?;

        let mut streams = Writer::from_path(dir.join("streams.csv"))?;
        streams.write_record(["packet_id", "started_at", "ended_at", "sent_bytes", "complete"])?;

        Ok(Self { gate_events, streams, finished: false })
    }
}

impl TraceWriter for CsvTraceWriter {
    fn write_gate_event(&mut self, row: &GateEventRow) -> OutputResult<()> {
        self.gate_events.write_record(&[
            row.tick.to_string(),
            row.kind.to_string(),
            (row.value as u8).to_string(),
        ])?;
        Ok(())
    }

    fn write_stream(&mut self, row: &StreamRow) -> OutputResult<()> {
        self.streams.write_record(&[
            row.packet_id.to_string(),
            row.started_at.to_string(),
            row.ended_at.to_string(),
            row.sent_bytes.to_string(),
            (row.complete as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.gate_events.flush()?;
        self.streams.flush()?;
        Ok(())
    }
}
