//! The `TraceWriter` trait implemented by all backend writers.

use crate::{GateEventRow, OutputResult, StreamRow};

/// Trait implemented by trace backends.
///
/// Errors are stored by the observer and retrieved with
/// [`TraceObserver::take_error`][crate::TraceObserver::take_error].
pub trait TraceWriter {
    fn write_gate_event(&mut self, row: &GateEventRow) -> OutputResult<()>;

    fn write_stream(&mut self, row: &StreamRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
