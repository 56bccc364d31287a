//! Ordered output sink

pub mod csv;

pub use self::csv::{CsvSink, SinkHandle};

/// Options applied when opening a sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkOptions {
    /// Fields whose combined values identify a record; empty disables
    /// de-duplication
    pub unique_key_terms: Vec<String>,
}

/// Counters reported when a sink is closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub rows_written: u64,
    pub duplicates_skipped: u64,
    /// Whether this run wrote the header row
    pub header_written: bool,
}
