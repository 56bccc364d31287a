//! Harvest summary and reporting
//!
//! This module defines structures for tracking and reporting harvest results.

use super::worker::WorkerReport;
use crate::core::sink::SinkStats;
use std::time::Duration;

/// Summary of a harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// Pages reported by the photo source
    pub total_pages: u32,

    /// Pages fetched and transformed
    pub pages_processed: usize,

    /// Pages whose fetch failed
    pub pages_failed: usize,

    /// Photos returned across all processed pages
    pub photos_seen: usize,

    /// Rows written to the CSV file
    pub records_written: u64,

    /// Photos filtered out by the update window
    pub records_excluded: usize,

    /// Records dropped by the sink as duplicates
    pub duplicates_skipped: u64,

    pub workers_started: usize,

    /// Workers that exited on their own
    pub workers_finished: usize,

    /// Duration of the harvest
    pub duration: Duration,

    /// A shutdown signal stopped page production early
    pub interrupted: bool,

    /// Errors encountered during the harvest
    pub errors: Vec<HarvestError>,
}

impl HarvestSummary {
    /// Create a new empty harvest summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: HarvestError) {
        self.errors.push(error);
    }

    /// Folds one worker's counters into the totals.
    pub fn add_worker_report(&mut self, report: WorkerReport) {
        self.workers_finished += 1;
        self.pages_processed += report.pages_processed;
        self.pages_failed += report.pages_failed;
        self.photos_seen += report.photos_seen;
        self.records_excluded += report.records_excluded;
        self.errors.extend(report.errors);
    }

    pub fn apply_sink_stats(&mut self, stats: &SinkStats) {
        self.records_written = stats.rows_written;
        self.duplicates_skipped = stats.duplicates_skipped;
    }

    /// Check if the harvest was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.pages_failed == 0 && self.errors.is_empty()
    }

    /// Share of pages processed, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 100.0;
        }
        (self.pages_processed as f64 / f64::from(self.total_pages)) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_pages = self.total_pages,
            pages_processed = self.pages_processed,
            pages_failed = self.pages_failed,
            photos_seen = self.photos_seen,
            records_written = self.records_written,
            records_excluded = self.records_excluded,
            duplicates_skipped = self.duplicates_skipped,
            workers = self.workers_started,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Harvest completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Harvest completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Harvest error"
                );
            }
        }
    }
}

/// Type of harvest error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestErrorType {
    /// Page or license fetch from the photo source
    Fetch,
    /// CSV output
    Sink,
    /// Work queue closed early
    Queue,
    /// Workers did not finish within the maximum wait
    Supervision,
}

/// Harvest error with context
#[derive(Debug, Clone)]
pub struct HarvestError {
    /// Type of error
    pub error_type: HarvestErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., worker id, page number)
    pub context: Option<String>,
}

impl HarvestError {
    /// Create a new harvest error
    pub fn new(error_type: HarvestErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
