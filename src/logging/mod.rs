//! Logging and observability
//!
//! - Human-readable console output
//! - Optional JSON log files with daily or hourly rotation
//! - `RUST_LOG` / configured level filtering
//!
//! # Example
//!
//! ```no_run
//! use flickr_harvester::logging::init_logging;
//! use flickr_harvester::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(group_id = "806927@N20", "Harvest started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log progress through the page listing
///
/// # Example
///
/// ```no_run
/// use flickr_harvester::log_page_progress;
///
/// log_page_progress!(1, 3, 12, 40);
/// ```
#[macro_export]
macro_rules! log_page_progress {
    ($worker:expr, $page:expr, $records:expr, $total_pages:expr) => {
        tracing::info!(
            worker = $worker,
            page = $page,
            records = $records,
            total_pages = $total_pages,
            "Page processed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use flickr_harvester::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 2000u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after error"
        );
    };
}
