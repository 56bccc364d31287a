//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use crate::domain::schema;
use crate::domain::PoolQuery;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main harvester configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvesterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Flickr API and query settings
    pub flickr: FlickrConfig,

    /// Harvest run settings
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Work queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HarvesterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.flickr.validate()?;
        self.harvest.validate()?;
        self.queue.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Listing parameters shared by every page request
    pub fn pool_query(&self) -> PoolQuery {
        PoolQuery {
            group_id: self.flickr.group_id.clone(),
            user_id: self.flickr.user_id.clone().filter(|u| !u.is_empty()),
            machine_tags: self.flickr.machine_tags.clone(),
            extras: self.flickr.extras.clone(),
            per_page: self.flickr.per_page,
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for Flickr requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "flickr.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "flickr.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Flickr API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrConfig {
    /// API key sent with every request
    /// Stored securely in memory and automatically zeroized on drop
    pub api_key: SecretString,

    /// Shared secret paired with the API key (unused for public pool listings)
    #[serde(default)]
    pub shared_secret: Option<SecretString>,

    /// REST endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Group whose pool is harvested
    pub group_id: String,

    /// Restrict the pool listing to one member
    #[serde(default)]
    pub user_id: Option<String>,

    /// Machine tag filters passed to the listing
    #[serde(default)]
    pub machine_tags: Vec<String>,

    /// Extra photo fields requested from the listing
    #[serde(default = "default_extras")]
    pub extras: Vec<String>,

    /// Photos per page (Flickr caps this at 500)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Flickr content type filter (1-7)
    #[serde(default)]
    pub content_type: Option<u8>,

    /// Flickr privacy filter (1-5)
    #[serde(default)]
    pub privacy_filter: Option<u8>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Date bounds
    #[serde(default)]
    pub dates: DateBounds,
}

impl FlickrConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.api_key.expose_secret().is_empty() {
            return Err("flickr.api_key cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("flickr.base_url must start with http:// or https://".to_string());
        }

        if self.group_id.trim().is_empty() {
            return Err("flickr.group_id cannot be empty".to_string());
        }

        if !(1..=500).contains(&self.per_page) {
            return Err(format!(
                "flickr.per_page must be between 1 and 500, got {}",
                self.per_page
            ));
        }

        if let Some(content_type) = self.content_type {
            if !(1..=7).contains(&content_type) {
                return Err(format!(
                    "flickr.content_type must be between 1 and 7, got {content_type}"
                ));
            }
        }

        if let Some(privacy_filter) = self.privacy_filter {
            if !(1..=5).contains(&privacy_filter) {
                return Err(format!(
                    "flickr.privacy_filter must be between 1 and 5, got {privacy_filter}"
                ));
            }
        }

        if self.timeout_seconds == 0 {
            return Err("flickr.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        self.dates.validate()?;
        Ok(())
    }
}

/// Inclusive-format (`yyyy-MM-dd`) date bounds; empty or absent means unbounded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateBounds {
    #[serde(default)]
    pub min_upload_date: Option<String>,
    #[serde(default)]
    pub max_upload_date: Option<String>,
    #[serde(default)]
    pub min_taken_date: Option<String>,
    #[serde(default)]
    pub max_taken_date: Option<String>,
    #[serde(default)]
    pub min_update_date: Option<String>,
    #[serde(default)]
    pub max_update_date: Option<String>,
}

impl DateBounds {
    fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("upload", &self.min_upload_date, &self.max_upload_date),
            ("taken", &self.min_taken_date, &self.max_taken_date),
            ("update", &self.min_update_date, &self.max_update_date),
        ];
        for (name, min, max) in pairs {
            let min_key = format!("flickr.dates.min_{name}_date");
            let max_key = format!("flickr.dates.max_{name}_date");
            let min = parse_date_bound(min.as_deref(), &min_key)?;
            let max = parse_date_bound(max.as_deref(), &max_key)?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(format!("{min_key} must not be after {max_key}"));
                }
            }
        }
        Ok(())
    }

    /// Parsed `(min, max)` last-update bounds
    pub fn update_window(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), String> {
        Ok((
            parse_date_bound(
                self.min_update_date.as_deref(),
                "flickr.dates.min_update_date",
            )?,
            parse_date_bound(
                self.max_update_date.as_deref(),
                "flickr.dates.max_update_date",
            )?,
        ))
    }
}

/// Parses a `yyyy-MM-dd` bound to UTC midnight.
///
/// `None` and blank strings mean "no bound"; anything else that does not
/// parse is an error naming `key`.
pub fn parse_date_bound(value: Option<&str>, key: &str) -> Result<Option<DateTime<Utc>>, String> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("{key} '{value}' is not a yyyy-MM-dd date: {e}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("{key} '{value}' has no midnight"))?;
    Ok(Some(midnight.and_utc()))
}

/// Harvest run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Directory for the output CSV
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Output CSV file name
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Terms whose combined values identify a record; repeated keys are skipped
    #[serde(default)]
    pub unique_key_terms: Vec<String>,

    /// How long a worker waits for a work item before logging and polling again
    #[serde(default = "default_dequeue_timeout_ms")]
    pub dequeue_timeout_ms: u64,

    /// Interval between "still waiting for workers" warnings
    #[serde(default = "default_supervision_interval_secs")]
    pub supervision_interval_secs: u64,

    /// Upper bound on the wait for workers; stragglers are aborted after it
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl HarvestConfig {
    fn validate(&self) -> Result<(), String> {
        if self.workers == 0 || self.workers > 64 {
            return Err(format!(
                "harvest.workers must be between 1 and 64, got {}",
                self.workers
            ));
        }

        if self.output_file.trim().is_empty() {
            return Err("harvest.output_file cannot be empty".to_string());
        }

        if let Some(term) = self
            .unique_key_terms
            .iter()
            .find(|term| !schema::contains(term))
        {
            return Err(format!(
                "harvest.unique_key_terms contains '{term}', which is not an output field"
            ));
        }

        if self.dequeue_timeout_ms == 0 {
            return Err("harvest.dequeue_timeout_ms must be > 0".to_string());
        }

        if self.supervision_interval_secs == 0 {
            return Err("harvest.supervision_interval_secs must be > 0".to_string());
        }

        if self.max_wait_secs < self.supervision_interval_secs {
            return Err(format!(
                "harvest.max_wait_secs ({}) must be >= harvest.supervision_interval_secs ({})",
                self.max_wait_secs, self.supervision_interval_secs
            ));
        }

        Ok(())
    }

    /// Full path of the output CSV
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.output_file)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            output_dir: default_output_dir(),
            output_file: default_output_file(),
            unique_key_terms: Vec::new(),
            dequeue_timeout_ms: default_dequeue_timeout_ms(),
            supervision_interval_secs: default_supervision_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

/// Work queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of buffered work items
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,

    /// Items admitted per window
    #[serde(default = "default_rate_limit")]
    pub rate_limit: usize,

    /// Window length in milliseconds
    #[serde(default = "default_rate_window_ms")]
    pub rate_window_ms: u64,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("queue.capacity must be > 0".to_string());
        }
        if self.rate_limit == 0 {
            return Err("queue.rate_limit must be > 0".to_string());
        }
        if self.rate_window_ms == 0 {
            return Err("queue.rate_window_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
            rate_limit: default_rate_limit(),
            rate_window_ms: default_rate_window_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".into());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.flickr.com/services/rest/".to_string()
}

fn default_extras() -> Vec<String> {
    [
        "description",
        "license",
        "date_upload",
        "date_taken",
        "owner_name",
        "last_update",
        "geo",
        "tags",
        "machine_tags",
        "url_o",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_workers() -> usize {
    3
}

fn default_output_dir() -> String {
    "/tmp/".to_string()
}

fn default_output_file() -> String {
    "flickr.dwc.csv".to_string()
}

fn default_dequeue_timeout_ms() -> u64 {
    10_000
}

fn default_supervision_interval_secs() -> u64 {
    60
}

fn default_max_wait_secs() -> u64 {
    36_000
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_rate_limit() -> usize {
    10
}

fn default_rate_window_ms() -> u64 {
    60_000
}

fn default_local_path() -> String {
    "/var/log/flickr-harvester".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
