//! Configuration management for the harvester.
//!
//! TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FLICKR_HARVESTER_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`FlickrConfig`] - API key, group, listing filters, date bounds
//! - [`HarvestConfig`] - Worker count, output file, supervision timeouts
//! - [`QueueConfig`] - Queue capacity and producer rate limit
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [flickr]
//! api_key = "${FLICKR_API_KEY}"
//! group_id = "806927@N20"
//! machine_tags = ["taxonomy:"]
//!
//! [flickr.dates]
//! min_update_date = "2015-01-01"
//!
//! [harvest]
//! workers = 3
//! output_dir = "/tmp/"
//! output_file = "flickr.dwc.csv"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    parse_date_bound, ApplicationConfig, DateBounds, FlickrConfig, HarvestConfig,
    HarvesterConfig, LoggingConfig, QueueConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
