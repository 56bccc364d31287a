// Flickr Harvester - Flickr group pool to Darwin Core CSV harvester
// Copyright (c) 2025 Flickr Harvester Contributors
// Licensed under the MIT License

//! # Flickr Harvester
//!
//! Harvests the photos of a Flickr group pool and writes them as Darwin Core
//! occurrence records to a CSV file, one row per photo.
//!
//! ## Overview
//!
//! A harvest runs as a small pipeline:
//!
//! - The **coordinator** counts the pool's pages and enqueues one work item
//!   per page, followed by one termination sentinel per worker
//! - A **rate-limited queue** admits at most N items per sliding time window
//! - A fixed pool of **workers** fetches pages, turns each photo into a
//!   Darwin Core record and hands it to the sink
//! - A single **CSV sink** writes the header and then every row, so rows from
//!   concurrent workers never interleave
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Queue, transformation, sink and harvest orchestration
//! - [`adapters`] - Flickr REST API client
//! - [`domain`] - Core domain types, schema and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flickr_harvester::config::load_config;
//! use flickr_harvester::core::harvest::HarvestCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("harvester.toml")?;
//!
//!     let coordinator = HarvestCoordinator::from_config(config)?;
//!     let summary = coordinator.execute_harvest().await?;
//!
//!     println!("Wrote {} records", summary.records_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Transformation
//!
//! [`core::transform::transform_photo`] is a pure function from a photo,
//! the license table and the last-update window to a record:
//!
//! ```rust
//! use flickr_harvester::core::transform::{transform_photo, UpdateWindow};
//! use flickr_harvester::domain::{LicenseTable, RawPhoto};
//!
//! let photo = RawPhoto {
//!     page_url: "https://flickr.com/photos/someone/123".to_string(),
//!     machine_tags: vec!["taxonomy:scientificName=Felis catus".to_string()],
//!     ..Default::default()
//! };
//! let record = transform_photo(&photo, &LicenseTable::default(), &UpdateWindow::default())
//!     .accepted()
//!     .unwrap();
//!
//! assert_eq!(record.get("occurrenceID"), Some("https://www.flickr.com/photos/someone/123/"));
//! assert_eq!(record.get("scientificName"), Some("Felis catus"));
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::HarvesterError`]; the CLI maps failures to
//! exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
