//! Core business logic for the harvester.
//!
//! # Modules
//!
//! - [`queue`] - Bounded work queue with a sliding-window rate limiter
//! - [`transform`] - Photo to Darwin Core record transformation
//! - [`sink`] - Ordered, append-mode CSV output
//! - [`harvest`] - Coordinator, worker pool and summary
//!
//! # Harvest Workflow
//!
//! 1. **Count**: Probe page 1 of the group pool for the page count
//! 2. **Licenses**: Load the license table once
//! 3. **Header**: Open the output file and write the header row
//! 4. **Produce**: Enqueue one work item per page, then one sentinel per worker
//! 5. **Work**: Each worker fetches a page, transforms its photos and writes rows
//! 6. **Report**: Close the output and generate the harvest summary
//!
//! # Example
//!
//! ```rust,no_run
//! use flickr_harvester::config::load_config;
//! use flickr_harvester::core::harvest::HarvestCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("harvester.toml")?;
//!
//! let coordinator = HarvestCoordinator::from_config(config)?;
//! let summary = coordinator.execute_harvest().await?;
//!
//! println!("Pages: {}", summary.pages_processed);
//! println!("Records: {}", summary.records_written);
//! # Ok(())
//! # }
//! ```

pub mod harvest;
pub mod queue;
pub mod sink;
pub mod transform;
