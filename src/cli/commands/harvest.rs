//! Harvest command implementation
//!
//! This module implements the `harvest` command, which pulls every page of
//! the configured Flickr group pool and writes Darwin Core rows to CSV.

use crate::config::{load_config, HarvesterConfig};
use crate::core::harvest::HarvestCoordinator;
use crate::domain::HarvesterError;
use clap::Args;
use std::path::Path;
use tokio::sync::watch;

/// Arguments for the harvest command
#[derive(Args, Debug, Default)]
pub struct HarvestArgs {
    /// Override the number of worker tasks
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Override the output file name
    #[arg(long)]
    pub output_file: Option<String>,

    /// Append to an existing output file instead of replacing it
    #[arg(long)]
    pub keep_existing: bool,
}

impl HarvestArgs {
    /// Applies command line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut HarvesterConfig) {
        if let Some(threads) = self.threads {
            tracing::info!(workers = threads, "Overriding worker count from CLI");
            config.harvest.workers = threads;
        }
        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir, "Overriding output directory from CLI");
            config.harvest.output_dir = dir.clone();
        }
        if let Some(file) = &self.output_file {
            tracing::info!(output_file = %file, "Overriding output file from CLI");
            config.harvest.output_file = file.clone();
        }
    }

    /// Execute the harvest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting harvest command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let output_path = config.harvest.output_path();
        if !self.keep_existing {
            remove_existing_output(&output_path)?;
        }

        println!("Harvest Configuration:");
        println!("  Group: {}", config.flickr.group_id);
        if let Some(user_id) = config.flickr.user_id.as_deref().filter(|u| !u.is_empty()) {
            println!("  User: {user_id}");
        }
        println!("  Machine tags: {:?}", config.flickr.machine_tags);
        println!("  Workers: {}", config.harvest.workers);
        println!("  Output: {}", output_path.display());
        println!();

        let coordinator = match HarvestCoordinator::from_config(config) {
            Ok(c) => c.with_shutdown(shutdown_signal),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create harvest coordinator");
                eprintln!("Failed to initialize harvest: {e}");
                return Ok(5);
            }
        };

        println!("🚀 Starting harvest...");
        println!();

        let summary = match coordinator.execute_harvest().await {
            Ok(s) => s,
            Err(e @ HarvesterError::Configuration(_)) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("{e}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(error = %e, "Harvest failed");
                eprintln!("Harvest failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!();
        println!("📊 Harvest Summary:");
        println!("  Total Pages: {}", summary.total_pages);
        println!("  Pages Processed: {}", summary.pages_processed);
        println!("  Pages Failed: {}", summary.pages_failed);
        println!("  Photos Seen: {}", summary.photos_seen);
        println!("  Records Written: {}", summary.records_written);
        println!("  Records Excluded: {}", summary.records_excluded);
        println!("  Duplicates Skipped: {}", summary.duplicates_skipped);
        println!(
            "  Workers Finished: {}/{}",
            summary.workers_finished, summary.workers_started
        );
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in summary.errors.iter().take(10) {
                println!("  - {:?}: {}", error.error_type, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            if summary.errors.len() > 10 {
                println!("  ... and {} more errors", summary.errors.len() - 10);
            }
            println!();
        }

        let exit_code = if summary.interrupted {
            println!("⚠️  Harvest interrupted. Output holds the pages completed so far.");
            tracing::info!("Harvest interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Harvest completed successfully!");
            0
        } else {
            println!("⚠️  Harvest completed with failures");
            1 // Partial success
        };

        Ok(exit_code)
    }
}

/// Deletes the output file from a previous run, if there is one.
fn remove_existing_output(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed existing output file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::anyhow!(
            "Failed to remove existing output {}: {e}",
            path.display()
        )),
    }
}
