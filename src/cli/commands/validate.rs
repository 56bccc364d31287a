//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the harvester configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Flickr API: {}", config.flickr.base_url);
        println!("  Group: {}", config.flickr.group_id);
        println!(
            "  User: {}",
            config
                .flickr
                .user_id
                .as_deref()
                .filter(|u| !u.is_empty())
                .unwrap_or("any")
        );
        println!("  Machine Tags: {:?}", config.flickr.machine_tags);
        println!("  Per Page: {}", config.flickr.per_page);

        let dates = &config.flickr.dates;
        for (name, min, max) in [
            ("Upload", &dates.min_upload_date, &dates.max_upload_date),
            ("Taken", &dates.min_taken_date, &dates.max_taken_date),
            ("Update", &dates.min_update_date, &dates.max_update_date),
        ] {
            if min.is_some() || max.is_some() {
                println!(
                    "  {name} Dates: {} .. {}",
                    min.as_deref().unwrap_or("*"),
                    max.as_deref().unwrap_or("*")
                );
            }
        }

        println!("  Workers: {}", config.harvest.workers);
        println!("  Output: {}", config.harvest.output_path().display());
        if !config.harvest.unique_key_terms.is_empty() {
            println!("  Unique Key Terms: {:?}", config.harvest.unique_key_terms);
        }
        println!(
            "  Rate Limit: {} requests / {}ms",
            config.queue.rate_limit, config.queue.rate_window_ms
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[flickr]\napi_key = \"key\"\ngroup_id = \"806927@N20\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_two() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[flickr]\napi_key = \"key\"\ngroup_id = \"806927@N20\"\n\n[harvest]\nworkers = 0"
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_missing_file_exits_two() {
        let code = ValidateArgs {}
            .execute("/nonexistent/harvester.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
