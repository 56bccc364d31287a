//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "harvester.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing harvester configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your group and filters", self.output);
                println!("  2. Put FLICKR_API_KEY in your environment or a .env file");
                println!("  3. Validate configuration: flickr-harvester validate-config");
                println!("  4. Run a harvest: flickr-harvester harvest");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Sample configuration with every section and its defaults
    pub fn generate_config() -> &'static str {
        r#"# Flickr Harvester Configuration
# Harvests a Flickr group pool into a Darwin Core CSV file

[application]
# trace, debug, info, warn, error
log_level = "info"

[flickr]
# ${VAR} placeholders are read from the environment (or .env)
api_key = "${FLICKR_API_KEY}"
# shared_secret = "${FLICKR_SHARED_SECRET}"
base_url = "https://api.flickr.com/services/rest/"

# Biodiversity Heritage Library group
group_id = "806927@N20"
# user_id = ""

machine_tags = ["taxonomy:binomial="]
per_page = 100
timeout_seconds = 60

# content_type = 1
# privacy_filter = 1

[flickr.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

[flickr.dates]
# yyyy-MM-dd; empty or absent means unbounded
# Update bounds are exclusive and filter records after fetching
min_update_date = ""
max_update_date = ""
min_upload_date = ""
max_upload_date = ""
min_taken_date = ""
max_taken_date = ""

[harvest]
workers = 3
output_dir = "/tmp/"
output_file = "flickr.dwc.csv"
# Skip records whose values for these terms were already written
unique_key_terms = []
dequeue_timeout_ms = 10000
supervision_interval_secs = 60
max_wait_secs = 36000

[queue]
capacity = 1000
# At most rate_limit pages are enqueued per rate_window_ms
rate_limit = 10
rate_window_ms = 60000

[logging]
local_enabled = false
local_path = "/var/log/flickr-harvester"
# daily or hourly
local_rotation = "daily"
"#
    }
}
