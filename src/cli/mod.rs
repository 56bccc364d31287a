//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the harvester using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Flickr Harvester - Flickr group pool to Darwin Core CSV
#[derive(Parser, Debug)]
#[command(name = "flickr-harvester")]
#[command(version, about, long_about = None)]
#[command(author = "Flickr Harvester Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "harvester.toml",
        env = "FLICKR_HARVESTER_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FLICKR_HARVESTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest the configured group pool into a Darwin Core CSV file
    Harvest(commands::harvest::HarvestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
