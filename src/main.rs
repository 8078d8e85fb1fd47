//! VodClip CLI
//!
//! Extracts highlight clips from a match recording around timed events.
//!
//! # Features
//!
//! - Clip windows computed from a match start offset and per-event timestamps
//! - Sequential FFmpeg extraction on a background worker with live progress
//! - Playlist of produced clips with next/previous/replay navigation
//! - TOML configuration with environment and flag overrides
//!
//! # Usage
//!
//! ```bash
//! vodclip extract --vod match.mp4 --offset 90 --events 10,35,75 --browse
//! vodclip plan --vod match.mp4 --offset 90 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use vodclip::adapters::init_logging;
use vodclip::cli::{commands, Cli, Commands};

/// Main entry point for the VodClip CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;

    init_logging(&config.logging)?;
    info!("Starting VodClip");

    match cli.command {
        Commands::Extract(args) => {
            info!("Executing extract command");
            commands::extract(args, config).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &config)?;
        }
    }

    info!("VodClip completed successfully");
    Ok(())
}
