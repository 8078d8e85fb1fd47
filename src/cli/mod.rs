//! CLI module for VodClip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod browse;
pub mod commands;

pub use args::{ExtractArgs, PlanArgs, RunArgs};

/// VodClip - cut clips around match events and browse them
#[derive(Parser, Debug)]
#[command(name = "vodclip")]
#[command(about = "Extract event clips from a match VOD and browse them in order")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./vodclip.toml when present)
    #[arg(long, global = true, env = "VODCLIP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut one clip per event and build the playlist
    Extract(ExtractArgs),
    /// Show the clips that would be cut, without running the encoder
    Plan(PlanArgs),
}
