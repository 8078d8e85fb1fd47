//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Inputs shared by every command that plans clips
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Source video (VOD) file path
    #[arg(long = "vod", value_name = "PATH")]
    pub vod: PathBuf,

    /// Seconds into the VOD at which the match starts (fractions are truncated)
    #[arg(long, value_name = "SECS", allow_hyphen_values = true)]
    pub offset: Option<String>,

    /// Comma separated event times in seconds from match start, e.g. 10,35,75
    #[arg(long, value_name = "LIST")]
    pub events: Option<String>,

    /// Directory the clips are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds of context kept before each event
    #[arg(long, value_name = "N")]
    pub pre: Option<u32>,

    /// Seconds of context kept after each event
    #[arg(long, value_name = "N")]
    pub post: Option<u32>,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Browse the produced clips interactively once extraction finishes
    #[arg(long)]
    pub browse: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
