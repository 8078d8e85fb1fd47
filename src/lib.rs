//! VodClip Library
//!
//! Cuts short highlight clips out of a recorded match video around a list of
//! timed events, and keeps the produced clips in a navigable playlist.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod playlist;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{
    ExtractionOutcome, ExtractionRequest, PlaylistEntry, RunConfiguration, TimedEvent,
};
pub use engine::{ExecutorState, ExtractionEvent, ExtractionExecutor, RunSummary};
pub use error::{ClipError, ClipResult};
pub use planner::ClipWindowPlanner;
pub use playlist::PlaylistSession;
