//! Extraction engine module
//!
//! The executor runs a plan on a worker task and reports every step as an
//! [`ExtractionEvent`] over an ordered channel.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::model::ExtractionOutcome;

pub mod executor;

pub use executor::{CancelHandle, ExtractionExecutor};

/// Lifecycle events sent from the worker to the interactive side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExtractionEvent {
    /// Human-readable status line
    Progress(String),
    /// A clip was written to the output directory
    ClipProduced {
        filename: String,
        start_time_seconds: f64,
    },
    /// The run stopped because of a failure
    Error(String),
    /// Last event of every run that was not cancelled
    Finished,
}

/// Sending half handed to the executor
pub type EventSender = mpsc::UnboundedSender<ExtractionEvent>;

/// Receiving half drained by the interactive side
pub type EventReceiver = mpsc::UnboundedReceiver<ExtractionEvent>;

/// Create an ordered event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Executor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutorState {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
    Terminated,
}

/// What a run leaves behind once its worker exits
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// One outcome per request that was actually executed
    pub outcomes: Vec<ExtractionOutcome>,
    /// `Completed`, `Failed` or `Cancelled`
    pub result: ExecutorState,
}

impl RunSummary {
    pub fn produced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}
