// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::model::ExtractionRequest;
use crate::error::ClipError;

/// Port for the external encoder that cuts one clip
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Produce `request.output_path` from `source` with exactly one encoder invocation
    async fn extract(&self, request: &ExtractionRequest, source: &Path) -> Result<(), ClipError>;
}

/// Port for the media player that shows the selected clip
pub trait PlaybackPort: Send + Sync {
    /// Load the clip at `path` and start playing it
    fn load(&self, path: &Path, start_time_seconds: f64);
}

/// Player transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Transport report flowing back from the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransportReport {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub state: PlaybackState,
}
