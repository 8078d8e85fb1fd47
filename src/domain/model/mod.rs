// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClipError, ClipResult};


/// Seconds since match start at which an event happened
pub type EventTimestamp = u64;

/// Largest match start offset accepted from user input
pub const MAX_OFFSET_SECONDS: u64 = u32::MAX as u64;

/// Container extension used for every produced clip
pub const CLIP_EXTENSION: &str = "mp4";

/// A configured event of interest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Seconds relative to match start
    pub time: EventTimestamp,
    /// Free-form label such as "kill" or "death"
    #[serde(default = "TimedEvent::default_event_type", alias = "eventType")]
    pub event_type: String,
}

impl TimedEvent {
    /// Create a new timed event
    pub fn new(time: EventTimestamp, event_type: impl Into<String>) -> Self {
        Self {
            time,
            event_type: event_type.into(),
        }
    }

    fn default_event_type() -> String {
        "event".to_string()
    }

    /// Parse a comma separated list of event seconds, e.g. `10,35,75`
    pub fn parse_list(list: &str) -> ClipResult<Vec<TimedEvent>> {
        list.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<EventTimestamp>()
                    .map(|time| TimedEvent::new(time, Self::default_event_type()))
                    .map_err(|_| ClipError::InvalidEvent {
                        value: part.to_string(),
                    })
            })
            .collect()
    }
}

/// Everything one extraction run needs; owned by exactly one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub vod_path: PathBuf,
    pub match_start_offset_seconds: u64,
    pub events: Vec<TimedEvent>,
    pub output_dir: PathBuf,
    pub pre_seconds: u32,
    pub post_seconds: u32,
}

impl RunConfiguration {
    /// Event seconds in configured order
    pub fn event_timestamps(&self) -> impl Iterator<Item = EventTimestamp> + '_ {
        self.events.iter().map(|event| event.time)
    }

    /// Ensure the source video exists and is a regular file
    pub fn validate_source(&self) -> ClipResult<()> {
        if self.vod_path.as_os_str().is_empty() || !self.vod_path.is_file() {
            return Err(ClipError::MissingVod {
                path: self.vod_path.display().to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a match start offset the way users type it.
///
/// Empty input means zero. Fractional values are accepted and truncated toward zero.
/// Values above [`MAX_OFFSET_SECONDS`] are rejected.
pub fn parse_offset(text: &str) -> ClipResult<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = || ClipError::InvalidOffset {
        value: trimmed.to_string(),
    };
    let seconds: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 || seconds.trunc() > MAX_OFFSET_SECONDS as f64 {
        return Err(invalid());
    }
    Ok(seconds.trunc() as u64)
}

/// One planned trimming operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest {
    /// 1-based ordinal in plan order
    pub index: usize,
    pub start_time_seconds: f64,
    pub duration_seconds: f64,
    pub output_path: PathBuf,
}

impl ExtractionRequest {
    /// Build the unique clip filename for an ordinal and absolute second
    pub fn clip_filename(index: usize, absolute_second: u64) -> String {
        format!("clip_{:02}_{}s.{}", index, absolute_second, CLIP_EXTENSION)
    }

    /// Final path component of the output file
    pub fn output_filename(&self) -> String {
        file_name_of(&self.output_path)
    }
}

impl fmt::Display for ExtractionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} start={:.3}s duration={:.3}s -> {}",
            self.index,
            self.start_time_seconds,
            self.duration_seconds,
            self.output_path.display()
        )
    }
}

/// Terminal result of one executed request
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success {
        path: PathBuf,
        start_time_seconds: f64,
    },
    Failure {
        reason: String,
        request_index: usize,
    },
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }
}

/// A produced clip as shown in the playlist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistEntry {
    pub path: PathBuf,
    pub start_time_seconds: f64,
}

impl PlaylistEntry {
    pub fn new(path: impl Into<PathBuf>, start_time_seconds: f64) -> Self {
        Self {
            path: path.into(),
            start_time_seconds,
        }
    }

    /// Resolve a produced filename against the run's output directory
    pub fn from_produced(output_dir: &Path, filename: &str, start_time_seconds: f64) -> Self {
        let joined = output_dir.join(filename);
        let path = std::path::absolute(&joined).unwrap_or(joined);
        Self::new(path, start_time_seconds)
    }

    pub fn filename(&self) -> String {
        file_name_of(&self.path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
