//! Clip window planning
//!
//! Maps a run configuration to the ordered list of trimming operations. The
//! planner does no I/O and cannot fail.

use crate::domain::model::{ExtractionRequest, RunConfiguration};

/// Plans one clip window per configured event
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipWindowPlanner;

impl ClipWindowPlanner {
    /// Create a new planner
    pub fn new() -> Self {
        Self
    }

    /// Build extraction requests in event order, numbered from 1
    pub fn plan(&self, config: &RunConfiguration) -> Vec<ExtractionRequest> {
        let pre = f64::from(config.pre_seconds);
        let duration = f64::from(config.pre_seconds) + f64::from(config.post_seconds);

        config
            .event_timestamps()
            .enumerate()
            .map(|(position, event)| {
                let index = position + 1;
                let absolute_second = config.match_start_offset_seconds.saturating_add(event);
                // Events close to match start would otherwise seek before zero
                let start_time_seconds = (absolute_second as f64 - pre).max(0.0);
                let filename = ExtractionRequest::clip_filename(index, absolute_second);

                ExtractionRequest {
                    index,
                    start_time_seconds,
                    duration_seconds: duration,
                    output_path: config.output_dir.join(filename),
                }
            })
            .collect()
    }
}
