//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` command line once per extraction request and maps the
//! process result onto [`ClipError`].

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::model::ExtractionRequest;
use crate::error::ClipError;
use crate::ports::EncoderPort;

/// Fixed quality/compatibility profile passed to the encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderProfile {
    /// Encoder executable, resolved through PATH when not absolute
    pub program: String,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    /// Upper bound for a single invocation; unbounded when absent
    pub timeout_secs: Option<u64>,
}

impl Default for EncoderProfile {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            timeout_secs: None,
        }
    }
}

/// FFmpeg-based encoder adapter
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    profile: EncoderProfile,
}

impl FfmpegEncoder {
    /// Create new FFmpeg adapter
    pub fn new(profile: EncoderProfile) -> Self {
        Self { profile }
    }

    /// Build the argument vector for one request
    pub fn build_args(&self, request: &ExtractionRequest, source: &Path) -> Vec<String> {
        let profile = &self.profile;
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            format!("{:.3}", request.start_time_seconds),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", request.duration_seconds),
            "-c:v".to_string(),
            profile.video_codec.clone(),
            "-preset".to_string(),
            profile.preset.clone(),
            "-crf".to_string(),
            profile.crf.to_string(),
            "-c:a".to_string(),
            profile.audio_codec.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            request.output_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl EncoderPort for FfmpegEncoder {
    async fn extract(&self, request: &ExtractionRequest, source: &Path) -> Result<(), ClipError> {
        let args = self.build_args(request, source);
        let output_filename = request.output_filename();
        debug!("Running encoder: {} {}", self.profile.program, args.join(" "));

        let mut child = Command::new(&self.profile.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ClipError::ToolNotFound {
                    tool: self.profile.program.clone(),
                },
                _ => ClipError::UnexpectedWorkerFailure {
                    message: format!("Failed to start {}: {}", self.profile.program, e),
                },
            })?;

        // Drain stderr while waiting on the child
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buffer = String::new();
                let _ = stderr.read_to_string(&mut buffer).await;
                buffer
            })
        });

        let status = match self.profile.timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    warn!(
                        "Encoder timed out after {} seconds producing {}, killing process",
                        secs, output_filename
                    );
                    let _ = child.kill().await;
                    return Err(ClipError::ToolExecutionFailed {
                        output_filename,
                        exit_code: None,
                    });
                }
            },
            None => child.wait().await?,
        };

        let stderr = match stderr_task {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            info!("Produced {}", output_filename);
            Ok(())
        } else {
            warn!(
                exit_code = ?status.code(),
                "Encoder failed for {}: {}",
                output_filename,
                stderr.trim()
            );
            Err(ClipError::ToolExecutionFailed {
                output_filename,
                exit_code: status.code(),
            })
        }
    }
}
