// Adapters - External system implementations

pub mod console_playback;
pub mod exec_ffmpeg;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use console_playback::{ConsolePlayback, ExternalPlayer};
pub use exec_ffmpeg::{EncoderProfile, FfmpegEncoder};
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::{init_logging, LoggingSettings};
