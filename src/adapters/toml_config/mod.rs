// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::exec_ffmpeg::EncoderProfile;
use crate::adapters::tracing_log::LoggingSettings;
use crate::domain::model::TimedEvent;
use crate::error::{ClipError, ClipResult};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "vodclip.toml";

/// Clip window and output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub pre_seconds: u32,
    pub post_seconds: u32,
    pub output_dir: PathBuf,
    pub match_start_offset_seconds: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            pre_seconds: 5,
            post_seconds: 5,
            output_dir: PathBuf::from("clips"),
            match_start_offset_seconds: 0,
        }
    }
}

/// External player settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Program used to open clips, e.g. `mpv`; clips are only logged when unset
    pub command: Option<String>,
    /// Extra arguments placed before the clip path
    pub args: Vec<String>,
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionSettings,
    pub encoder: EncoderProfile,
    pub logging: LoggingSettings,
    pub player: PlayerSettings,
    pub events: Vec<TimedEvent>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionSettings::default(),
            encoder: EncoderProfile::default(),
            logging: LoggingSettings::default(),
            player: PlayerSettings::default(),
            events: default_events(),
        }
    }
}

/// Event table used until a detection source supplies real events
pub fn default_events() -> Vec<TimedEvent> {
    vec![
        TimedEvent::new(10, "kill"),
        TimedEvent::new(35, "death"),
        TimedEvent::new(75, "kill"),
        TimedEvent::new(120, "death"),
    ]
}

impl AppConfig {
    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> ClipResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClipError::config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> ClipResult<()> {
        self.logging.parse_level()?;

        if self.encoder.crf > 51 {
            return Err(ClipError::config("CRF value cannot exceed 51"));
        }
        if self.encoder.program.trim().is_empty() {
            return Err(ClipError::config("Encoder program cannot be empty"));
        }
        if self.extraction.pre_seconds == 0 && self.extraction.post_seconds == 0 {
            return Err(ClipError::config(
                "pre_seconds and post_seconds cannot both be zero",
            ));
        }
        if self.encoder.timeout_secs == Some(0) {
            return Err(ClipError::config("Encoder timeout must be at least one second"));
        }

        Ok(())
    }

    /// Apply `VODCLIP_*` overrides using the supplied lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ClipResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(level) = lookup("VODCLIP_LOG_LEVEL") {
            self.logging.level = level;
            applied += 1;
        }
        if let Some(dir) = lookup("VODCLIP_OUTPUT_DIR") {
            self.extraction.output_dir = PathBuf::from(dir);
            applied += 1;
        }
        if let Some(program) = lookup("VODCLIP_FFMPEG") {
            self.encoder.program = program;
            applied += 1;
        }
        if let Some(pre) = lookup("VODCLIP_PRE_SECONDS") {
            self.extraction.pre_seconds = parse_env_number("VODCLIP_PRE_SECONDS", &pre)?;
            applied += 1;
        }
        if let Some(post) = lookup("VODCLIP_POST_SECONDS") {
            self.extraction.post_seconds = parse_env_number("VODCLIP_POST_SECONDS", &post)?;
            applied += 1;
        }

        Ok(applied)
    }
}

fn parse_env_number(key: &str, value: &str) -> ClipResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| ClipError::config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

/// Loads configuration from TOML files and the environment
pub struct TomlConfigAdapter {
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter; `path` is an explicit `--config` value
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            config_file_path: path,
        }
    }

    /// Resolve configuration: defaults < file < environment
    pub fn load(&self) -> ClipResult<AppConfig> {
        let mut config = match self.resolve_file() {
            Some(path) => Self::read_file(&path)?,
            None => AppConfig::default(),
        };

        let applied = config.apply_env_overrides(|key| std::env::var(key).ok())?;
        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }

        Ok(config)
    }

    fn resolve_file(&self) -> Option<PathBuf> {
        match &self.config_file_path {
            Some(path) => Some(path.clone()),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.is_file().then_some(fallback)
            }
        }
    }

    /// Read one TOML file
    pub fn read_file(path: &Path) -> ClipResult<AppConfig> {
        if !path.exists() {
            return Err(ClipError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClipError::config(format!("Failed to read config file: {}", e)))?;
        AppConfig::from_toml_str(&content)
    }
}
