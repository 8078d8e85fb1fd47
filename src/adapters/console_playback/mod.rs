//! Playback adapters for the command line front end

use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::adapters::toml_config::PlayerSettings;
use crate::ports::PlaybackPort;

/// Logs every load command; used when no player program is configured
#[derive(Debug, Default)]
pub struct ConsolePlayback;

impl PlaybackPort for ConsolePlayback {
    fn load(&self, path: &Path, start_time_seconds: f64) {
        info!(
            start_time_seconds,
            "Now playing {}",
            path.display()
        );
    }
}

/// Opens each loaded clip in an external player process.
///
/// Only one player process is kept; loading a clip stops the previous one.
#[derive(Debug)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl ExternalPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    fn stop_previous(current: &mut Option<Child>) {
        let Some(mut child) = current.take() else {
            return;
        };
        if let Err(e) = child.start_kill() {
            debug!("Previous player already gone: {}", e);
        }
        // Reap in the background so the killed player does not linger
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
    }

    /// Pick the player described by the configuration
    pub fn from_settings(settings: &PlayerSettings) -> Option<Self> {
        settings
            .command
            .as_ref()
            .filter(|command| !command.trim().is_empty())
            .map(|command| Self::new(command.clone(), settings.args.clone()))
    }
}

impl PlaybackPort for ExternalPlayer {
    fn load(&self, path: &Path, start_time_seconds: f64) {
        info!(start_time_seconds, "Opening {} with {}", path.display(), self.program);

        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::stop_previous(&mut current);

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(pid = ?child.id(), "Player started");
                *current = Some(child);
            }
            Err(e) => warn!("Failed to start player {}: {}", self.program, e),
        }
    }
}
