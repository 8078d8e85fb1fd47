use std::sync::Arc;

use crate::adapters::{AppConfig, ConsolePlayback, ExternalPlayer, FfmpegEncoder};
use crate::app::extraction_interactor::ExtractionInteractor;
use crate::playlist::PlaylistSession;
use crate::ports::{EncoderPort, PlaybackPort};

pub trait AppContainer: Send + Sync {
    fn extraction_interactor(&self) -> Arc<ExtractionInteractor>;
    fn new_playlist(&self) -> PlaylistSession;
}

pub struct DefaultAppContainer {
    extraction_interactor: Arc<ExtractionInteractor>,
    playback_port: Arc<dyn PlaybackPort>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let encoder_port: Arc<dyn EncoderPort> = Arc::new(FfmpegEncoder::new(config.encoder.clone()));
        let playback_port: Arc<dyn PlaybackPort> = match ExternalPlayer::from_settings(&config.player) {
            Some(player) => Arc::new(player),
            None => Arc::new(ConsolePlayback),
        };

        Self::with_ports(encoder_port, playback_port)
    }

    /// Wire the container around explicit ports
    pub fn with_ports(encoder_port: Arc<dyn EncoderPort>, playback_port: Arc<dyn PlaybackPort>) -> Self {
        Self {
            extraction_interactor: Arc::new(ExtractionInteractor::new(encoder_port)),
            playback_port,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn extraction_interactor(&self) -> Arc<ExtractionInteractor> {
        Arc::clone(&self.extraction_interactor)
    }

    fn new_playlist(&self) -> PlaylistSession {
        PlaylistSession::new(Arc::clone(&self.playback_port))
    }
}
