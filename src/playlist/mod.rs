//! Clip playlist and navigation cursor
//!
//! [`PlaylistSession`] owns the produced clips and a single cursor. Every
//! mutation keeps `current_index < entries.len()` and refreshes the cached
//! [`NavigationState`] that the front end reads to enable its controls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::model::PlaylistEntry;
use crate::ports::{PlaybackPort, TransportReport};
use crate::utils::time::format_time_label;

/// Which navigation controls are usable right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NavigationState {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// Ordered clip list with a load cursor
pub struct PlaylistSession {
    entries: Vec<PlaylistEntry>,
    current_index: Option<usize>,
    navigation: NavigationState,
    transport: TransportReport,
    player: Arc<dyn PlaybackPort>,
}

impl PlaylistSession {
    /// Create an empty session bound to a player
    pub fn new(player: Arc<dyn PlaybackPort>) -> Self {
        Self {
            entries: Vec::new(),
            current_index: None,
            navigation: NavigationState::default(),
            transport: TransportReport::default(),
            player,
        }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected position, `None` when nothing is loaded
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.current_index.and_then(|i| self.entries.get(i))
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    /// Drop every clip; called before a new extraction run starts
    pub fn reset(&mut self) {
        self.entries.clear();
        self.current_index = None;
        self.transport = TransportReport::default();
        self.refresh_navigation();
    }

    /// Append a produced clip, auto-loading the first one
    pub fn append(&mut self, entry: PlaylistEntry) {
        debug!("Playlist append: {}", entry.path.display());
        self.entries.push(entry);
        if self.current_index.is_none() && self.entries.len() == 1 {
            self.select_and_load(0);
        } else {
            self.refresh_navigation();
        }
    }

    /// Load the clip at `index`; out-of-range indices are ignored
    pub fn select_and_load(&mut self, index: usize) {
        let Some(entry) = self.entries.get(index) else {
            debug!("Ignoring selection of {} in a playlist of {}", index, self.entries.len());
            return;
        };

        info!("Loading clip {}/{}: {}", index + 1, self.entries.len(), entry.filename());
        self.player.load(&entry.path, entry.start_time_seconds);
        self.current_index = Some(index);
        self.transport = TransportReport::default();
        self.refresh_navigation();
    }

    /// A row picked directly in the clip list
    pub fn select_row(&mut self, row: usize) {
        self.select_and_load(row);
    }

    pub fn select_previous(&mut self) {
        if let Some(target) = self.step(-1) {
            self.select_and_load(target);
        }
    }

    pub fn select_next(&mut self) {
        if let Some(target) = self.step(1) {
            self.select_and_load(target);
        }
    }

    /// Load the current clip again from the beginning
    pub fn replay(&mut self) {
        if let Some(index) = self.current_index {
            self.select_and_load(index);
        }
    }

    fn step(&self, delta: isize) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        match self.current_index {
            None => Some(0),
            Some(current) => Some(current.saturating_add_signed(delta).min(last)),
        }
    }

    fn refresh_navigation(&mut self) {
        let len = self.entries.len();
        self.navigation = match self.current_index {
            None => NavigationState {
                previous_enabled: false,
                next_enabled: len > 1,
            },
            Some(index) => NavigationState {
                previous_enabled: index > 0,
                next_enabled: index + 1 < len,
            },
        };
    }

    /// Record position/duration/state reported by the player
    pub fn on_transport(&mut self, report: TransportReport) {
        self.transport = report;
    }

    pub fn transport(&self) -> TransportReport {
        self.transport
    }

    /// `MM:SS / MM:SS` for the loaded clip
    pub fn time_label(&self) -> String {
        format_time_label(self.transport.position_ms, self.transport.duration_ms)
    }

    /// `<filename>  •  start: <seconds>s` for the loaded clip
    pub fn metadata_label(&self) -> Option<String> {
        self.current_entry().map(|entry| {
            format!(
                "{}  •  start: {}s",
                entry.filename(),
                entry.start_time_seconds.trunc() as u64
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PlaybackState;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlayer {
        loads: Mutex<Vec<(PathBuf, f64)>>,
    }

    impl RecordingPlayer {
        fn loads(&self) -> Vec<(PathBuf, f64)> {
            self.loads.lock().unwrap().clone()
        }
    }

    impl PlaybackPort for RecordingPlayer {
        fn load(&self, path: &Path, start_time_seconds: f64) {
            self.loads
                .lock()
                .unwrap()
                .push((path.to_path_buf(), start_time_seconds));
        }
    }

    fn session() -> (PlaylistSession, Arc<RecordingPlayer>) {
        let player = Arc::new(RecordingPlayer::default());
        (PlaylistSession::new(player.clone()), player)
    }

    fn entry(n: usize) -> PlaylistEntry {
        PlaylistEntry::new(format!("/clips/clip_{:02}_{}s.mp4", n, n * 10), (n * 10) as f64)
    }

    #[test]
    fn test_first_append_auto_loads() {
        let (mut playlist, player) = session();
        playlist.reset();
        playlist.append(entry(1));

        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(player.loads(), vec![(PathBuf::from("/clips/clip_01_10s.mp4"), 10.0)]);
    }

    #[test]
    fn test_second_append_keeps_cursor_and_enables_next() {
        let (mut playlist, player) = session();
        playlist.append(entry(1));
        assert!(!playlist.navigation().next_enabled);

        playlist.append(entry(2));

        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(player.loads().len(), 1);
        assert_eq!(
            playlist.navigation(),
            NavigationState {
                previous_enabled: false,
                next_enabled: true,
            }
        );
    }

    #[test]
    fn test_reset_clears_and_rearms_auto_load() {
        let (mut playlist, player) = session();
        playlist.append(entry(1));
        playlist.append(entry(2));
        playlist.select_next();

        playlist.reset();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index(), None);
        assert_eq!(playlist.navigation(), NavigationState::default());

        playlist.append(entry(7));
        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(player.loads().last().unwrap().0, PathBuf::from("/clips/clip_07_70s.mp4"));
    }

    #[test]
    fn test_navigation_on_empty_is_noop() {
        let (mut playlist, player) = session();
        playlist.select_next();
        playlist.select_previous();
        playlist.select_and_load(0);
        playlist.replay();

        assert_eq!(playlist.current_index(), None);
        assert!(player.loads().is_empty());
    }

    #[test]
    fn test_next_and_previous_clamp() {
        let (mut playlist, _player) = session();
        for n in 1..=3 {
            playlist.append(entry(n));
        }

        playlist.select_previous();
        assert_eq!(playlist.current_index(), Some(0));
        playlist.select_next();
        playlist.select_next();
        assert_eq!(playlist.current_index(), Some(2));
        assert_eq!(
            playlist.navigation(),
            NavigationState {
                previous_enabled: true,
                next_enabled: false,
            }
        );
        playlist.select_next();
        assert_eq!(playlist.current_index(), Some(2));
        playlist.select_previous();
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(
            playlist.navigation(),
            NavigationState {
                previous_enabled: true,
                next_enabled: true,
            }
        );
    }

    #[test]
    fn test_out_of_range_selection_is_ignored() {
        let (mut playlist, player) = session();
        playlist.append(entry(1));
        playlist.select_and_load(5);
        assert_eq!(playlist.current_index(), Some(0));
        assert_eq!(player.loads().len(), 1);
    }

    #[test]
    fn test_reselecting_current_is_idempotent() {
        let (mut playlist, player) = session();
        playlist.append(entry(1));
        playlist.append(entry(2));
        playlist.select_and_load(1);
        let before = playlist.navigation();
        playlist.select_and_load(1);

        let loads = player.loads();
        assert_eq!(loads.len(), 3);
        assert_eq!(loads[1], loads[2]);
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.navigation(), before);
    }

    #[test]
    fn test_cursor_stays_in_bounds_for_mixed_operations() {
        let (mut playlist, _player) = session();
        // Deterministic pseudo-random op sequence
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 6 {
                0 => playlist.append(entry(playlist.len() + 1)),
                1 => playlist.select_next(),
                2 => playlist.select_previous(),
                3 => playlist.select_and_load((seed as usize >> 8) % 8),
                4 => playlist.replay(),
                _ => {
                    if seed % 31 == 0 {
                        playlist.reset();
                    }
                }
            }

            let len = playlist.len();
            match playlist.current_index() {
                Some(index) => assert!(index < len),
                None => assert!(!playlist.navigation().previous_enabled),
            }
            let nav = playlist.navigation();
            let expected_prev = matches!(playlist.current_index(), Some(i) if i > 0);
            let expected_next = match playlist.current_index() {
                Some(i) => i + 1 < len,
                None => len > 1,
            };
            assert_eq!(nav.previous_enabled, expected_prev);
            assert_eq!(nav.next_enabled, expected_next);
        }
    }

    #[test]
    fn test_metadata_and_time_labels() {
        let (mut playlist, _player) = session();
        assert_eq!(playlist.metadata_label(), None);

        playlist.append(PlaylistEntry::new("/clips/clip_01_10s.mp4", 5.0));
        assert_eq!(
            playlist.metadata_label().unwrap(),
            "clip_01_10s.mp4  •  start: 5s"
        );

        playlist.on_transport(TransportReport {
            position_ms: 4_200,
            duration_ms: 10_000,
            state: PlaybackState::Playing,
        });
        assert_eq!(playlist.time_label(), "00:04 / 00:10");
        assert_eq!(playlist.transport().state, PlaybackState::Playing);
    }
}
