//! Interactive playlist navigation on stdin

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::playlist::PlaylistSession;

/// One parsed prompt command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Replay,
    /// 1-based row as shown in the listing
    Select(usize),
    List,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "n" | "next" => Some(Self::Next),
            "p" | "prev" | "previous" => Some(Self::Previous),
            "r" | "replay" | "play" => Some(Self::Replay),
            "l" | "ls" | "list" => Some(Self::List),
            "h" | "?" | "help" => Some(Self::Help),
            "q" | "quit" | "exit" => Some(Self::Quit),
            other => other.parse::<usize>().ok().filter(|n| *n > 0).map(Self::Select),
        }
    }
}

/// Apply a command to the playlist; returns false when browsing should stop
pub fn apply(playlist: &mut PlaylistSession, command: BrowseCommand) -> bool {
    match command {
        BrowseCommand::Next => playlist.select_next(),
        BrowseCommand::Previous => playlist.select_previous(),
        BrowseCommand::Replay => playlist.replay(),
        BrowseCommand::Select(row) => playlist.select_row(row - 1),
        BrowseCommand::List | BrowseCommand::Help => {}
        BrowseCommand::Quit => return false,
    }
    true
}

/// Numbered clip listing with a marker on the loaded clip
pub fn render_listing(playlist: &PlaylistSession) -> String {
    if playlist.is_empty() {
        return "No clips.".to_string();
    }

    playlist
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if playlist.current_index() == Some(i) { '>' } else { ' ' };
            format!(
                "{} {:>2}. {}  (start {}s)",
                marker,
                i + 1,
                entry.filename(),
                entry.start_time_seconds.trunc() as u64
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line status for the prompt
pub fn render_status(playlist: &PlaylistSession) -> String {
    let nav = playlist.navigation();
    let position = match playlist.current_index() {
        Some(i) => format!("[{}/{}]", i + 1, playlist.len()),
        None => format!("[-/{}]", playlist.len()),
    };
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    format!(
        "{} {}  prev: {}  next: {}",
        position,
        playlist.metadata_label().unwrap_or_default(),
        on_off(nav.previous_enabled),
        on_off(nav.next_enabled)
    )
}

const HELP: &str = "n: next  p: previous  r: replay  <number>: jump  l: list  q: quit";

/// Read commands from stdin until `q` or end of input
pub async fn run(playlist: &mut PlaylistSession) -> Result<()> {
    println!("{}", render_listing(playlist));
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} > ", render_status(playlist));
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read command")? else {
            println!();
            break;
        };
        let Some(command) = BrowseCommand::parse(&line) else {
            println!("Unknown command. {}", HELP);
            continue;
        };

        if !apply(playlist, command) {
            break;
        }
        match command {
            BrowseCommand::List => println!("{}", render_listing(playlist)),
            BrowseCommand::Help => println!("{}", HELP),
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PlaylistEntry;
    use crate::ports::PlaybackPort;
    use std::path::Path;
    use std::sync::Arc;

    struct NullPlayer;

    impl PlaybackPort for NullPlayer {
        fn load(&self, _path: &Path, _start_time_seconds: f64) {}
    }

    fn playlist(count: usize) -> PlaylistSession {
        let mut playlist = PlaylistSession::new(Arc::new(NullPlayer));
        for n in 1..=count {
            playlist.append(PlaylistEntry::new(
                format!("/clips/clip_{:02}_{}s.mp4", n, n * 10),
                (n * 10 - 5) as f64,
            ));
        }
        playlist
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(BrowseCommand::parse(" N "), Some(BrowseCommand::Next));
        assert_eq!(BrowseCommand::parse("prev"), Some(BrowseCommand::Previous));
        assert_eq!(BrowseCommand::parse("3"), Some(BrowseCommand::Select(3)));
        assert_eq!(BrowseCommand::parse("0"), None);
        assert_eq!(BrowseCommand::parse("jump"), None);
        assert_eq!(BrowseCommand::parse("q"), Some(BrowseCommand::Quit));
    }

    #[test]
    fn test_apply_moves_cursor() {
        let mut playlist = playlist(3);
        assert!(apply(&mut playlist, BrowseCommand::Select(3)));
        assert_eq!(playlist.current_index(), Some(2));
        assert!(apply(&mut playlist, BrowseCommand::Previous));
        assert_eq!(playlist.current_index(), Some(1));
        assert!(apply(&mut playlist, BrowseCommand::Select(9)));
        assert_eq!(playlist.current_index(), Some(1));
        assert!(!apply(&mut playlist, BrowseCommand::Quit));
    }

    #[test]
    fn test_render_listing_marks_current() {
        let playlist = playlist(2);
        let listing = render_listing(&playlist);
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], ">  1. clip_01_10s.mp4  (start 5s)");
        assert_eq!(lines[1], "   2. clip_02_20s.mp4  (start 15s)");
    }

    #[test]
    fn test_render_status() {
        let playlist = playlist(2);
        assert_eq!(
            render_status(&playlist),
            "[1/2] clip_01_10s.mp4  •  start: 5s  prev: off  next: on"
        );
        assert_eq!(render_listing(&self::playlist(0)), "No clips.");
    }
}
