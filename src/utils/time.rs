//! Time formatting utilities

/// Format milliseconds as `MM:SS`; minutes are not wrapped into hours
pub fn format_clock(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format a position/duration pair as `MM:SS / MM:SS`
pub fn format_time_label(position_ms: u64, duration_ms: u64) -> String {
    format!("{} / {}", format_clock(position_ms), format_clock(duration_ms))
}
