//! Utility helpers — path resolution, timestamp formatting, string manipulation.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

/// Get the RAPal data directory (e.g. `~/.rapal/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".rapal")
}

/// Format a UTC instant as ISO 8601 with millisecond precision and a `Z` suffix
/// (e.g. `2025-01-01T00:00:00.000Z`).
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as [`iso_millis`].
pub fn timestamp() -> String {
    iso_millis(Utc::now())
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from(".")).join(rest),
        None if path == "~" => home_dir().unwrap_or_else(|| PathBuf::from(".")),
        None => PathBuf::from(path),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
