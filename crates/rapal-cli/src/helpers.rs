//! Shared CLI helpers — path expansion, reply printing, banners.

use std::path::{Path, PathBuf};

use colored::Colorize;

use rapal_core::config::get_config_path;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// The config file in effect: the `--config` path, or the default.
pub fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => expand_tilde(&p.to_string_lossy()),
        None => get_config_path(),
    }
}

/// Host shown to humans; wildcard binds are reachable on localhost.
pub fn display_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" | "[::]" => "localhost",
        other => other,
    }
}

/// Print a RAPal reply to stdout.
pub fn print_reply(reply: &str) {
    println!();
    println!("{}", "🤖 RAPal AI".cyan().bold());
    if reply.is_empty() {
        println!("{}", "(no reply)".dimmed());
    } else {
        println!("{reply}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(session_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🤖 RAPal AI".cyan().bold(), version.dimmed());
    println!("{}", format!("Session: {session_id}").dimmed());
    println!(
        "{}",
        "Type a message, \"/reset\" to start over, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ mengetik...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
