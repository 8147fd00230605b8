//! `rapal init` — write a default configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use rapal_core::config::{save_config, Config};
use rapal_core::utils::get_data_path;

use crate::helpers;

/// Run the init command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "🤖 RAPal — Setup".cyan().bold());
    println!();

    let config_path = helpers::resolve_config_path(config_path);

    if write_default_config(&config_path)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Set GEMINI_API_KEY (or model.apiKey), then run `rapal serve`.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
