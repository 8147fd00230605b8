//! `rapal status` — show configuration status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use rapal_core::config::load_config;

use crate::helpers;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config_path = helpers::resolve_config_path(config_path);
    let config = load_config(Some(&config_path));

    println!();
    println!("{}", "🤖 RAPal Status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    // Model
    println!("  {:<18} {}", "Model:".bold(), config.model.name);
    let key_status = if config.model.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "✗ not configured (set GEMINI_API_KEY)".red())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);
    if let Some(base) = &config.model.api_base {
        println!("  {:<18} {}", "API base:".bold(), base);
    }
    println!(
        "  {:<18} {}",
        "Parameters:".bold(),
        format!(
            "temp: {} | top_p: {} | top_k: {} | max_tokens: {}",
            config.generation.temperature,
            config.generation.top_p,
            config.generation.top_k,
            config.generation.max_output_tokens
        )
        .dimmed(),
    );
    let persona = if config.model.system_instruction.is_some() {
        "custom"
    } else {
        "RAPal AI (built-in)"
    };
    println!("  {:<18} {}", "Persona:".bold(), persona);

    // Sessions
    println!();
    println!(
        "  {:<18} idle timeout {}s | sweep every {}s",
        "Sessions:".bold(),
        config.sessions.idle_timeout_secs,
        config.sessions.sweep_interval_secs
    );
    println!(
        "  {:<18} {} messages/session | {} chars/message",
        "Limits:".bold(),
        config.sessions.max_messages,
        config.sessions.max_message_chars
    );

    // Server
    println!();
    println!(
        "  {:<18} {}:{} ({})",
        "Server:".bold(),
        config.server.host,
        config.server.port,
        config.server.environment
    );
    println!(
        "  {:<18} {}",
        "CORS origin:".bold(),
        config.server.cors_origin.as_deref().unwrap_or("*")
    );
    match &config.server.static_dir {
        Some(dir) => println!(
            "  {:<18} {} {}",
            "Static files:".bold(),
            dir,
            found_marker(Path::new(dir).is_dir())
        ),
        None => println!("  {:<18} {}", "Static files:".bold(), "disabled".dimmed()),
    }

    println!();

    Ok(())
}

fn found_marker(found: bool) -> String {
    if found {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
