//! RAPal CLI — entry point.
//!
//! # Commands
//!
//! - `rapal serve` — start the HTTP server and the idle-session sweeper
//! - `rapal chat [-m MESSAGE] [-s SESSION]` — talk to RAPal AI from the terminal
//! - `rapal status` — show configuration status
//! - `rapal init` — write a default config file

mod helpers;
mod init;
mod repl;
mod serve;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use rapal_core::config::{load_config, Config, LoggingConfig};
use rapal_core::types::DEFAULT_SESSION_ID;
use rapal_providers::GeminiModel;
use rapal_server::ChatService;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🤖 RAPal AI — chat relay for the RPL department assistant
#[derive(Parser)]
#[command(name = "rapal", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.rapal/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat with RAPal AI (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Session identifier
        #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
        session: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration status
    Status,

    /// Write a default config file
    Init,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { host, port, logs } => {
            let mut config = load_config(config_path);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            init_logging(&config.logging, logs);
            serve::run(config).await
        }
        Commands::Chat {
            message,
            session,
            logs,
        } => {
            let config = load_config(config_path);
            // The REPL owns the terminal; stay quiet unless asked
            if logs {
                init_logging(&config.logging, true);
            }
            run_chat(&config, message, session).await
        }
        Commands::Status => status::run(config_path),
        Commands::Init => init::run(config_path),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(config: &Config, message: Option<String>, session_id: String) -> Result<()> {
    let service = build_service(config)?;

    match message {
        Some(msg) => {
            // Single-shot mode
            info!(session = %session_id, "processing single message");
            let reply = repl::ask(&service, &msg, &session_id).await;
            helpers::print_reply(&reply);
        }
        None => {
            // Interactive REPL mode
            repl::run(&service, &session_id).await?;
        }
    }

    Ok(())
}

/// Validate the configuration and build the chat service on Gemini.
pub fn build_service(config: &Config) -> Result<Arc<ChatService>> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let model = GeminiModel::from_config(config);
    info!(model = %config.model.name, "model client ready");

    Ok(Arc::new(ChatService::new(Arc::new(model), &config.sessions)))
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

/// Library modules held at `warn` unless `RUST_LOG` says otherwise.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "tower_http"];

/// Build the filter directives for the configured level.
///
/// `verbose` raises RAPal's own crates and request tracing to debug.
fn filter_directives(level: &str, verbose: bool) -> String {
    if verbose {
        return "rapal=debug,tower_http=debug,info".to_string();
    }
    let mut directives = level.to_string();
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    directives
}

/// Initialize tracing/logging.
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&logging.level, verbose)));

    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::parse_from(["rapal", "serve", "--port", "8080", "--logs"]);
        match cli.command {
            Commands::Serve { host, port, logs } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
                assert!(logs);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parse_chat_defaults_to_default_session() {
        let cli = Cli::parse_from(["rapal", "chat", "-m", "Apa itu RPL?"]);
        match cli.command {
            Commands::Chat { message, session, .. } => {
                assert_eq!(message.as_deref(), Some("Apa itu RPL?"));
                assert_eq!(session, "default");
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::parse_from(["rapal", "status", "--config", "/tmp/rapal.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rapal.json")));
    }

    #[test]
    fn filter_holds_noisy_modules_at_warn() {
        let directives = filter_directives("info", false);
        assert!(directives.starts_with("info"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.contains("hyper=warn"));
    }

    #[test]
    fn verbose_filter_raises_rapal() {
        assert!(filter_directives("info", true).contains("rapal=debug"));
    }

    #[test]
    fn build_service_requires_api_key() {
        let config = Config::default();
        assert!(build_service(&config).is_err());
    }
}
