//! Serve command — HTTP server plus the idle-session sweeper.
//!
//! Startup sequence:
//! 1. Validate config and build the chat service
//! 2. Build the router (routes, static files, CORS, tracing)
//! 3. Spawn the sweeper
//! 4. Serve until Ctrl+C or SIGTERM
//! 5. Stop the sweeper and clear the session store

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing::{error, info, warn};

use rapal_core::config::Config;
use rapal_core::session::SessionSweeper;
use rapal_server::{build_router, start_server, AppState};

use crate::helpers;

/// Run the server until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<()> {
    let service = crate::build_service(&config)?;
    let state = AppState::new(service.clone(), config.server.is_development());
    let router = build_router(state, &config.server);

    let sweeper = Arc::new(SessionSweeper::new(
        service.store().clone(),
        config.sessions.sweep_interval(),
        config.sessions.idle_timeout(),
    ));
    let sweeper_task = {
        let sweeper = sweeper.clone();
        tokio::spawn(async move { sweeper.start().await })
    };

    print_banner(&config);

    let result = start_server(router, &config.server, shutdown_signal()).await;

    sweeper.stop();
    match sweeper_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "sweeper exited with error"),
        Err(e) => warn!(error = %e, "sweeper task panicked"),
    }

    let dropped = service.store().shutdown().await;
    info!(dropped, "server stopped");
    println!("  Server stopped. {dropped} session(s) cleared.");

    result
}

fn print_banner(config: &Config) {
    let base = format!(
        "http://{}:{}",
        helpers::display_host(&config.server.host),
        config.server.port
    );

    println!();
    println!("  ✅ {} {}", "RAPal AI server running at".green().bold(), base);
    println!("  📊 Health check: {}/health", base);
    println!("  🤖 Model: {}", config.model.name);
    if config.server.is_development() {
        println!("  {}", "Environment: development".yellow());
    }
    println!();
    println!("  Ctrl+C to stop");
    println!();
}

/// Resolves on Ctrl+C or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }

    println!();
    println!("  Shutting down...");
}
