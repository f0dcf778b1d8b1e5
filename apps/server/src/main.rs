//! WebControl Server - Standalone relay for the WebControl4 web UI.
//!
//! Serves the browser UI and the JSON API it talks to: SDDP discovery of
//! directors on the LAN, cloud login and token minting, and a pass-through
//! proxy to the director REST API.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use webcontrol_core::{bootstrap_services, start_server, AppState};

use crate::config::ServerConfig;

/// WebControl Server - Local relay between a browser and a Control4 system.
#[derive(Parser, Debug)]
#[command(name = "webcontrol-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "WEBCONTROL_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long, env = "WEBCONTROL_BIND_PORT")]
    port: Option<u16>,

    /// Directory containing the web UI (overrides config file).
    #[arg(short = 's', long, env = "WEBCONTROL_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("WebControl Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = Some(static_dir);
    }

    match &config.static_dir {
        Some(dir) if !dir.join("index.html").is_file() => {
            log::warn!(
                "No index.html in {}; only the API will be useful",
                dir.display()
            );
        }
        Some(_) => {}
        None => log::info!("No static directory configured - serving the API only"),
    }

    log::info!(
        "Configuration: bind_port={}, request_timeout={}s, max_redirects={}",
        config.bind_port,
        config.request_timeout_secs,
        config.max_redirects
    );

    let core_config = config.to_core_config();
    let services = bootstrap_services(&core_config).context("Failed to bootstrap services")?;

    log::info!("Services bootstrapped successfully");

    let app_state = AppState::new(&services, core_config.static_dir.clone());

    start_server(app_state, core_config.preferred_port, shutdown_signal())
        .await
        .with_context(|| format!("Failed to serve on port {}", core_config.preferred_port))?;

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// If a handler cannot be installed that branch never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received");
}
