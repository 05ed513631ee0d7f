//! Roadhouse - Discord bridge for MotorTown dedicated servers
//!
//! Tails the dedicated server's log, relays chat/session/ban events to
//! Discord channels, and exposes admin commands backed by the server's
//! Web API.

mod common;
mod config;
mod discord;
mod game;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use config::types::{Config, WebApiConfig};
use discord::Handler;
use game::config::GameConfig;
use game::router::Router;
use game::{AdminApiClient, LogTailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Roadhouse v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = config::env::get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = config::load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Server path: {}", config.path);
    info!("  Log directory: {}", config.log_dir().display());

    // Admin Web API: bridge config first, then the game server's own config.
    let api = resolve_web_api(&config).map(|w| Arc::new(AdminApiClient::new(w.port, w.password)));
    match &api {
        Some(_) => info!("Admin Web API enabled"),
        None => warn!("Admin Web API not configured; commands and presence are disabled"),
    }

    let router = Router::new(config.messages.clone(), config.mention.clone());

    // Start the log tailer
    let log_dir = config.log_dir();
    let tailer = LogTailer::new(&log_dir).map_err(|e| {
        error!("Failed to start log tailer for {}: {}", log_dir.display(), e);
        e
    })?;

    let (line_tx, line_rx) = mpsc::unbounded_channel::<String>();
    let tail_task = tokio::spawn(tailer.run(line_tx));

    // Start the Discord client
    let handler = Handler::new(router, api, line_rx);
    let mut client = discord::build_client(&config.discord_token, handler).await?;

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = tail_task => {
            error!("Log tailer task ended unexpectedly");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Exiting...");
    Ok(())
}

/// Decide where the admin Web API settings come from.
fn resolve_web_api(config: &Config) -> Option<WebApiConfig> {
    if let Some(ref web_api) = config.web_api {
        return Some(web_api.clone());
    }

    match GameConfig::load(config.game_config_path()) {
        Ok(game_config) if game_config.web_api_enabled => Some(WebApiConfig {
            port: game_config.web_api_port,
            password: game_config.web_api_password,
        }),
        Ok(_) => None,
        Err(e) => {
            warn!("Could not read game server config: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
