//! TubeLoop Player - Main entry point
//!
//! Headless playback session service: fetches playlist contents, rotates
//! through the configured playlists, schedules ad breaks on a fixed
//! cadence, and serves the HTTP/SSE interface the playback widget uses.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubeloop_common::config::{Config, ConfigOverrides};
use tubeloop_player::api;
use tubeloop_player::playback::SessionEngine;
use tubeloop_player::state::SharedState;

/// Command-line arguments for tubeloop-player
#[derive(Parser, Debug)]
#[command(name = "tubeloop-player")]
#[command(about = "Continuous YouTube playlist player with timed ad breaks")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "TUBELOOP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TUBELOOP_PORT")]
    port: Option<u16>,

    /// Playlist API key
    #[arg(long, env = "TUBELOOP_API_KEY")]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Configuration is loaded before the subscriber exists so its log
    // level can seed the filter; RUST_LOG still outranks it.
    let config = Config::load(ConfigOverrides {
        config_path: args.config,
        port: args.port,
        api_key: args.api_key,
    })
    .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(log_level = %config.logging.level, "Configuration loaded");
    info!(
        "Starting TubeLoop Player with {} playlist(s) and {} ad video(s)",
        config.playlists.len(),
        config.ad_video_ids.len()
    );

    // Initialize the session engine
    let state = Arc::new(SharedState::new());
    let (engine, engine_tx) = SessionEngine::new(config.clone(), Arc::clone(&state))
        .context("Failed to initialize session engine")?;

    tokio::spawn(engine.run());
    info!("Session engine started");

    // Build the application router
    let app_state = api::AppState {
        state,
        engine_tx,
        port: config.port,
    };

    let app = api::create_router(app_state);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
