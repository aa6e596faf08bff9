//! Player Engine (playcast-pe) - Main entry point
//!
//! This is the playback microservice for Playcast: it exposes the player
//! control API and SSE event stream consumed by the web clients, and seeds
//! playback preferences from the profile service at session start.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playcast_common::config::{self, TomlConfig};
use playcast_pe::api::{create_router, AppContext};
use playcast_pe::bridge::PreferenceBridge;
use playcast_pe::playback::engine::PlayerEngine;
use playcast_pe::playback::transport::ClockTransport;
use playcast_pe::profile::ProfileClient;
use playcast_pe::state::SharedState;

/// Command-line arguments for playcast-pe
#[derive(Parser, Debug)]
#[command(name = "playcast-pe")]
#[command(about = "Player Engine service for Playcast")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the profile service
    #[arg(long)]
    profile_url: Option<String>,

    /// User whose preferences seed the engine
    #[arg(long)]
    user_id: Option<String>,

    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playcast_pe=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments and resolve configuration
    let args = Args::parse();
    let file_config = match &args.config {
        Some(path) => TomlConfig::load_from(path),
        None => TomlConfig::load(),
    };
    let port = config::resolve_port(args.port, &file_config);
    let profile_url = config::resolve_profile_url(args.profile_url.as_deref(), &file_config);
    let user_id = config::resolve_user_id(args.user_id.as_deref(), &file_config);

    info!("Starting Playcast Player Engine on port {}", port);
    info!("Profile service: {} (user {})", profile_url, user_id);

    // Initialize transport and engine
    let state = Arc::new(SharedState::new());
    let (media_tx, media_rx) = mpsc::unbounded_channel();
    let transport = Arc::new(ClockTransport::spawn(media_tx));
    let engine = Arc::new(PlayerEngine::new(Arc::clone(&state), transport, media_rx));
    engine.start();
    info!("Player engine initialized");

    // Seed preferences from the profile service; session start doubles as
    // the login moment for this service.
    let client = ProfileClient::new(profile_url.as_str(), user_id.as_str())
        .context("Failed to create profile client")?;
    let bridge = Arc::new(PreferenceBridge::new(client));
    bridge.seed(&engine).await;

    // Build the application router
    let ctx = AppContext {
        engine,
        state,
        bridge,
    };
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
