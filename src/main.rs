//! Box Office Server — seat lease service
//!
//! Main entry point that wires the crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use boxoffice_core::config::AppConfig;
use boxoffice_core::error::AppError;
use boxoffice_lease::{LeaseManager, SystemClock};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "boxoffice-server", version, about = "Seat lease service")]
struct Cli {
    /// Directory holding `default.toml` and per-environment overlays.
    #[arg(long, env = "BOXOFFICE_CONFIG_DIR", default_value = "config")]
    config_dir: String,
    /// Environment overlay to apply, e.g. `development` or `production`.
    #[arg(long, env = "BOXOFFICE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        "Loaded config from '{}' (env: {})",
        cli.config_dir,
        cli.env
    );

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Box Office v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Seed the seat registry ───────────────────────────
    let lease_manager = Arc::new(LeaseManager::from_config(
        &config.lease,
        Arc::new(SystemClock),
    )?);

    // ── Step 2: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 3: Start background expiry sweep ────────────────────
    let reclaimer_handle = if config.reclaimer.active {
        let reclaimer = lease_manager.reclaimer();
        let interval = config.reclaimer.sweep_interval();
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            reclaimer.run(interval, cancel).await;
        }))
    } else {
        tracing::info!("Active expiry sweep disabled; leases are reclaimed on access");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = config.server.bind_address();

    let app_state = boxoffice_api::AppState::new(Arc::new(config), Arc::clone(&lease_manager));
    let app = boxoffice_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Box Office listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    if let Some(handle) = reclaimer_handle {
        tracing::info!("Waiting for expiry reclaimer to stop...");
        let _ = tokio::time::timeout(grace, handle).await;
    }

    tracing::info!("Box Office shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
