//! # Margin API Server
//!
//! REST server for the sales tracker.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Parse --config <path>                                               │
//! │  2. Load ApiConfig (defaults → file → environment)                      │
//! │  3. Initialize tracing                                                  │
//! │  4. Open SQLite pool + run migrations                                   │
//! │  5. Seed default platforms (empty table only)                           │
//! │  6. Serve until Ctrl+C / SIGTERM                                        │
//! │  7. Close the pool                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use margin_api::{init_tracing, router, ApiConfig, AppState};
use margin_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = parse_config_arg();

    let config = ApiConfig::load(config_path).context("loading configuration")?;
    init_tracing(&config.log.filter);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database.path.display(),
        "Starting Margin API server..."
    );

    let db = Database::new(
        DbConfig::new(&config.database.path)
            .max_connections(config.database.max_connections)
            .connect_timeout(config.database.connect_timeout()),
    )
    .await
    .context("opening database")?;

    if config.database.seed_default_platforms {
        let inserted = db.platforms().seed_defaults_if_empty().await?;
        if inserted > 0 {
            info!(count = inserted, "Default platforms inserted");
        }
    }

    let state = Arc::new(AppState::new(db.clone()));
    let app = router(state);

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Reads `--config <path>` / `-c <path>` from the command line.
fn parse_config_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => return args.get(i + 1).map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }

    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
