//! # Margin API Library
//!
//! REST server for the sales tracker. The binary in `main.rs` loads the
//! configuration, opens the database and serves [`router`].
//!
//! ## Module Organization
//! ```text
//! margin_api/
//! ├── lib.rs          ◄─── You are here (state, router, tracing)
//! ├── config.rs       ◄─── margin.toml + environment overrides
//! ├── error.rs        ◄─── ApiError → JSON + status code
//! └── handlers/
//!     ├── mod.rs      ◄─── Handler exports
//!     ├── health.rs   ◄─── GET /health
//!     ├── platforms.rs◄─── /api/platforms CRUD
//!     └── sales.rs    ◄─── /api/sales CRUD, filters, summary, reconcile
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Browser ──► TraceLayer ──► CatchPanicLayer ──► Router ──► handler      │
//! │                                          │                              │
//! │                     ┌────────────────────┼────────────────────┐         │
//! │                     ▼                    ▼                    ▼         │
//! │              SaleReconciler      SaleRepository     PlatformRepository  │
//! │              (margin-core)        (margin-db)         (margin-db)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use margin_core::SaleReconciler;
use margin_db::Database;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub reconciler: SaleReconciler,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            reconciler: SaleReconciler::new(),
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/platforms",
            get(handlers::platforms::list).post(handlers::platforms::create),
        )
        .route(
            "/api/platforms/{id}",
            get(handlers::platforms::get)
                .put(handlers::platforms::update)
                .delete(handlers::platforms::delete),
        )
        .route(
            "/api/sales",
            get(handlers::sales::list).post(handlers::sales::create),
        )
        .route("/api/sales/summary", get(handlers::sales::summary))
        .route(
            "/api/sales/{id}",
            get(handlers::sales::get)
                .put(handlers::sales::update)
                .patch(handlers::sales::update)
                .delete(handlers::sales::delete),
        )
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initializes the logging/tracing system.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
