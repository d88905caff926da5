//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use margin_db::migrations;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// Reports liveness. Answers 503 with `"degraded"` when the database is
/// unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let connected = state.db.health_check().await;

    let (migrations_total, migrations_applied) = if connected {
        migrations::migration_status(state.db.pool())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read migration status");
                (0, 0)
            })
    } else {
        (0, 0)
    };

    let (code, status) = if connected {
        (StatusCode::OK, "ok")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: DatabaseHealth {
                connected,
                migrations_applied,
                migrations_total,
            },
        }),
    )
}
