//! # Sale Handlers
//!
//! CRUD, filtered listing and summary over `/api/sales`.
//!
//! ## Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PATCH /api/sales/{id}  { "amount_received_cents": 12000 }              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleRepository::get_by_id ──── none ───► 404 NOT_FOUND                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleReconciler::reconcile ──── rejected ─► 400 / 404, nothing written  │
//! │       │                                                                 │
//! │       ▼  SaleUpdate                                                     │
//! │  SaleRepository::apply_update (one UPDATE, only supplied columns)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 + full sale                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use margin_core::{CoreError, NewSale, Sale, SaleChanges, SaleFilter, SalesSummary};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/sales?status=&origin_channel=&platform_id=&from=&to=&sort_by=&order=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SaleFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(filter) = query?;
    let sales = state.db.sales().list(&filter).await?;
    Ok(Json(sales))
}

/// `GET /api/sales/summary` with the same filters as [`list`].
pub async fn summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SaleFilter>, QueryRejection>,
) -> ApiResult<Json<SalesSummary>> {
    let Query(filter) = query?;
    let summary = state.db.sales().summary(&filter).await?;
    Ok(Json(summary))
}

/// `POST /api/sales`
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(input) = payload?;
    let platforms = state.db.platforms();

    let sale = state
        .reconciler
        .create(input, &platforms, Uuid::new_v4().to_string(), Utc::now())
        .await?;

    state.db.sales().insert(&sale).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /api/sales/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::SaleNotFound(id))?;

    Ok(Json(sale))
}

/// `PUT`/`PATCH /api/sales/{id}`: reconcile, then persist the result.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SaleChanges>, JsonRejection>,
) -> ApiResult<Json<Sale>> {
    let Json(changes) = payload?;
    let sales = state.db.sales();

    let existing = sales
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.clone()))?;

    let update = state
        .reconciler
        .reconcile(&existing, &changes, &state.db.platforms())
        .await?;

    if update.is_empty() {
        debug!(id = %id, "Empty update, nothing to write");
        return Ok(Json(existing));
    }

    let sale = sales.apply_update(&id, &update, Utc::now()).await?;
    if update.recalculated.is_some() {
        info!(
            id = %id,
            net_profit = %sale.net_profit(),
            margin = %sale.profit_margin(),
            "Sale figures recalculated"
        );
    }

    Ok(Json(sale))
}

/// `DELETE /api/sales/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
