//! # Platform Handlers
//!
//! CRUD over `/api/platforms`.
//!
//! Editing a platform's fee or commission leaves existing sales alone; they
//! pick the new figures up the next time their financials are edited.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use margin_core::validation::{validate_new_platform, validate_platform_changes};
use margin_core::{CoreError, NewPlatform, Platform, PlatformChanges};
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/platforms`
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Platform>>> {
    let platforms = state.db.platforms().list().await?;
    Ok(Json(platforms))
}

/// `POST /api/platforms`
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPlatform>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Platform>)> {
    let Json(input) = payload?;
    let valid = validate_new_platform(&input)?;

    let platform = state.db.platforms().insert(valid).await?;
    Ok((StatusCode::CREATED, Json(platform)))
}

/// `GET /api/platforms/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Platform>> {
    let platform = state
        .db
        .platforms()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::PlatformNotFound(id))?;

    Ok(Json(platform))
}

/// `PUT /api/platforms/{id}`: only supplied fields change.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PlatformChanges>, JsonRejection>,
) -> ApiResult<Json<Platform>> {
    let Json(changes) = payload?;
    let changes = validate_platform_changes(&changes)?;

    debug!(id = %id, "Updating platform");
    let platform = state.db.platforms().update(&id, &changes).await?;
    Ok(Json(platform))
}

/// `DELETE /api/platforms/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.platforms().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
