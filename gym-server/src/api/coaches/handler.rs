//! Coach API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use shared::models::{Coach, CoachCreate, CoachUpdate, EntityKind, HistoryEntry};

use crate::api::{HISTORY_LIMIT, IncludeDeleted};
use crate::core::ServerState;
use crate::db::repository::{coach, history};
use crate::services::CoachService;
use crate::services::coaches::coach_not_found;
use crate::utils::AppResult;

/// GET /api/coaches
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<IncludeDeleted>,
) -> AppResult<Json<Vec<Coach>>> {
    let coaches = coach::find_all(&state.pool, query.enabled()).await?;
    Ok(Json(coaches))
}

/// GET /api/coaches/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<IncludeDeleted>,
) -> AppResult<Json<Coach>> {
    let found = coach::find_by_id(&state.pool, id)
        .await?
        .filter(|c| query.enabled() || c.deleted_at.is_none())
        .ok_or_else(|| coach_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/coaches
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CoachCreate>,
) -> AppResult<(StatusCode, Json<Coach>)> {
    let created = CoachService::new(&state.pool).create(payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/coaches/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CoachUpdate>,
) -> AppResult<Json<Coach>> {
    let updated = CoachService::new(&state.pool)
        .update(id, payload, Utc::now())
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/coaches/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Coach>> {
    let deleted = CoachService::new(&state.pool).delete(id, Utc::now()).await?;
    Ok(Json(deleted))
}

/// GET /api/coaches/{id}/history
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    coach::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| coach_not_found(id))?;
    let entries = history::list_snapshots(&state.pool, EntityKind::Coach, id, HISTORY_LIMIT).await?;
    Ok(Json(entries))
}
