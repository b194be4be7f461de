//! Promotion API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use shared::models::{EntityKind, HistoryEntry, Promotion, PromotionCreate, PromotionUpdate};

use crate::api::HISTORY_LIMIT;
use crate::core::ServerState;
use crate::db::repository::{history, promotion};
use crate::services::PromotionService;
use crate::services::promotions::promotion_not_found;
use crate::utils::AppResult;

/// GET /api/promotions
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Promotion>>> {
    let promotions = promotion::find_all(&state.pool).await?;
    Ok(Json(promotions))
}

/// GET /api/promotions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Promotion>> {
    let found = promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| promotion_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/promotions
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PromotionCreate>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    let created = PromotionService::new(&state.pool)
        .create(payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/promotions/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PromotionUpdate>,
) -> AppResult<Json<Promotion>> {
    let updated = PromotionService::new(&state.pool)
        .update(id, payload, Utc::now())
        .await?;
    Ok(Json(updated))
}

/// GET /api/promotions/{id}/history
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| promotion_not_found(id))?;
    let entries =
        history::list_snapshots(&state.pool, EntityKind::Promotion, id, HISTORY_LIMIT).await?;
    Ok(Json(entries))
}
