//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use shared::models::{EntityKind, HistoryEntry, Payment, PaymentCreate, PaymentDetail, PaymentUpdate};

use crate::api::HISTORY_LIMIT;
use crate::core::ServerState;
use crate::db::repository::{history, payment};
use crate::services::PaymentService;
use crate::services::payments::payment_not_found;
use crate::utils::AppResult;

/// Rows returned by the list endpoint
const RECENT_LIMIT: i64 = 100;

/// GET /api/payments - most recently recorded first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<PaymentDetail>>> {
    let payments = payment::find_recent(&state.pool, RECENT_LIMIT).await?;
    Ok(Json(payments))
}

/// GET /api/payments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PaymentDetail>> {
    let found = payment::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| payment_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/payments
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let created = PaymentService::new(&state.pool, &state.client_locks)
        .create(payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/payments/{id} - partial update, overlap re-checked when the interval moves
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<Payment>> {
    let updated = PaymentService::new(&state.pool, &state.client_locks)
        .update(id, payload, Utc::now())
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/payments/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Payment>> {
    let deleted = PaymentService::new(&state.pool, &state.client_locks)
        .delete(id, Utc::now())
        .await?;
    Ok(Json(deleted))
}

/// GET /api/payments/{id}/history
///
/// Deleted payments keep their log, so existence is judged by the log itself.
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = history::list_snapshots(&state.pool, EntityKind::Payment, id, HISTORY_LIMIT).await?;
    if entries.is_empty() {
        return Err(payment_not_found(id));
    }
    Ok(Json(entries))
}
