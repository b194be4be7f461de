//! Client API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use shared::models::{
    Client, ClientCreate, ClientUpdate, EntityKind, FieldChangeRecord, HistoryEntry, PaymentDetail,
};

use crate::api::{HISTORY_LIMIT, IncludeDeleted};
use crate::core::ServerState;
use crate::db::repository::{client, history, payment};
use crate::ledger::LedgerError;
use crate::services::ClientService;
use crate::utils::{AppError, AppResult};

/// GET /api/clients
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<IncludeDeleted>,
) -> AppResult<Json<Vec<Client>>> {
    let clients = client::find_all(&state.pool, query.enabled()).await?;
    Ok(Json(clients))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<IncludeDeleted>,
) -> AppResult<Json<Client>> {
    let found = client::find_by_id(&state.pool, id)
        .await?
        .filter(|c| query.enabled() || c.deleted_at.is_none())
        .ok_or_else(|| client_not_found(id))?;
    Ok(Json(found))
}

/// POST /api/clients
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let created = ClientService::new(&state.pool, &state.client_locks)
        .create(payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/clients/{id} - absent fields keep their value
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<Client>> {
    let updated = ClientService::new(&state.pool, &state.client_locks)
        .update(id, payload, Utc::now())
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/clients/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    let deleted = ClientService::new(&state.pool, &state.client_locks)
        .delete(id, Utc::now())
        .await?;
    Ok(Json(deleted))
}

/// GET /api/clients/{id}/history - newest first
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    ensure_known(&state, id).await?;
    let entries = history::list_snapshots(&state.pool, EntityKind::Client, id, HISTORY_LIMIT).await?;
    Ok(Json(entries))
}

/// GET /api/clients/{id}/changes - newest first
pub async fn changes(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<FieldChangeRecord>>> {
    ensure_known(&state, id).await?;
    let rows = history::list_field_changes(&state.pool, EntityKind::Client, id).await?;
    Ok(Json(rows))
}

/// GET /api/clients/{id}/payments
pub async fn payments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PaymentDetail>>> {
    ensure_known(&state, id).await?;
    let rows = payment::find_by_client(&state.pool, id).await?;
    Ok(Json(rows))
}

/// History stays readable after a soft delete
async fn ensure_known(state: &ServerState, id: i64) -> AppResult<()> {
    client::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| client_not_found(id))
}

fn client_not_found(id: i64) -> AppError {
    LedgerError::ClientNotFound(id).into()
}
