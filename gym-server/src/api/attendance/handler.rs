//! Attendance API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use shared::models::{Attendance, AttendanceCreate, AttendanceWithClient};

use crate::core::ServerState;
use crate::db::repository::attendance;
use crate::ledger::utc_day_bounds;
use crate::services::AttendanceService;
use crate::utils::time::day_start;
use crate::utils::{ApiResponse, AppError, AppResult};

/// UTC day selector; missing parts default to today's
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DayQuery {
    fn resolve(&self, today: NaiveDate) -> AppResult<NaiveDate> {
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.unwrap_or_else(|| today.month());
        let day = self.day.unwrap_or_else(|| today.day());
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AppError::invalid_field("day", format!("{year:04}-{month:02}-{day:02} is not a date"))
        })
    }
}

/// GET /api/attendance?year=&month=&day= - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<AttendanceWithClient>>> {
    let date = query.resolve(Utc::now().date_naive())?;
    let (from, to) = utc_day_bounds(day_start(date));
    let rows =
        attendance::find_between(&state.pool, from.timestamp_millis(), to.timestamp_millis()).await?;
    Ok(Json(rows))
}

/// POST /api/attendance
pub async fn check_in(
    State(state): State<ServerState>,
    Json(payload): Json<AttendanceCreate>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    let created = AttendanceService::new(&state.pool, &state.client_locks)
        .check_in(payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/attendance/{id} - hard delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse> {
    AttendanceService::new(&state.pool, &state.client_locks)
        .delete(id)
        .await?;
    Ok(ApiResponse::ok())
}
