//! Statistics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::models::StatisticsOverview;

use crate::core::ServerState;
use crate::services::statistics::{self, Window};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    /// YYYY-MM-DD, default today (UTC)
    pub day: Option<String>,
    /// Year of the monthly series, default the current one
    pub year: Option<i32>,
}

/// GET /api/statistics/overview?day=&year=
pub async fn overview(
    State(state): State<ServerState>,
    Query(query): Query<OverviewQuery>,
) -> AppResult<Json<StatisticsOverview>> {
    let day = match query.day.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::invalid_field("day", format!("Expected YYYY-MM-DD, got {raw}"))
        })?),
        None => None,
    };

    let window = Window::new(Utc::now(), day, query.year);
    let overview = statistics::overview(&state.pool, window).await?;
    Ok(Json(overview))
}
