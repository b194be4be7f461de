//! Health check routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//! | /health/detailed | GET | none |

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// Tables reported by the detailed check, in schema order
const TABLES: [&str; 10] = [
    "client",
    "coach",
    "promotion",
    "payment",
    "attendance",
    "client_history",
    "coach_history",
    "payment_history",
    "promotion_history",
    "field_change",
];

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    database: DatabaseCheck,
}

#[derive(Serialize)]
pub struct DatabaseCheck {
    /// ok | error
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    tables: Vec<String>,
    row_counts: BTreeMap<&'static str, i64>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let database = check_database(&state).await;
    Json(DetailedHealthResponse {
        status: if database.status == "ok" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        database,
    })
}

async fn check_database(state: &ServerState) -> DatabaseCheck {
    let started = std::time::Instant::now();
    if let Err(e) = sqlx::query("SELECT 1").execute(&state.pool).await {
        tracing::error!(error = %e, "Health check: database ping failed");
        return DatabaseCheck {
            status: "error",
            latency_ms: None,
            message: Some("Database unreachable".to_string()),
            tables: Vec::new(),
            row_counts: BTreeMap::new(),
        };
    }
    let latency_ms = started.elapsed().as_millis() as u64;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         AND name NOT LIKE '_sqlx_%' ORDER BY name",
    )
    .fetch_all(&state.pool)
    .await
    .unwrap_or_default();

    let mut row_counts = BTreeMap::new();
    for table in TABLES {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        match sqlx::query_scalar::<_, i64>(&sql).fetch_one(&state.pool).await {
            Ok(count) => {
                row_counts.insert(table, count);
            }
            Err(e) => tracing::warn!(table, error = %e, "Health check: row count failed"),
        }
    }

    DatabaseCheck {
        status: "ok",
        latency_ms: Some(latency_ms),
        message: None,
        tables,
        row_counts,
    }
}
