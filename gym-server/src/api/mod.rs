//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and database checks (public)
//! - [`auth`] - login, logout, session
//! - [`clients`] - client registry, history, payments per client
//! - [`coaches`] - coach registry
//! - [`promotions`] - promotions
//! - [`payments`] - payments
//! - [`attendance`] - check-ins
//! - [`statistics`] - dashboard figures
//!
//! Everything under `/api/` except login requires a bearer token.

pub mod attendance;
pub mod auth;
pub mod clients;
pub mod coaches;
pub mod health;
pub mod payments;
pub mod promotions;
pub mod statistics;

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

/// Snapshot rows returned by a `/history` route
pub const HISTORY_LIMIT: i64 = 200;

/// `?include_deleted=1` (also accepts `true`)
#[derive(Debug, Default, Deserialize)]
pub struct IncludeDeleted {
    include_deleted: Option<String>,
}

impl IncludeDeleted {
    pub fn enabled(&self) -> bool {
        matches!(
            self.include_deleted.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("yes")
        )
    }
}

/// Access log: `METHOD URI STATUS` under target `http_access`
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Routes with their route-level layers; no global middleware, no state
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(clients::router())
        .merge(coaches::router())
        .merge(promotions::router())
        .merge(payments::router())
        .merge(attendance::router())
        .merge(statistics::router())
}

/// Fully layered application, used by the server and the integration tests
pub fn build_app(state: ServerState) -> Router {
    let router = build_router(&state);
    with_global_layers(router, state)
}

/// Auth gate, timeout (408), CORS and access log around `router`
fn with_global_layers(router: Router<ServerState>, state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    router
        // require_auth skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
