//! Authentication Handlers

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use shared::models::{LoginRequest, LoginResponse, SessionInfo};

use crate::auth::CurrentSession;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult};

/// POST /api/auth/login
///
/// Every attempt waits `LOGIN_DELAY_MS` first; a wrong username and a wrong
/// password give the same answer.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    if !state.credential.verify(&req.username, &req.password) {
        security_log!(WARN, "login_failed", username = %req.username);
        return Err(AppError::invalid_credentials());
    }

    let (token, claims) = state.jwt_service.generate_token(&req.username).map_err(|e| {
        tracing::error!(error = %e, "Token generation failed");
        AppError::internal("Failed to issue token")
    })?;

    security_log!(INFO, "login_success", username = %claims.username, jti = %claims.jti);

    Ok(Json(LoginResponse {
        token,
        expires_at: claims.exp * 1000,
        username: claims.username,
    }))
}

/// POST /api/auth/logout - revoke the presented token
pub async fn logout(
    State(state): State<ServerState>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResponse {
    state.revoked_tokens.revoke(&session.jti, session.expires_at);
    security_log!(INFO, "logout", username = %session.username);
    ApiResponse::ok()
}

/// GET /api/auth/me
pub async fn me(Extension(session): Extension<CurrentSession>) -> Json<SessionInfo> {
    Json(SessionInfo {
        username: session.username,
        issued_at: session.issued_at * 1000,
        expires_at: session.expires_at * 1000,
    })
}
