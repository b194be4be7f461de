//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::{CurrentSession, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Require a valid, unrevoked bearer token.
///
/// On success the [`CurrentSession`] is inserted into the request extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - paths outside `/api/`
/// - `/api/auth/login`
///
/// # Errors
///
/// | Case | Code |
/// |------|------|
/// | no Authorization header | NotAuthenticated |
/// | expired token | TokenExpired |
/// | bad token | TokenInvalid |
/// | logged-out token | SessionRevoked |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || path == "/api/auth/login"
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %req.uri());
            return Err(AppError::not_authenticated());
        }
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    if state.revoked_tokens.is_revoked(&claims.jti) {
        security_log!(WARN, "auth_revoked", username = %claims.username, uri = %req.uri());
        return Err(AppError::new(ErrorCode::SessionRevoked));
    }

    req.extensions_mut().insert(CurrentSession::from(claims));
    Ok(next.run(req).await)
}
