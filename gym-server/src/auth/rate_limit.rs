//! Fixed-window rate limiting for the login route

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::core::ServerState;
use crate::security_log;

/// Login attempts allowed per window and IP
pub const LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    /// route -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request; `false` once the window's budget is spent.
    pub async fn check(&self, route: &'static str, ip: &str, max_requests: u32, window: Duration) -> bool {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        let entry = map
            .entry(route)
            .or_default()
            .entry(ip.to_owned())
            .or_insert_with(|| IpEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Forget windows older than five minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = Duration::from_secs(300);
        let now = Instant::now();
        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP: first `X-Forwarded-For` entry, then the peer address.
pub fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
        && !first.trim().is_empty()
    {
        return first.trim().to_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Login: [`LOGIN_MAX_ATTEMPTS`] per [`LOGIN_WINDOW`] per IP
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);
    if !state
        .rate_limiter
        .check("login", &ip, LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW)
        .await
    {
        security_log!(WARN, "login_rate_limited", ip = %ip);
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(next.run(request).await)
}
