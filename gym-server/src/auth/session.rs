//! Token revocation list
//!
//! Logout records the token id until the token would have expired anyway.

use dashmap::DashMap;
use serde::Serialize;

use super::Claims;

/// Session attached to an authenticated request
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSession {
    pub username: String,
    #[serde(skip)]
    pub jti: String,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: i64,
}

impl From<Claims> for CurrentSession {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            jti: claims.jti,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// jti -> expiry (Unix seconds)
#[derive(Debug, Default)]
pub struct RevokedTokens {
    entries: DashMap<String, i64>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: &str, expires_at: i64) {
        self.entries.insert(jti.to_string(), expires_at);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries.contains_key(jti)
    }

    /// Drop entries whose token has expired; returns how many were removed.
    pub fn prune(&self, now_secs: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, exp| *exp > now_secs);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
