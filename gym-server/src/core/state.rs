//! Server state
//!
//! Everything a request handler needs, cheap to clone: the pool and the
//! lock registry are shared, the auth services sit behind `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter, RevokedTokens, SharedCredential};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::services::ClientLocks;

/// How often expired rate-limit windows, revocations and idle locks are dropped
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

/// Shared server state
///
/// | Field | Purpose |
/// |-------|---------|
/// | pool | SQLite connection pool |
/// | jwt_service | token issue / validation |
/// | revoked_tokens | logout revocation list |
/// | rate_limiter | login throttle |
/// | client_locks | per-client write serialization |
/// | credential | hashed operator login |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub revoked_tokens: Arc<RevokedTokens>,
    pub rate_limiter: RateLimiter,
    pub client_locks: Arc<ClientLocks>,
    pub credential: Arc<SharedCredential>,
    pub started_at: Instant,
}

impl ServerState {
    /// Open the database, apply migrations and hash the operator password.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = if config.is_in_memory() {
            DbService::in_memory().await?
        } else {
            DbService::new(&config.database_path).await?
        };

        let credential = SharedCredential::from_plaintext(&config.auth_user, &config.auth_pass)?;

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            revoked_tokens: Arc::new(RevokedTokens::new()),
            rate_limiter: RateLimiter::new(),
            client_locks: Arc::new(ClientLocks::new()),
            credential: Arc::new(credential),
            started_at: Instant::now(),
        })
    }

    /// Spawn periodic housekeeping
    pub fn start_background_tasks(&self) {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HOUSEKEEPING_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                state.housekeeping().await;
            }
        });
        tracing::debug!("Background housekeeping started");
    }

    async fn housekeeping(&self) {
        self.rate_limiter.cleanup().await;
        let revoked = self
            .revoked_tokens
            .prune(chrono::Utc::now().timestamp());
        let locks = self.client_locks.prune();
        if revoked > 0 || locks > 0 {
            tracing::debug!(revoked, locks, "Housekeeping pruned entries");
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
