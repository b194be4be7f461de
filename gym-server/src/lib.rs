//! Gym Server - membership, payment and attendance service for a single gym
//!
//! # Architecture
//!
//! - **Ledger** (`ledger`): pure rules for coverage periods, promotions,
//!   payment overlap, name-change cooldown and check-in gating
//! - **Database** (`db`): SQLite via sqlx, one repository module per table
//! - **Services** (`services`): per-client locking + transactions around the ledger
//! - **Audit** (`audit`): snapshot log and structured field changelog
//! - **Auth** (`auth`): shared credential (argon2) + JWT sessions
//! - **HTTP API** (`api`): axum routers, one module per resource
//!
//! # Layout
//!
//! ```text
//! gym-server/src/
//! ├── core/       # config, state, server, startup errors
//! ├── auth/       # credential, JWT, revocation, rate limit
//! ├── ledger/     # business rules, no I/O
//! ├── db/         # pool, migrations, repositories
//! ├── services/   # write orchestration
//! ├── audit/      # history writer
//! ├── api/        # routes and handlers
//! └── utils/      # logger, time parsing, validation
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod services;
pub mod utils;

// Re-exports
pub use auth::{JwtService, SharedCredential};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Security event under the `security` target
///
/// ```ignore
/// security_log!(WARN, "auth_failed", ip = %ip, uri = %uri);
/// ```
#[macro_export]
macro_rules! security_log {
    ($level:ident, $event:expr $(, $($fields:tt)*)?) => {
        tracing::event!(
            target: "security",
            tracing::Level::$level,
            event = $event
            $(, $($fields)*)?
        )
    };
}
