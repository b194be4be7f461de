use std::path::Path;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

/// Path value selecting a private in-memory database
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | working directory (db, logs) |
/// | DATABASE_PATH | `<WORK_DIR>/gym.db` | SQLite file, `:memory:` for a throwaway db |
/// | HTTP_PORT | 3000 | listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | AUTH_USER | admin | shared login name |
/// | AUTH_PASS | admin123 (development only) | shared password |
/// | LOGIN_DELAY_MS | 300 | fixed delay on every login attempt |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | LOG_LEVEL / LOG_JSON / LOG_DIR | info / false / unset | logger |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub auth_user: String,
    /// Plaintext only lives here until the state hashes it
    pub auth_pass: String,
    pub jwt: JwtConfig,
    pub login_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Outside development `AUTH_PASS` and `JWT_SECRET` must be set.
    pub fn from_env() -> Result<Self> {
        let environment = env_or("ENVIRONMENT", "development");
        let development = environment == "development";

        let work_dir = env_or("WORK_DIR", "./data");
        let default_db = Path::new(&work_dir).join("gym.db");
        let database_path = env_or("DATABASE_PATH", &default_db.to_string_lossy());

        let auth_pass = match std::env::var("AUTH_PASS").ok().filter(|p| !p.is_empty()) {
            Some(pass) => pass,
            None if development => {
                tracing::warn!("AUTH_PASS not set, using the development password");
                "admin123".to_string()
            }
            None => {
                return Err(ServerError::Config(format!(
                    "AUTH_PASS must be set when ENVIRONMENT={environment}"
                )));
            }
        };

        Ok(Self {
            jwt: JwtConfig::from_env(development)?,
            work_dir,
            database_path,
            http_port: env_parse("HTTP_PORT", 3000),
            environment,
            auth_user: env_or("AUTH_USER", "admin"),
            auth_pass,
            login_delay_ms: env_parse("LOGIN_DELAY_MS", 300),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
        })
    }

    /// In-memory database, fixed credentials, no login delay.
    ///
    /// Used by tests and local experiments.
    pub fn in_memory(auth_user: &str, auth_pass: &str) -> Self {
        Self {
            work_dir: ".".to_string(),
            database_path: IN_MEMORY_DATABASE.to_string(),
            http_port: 0,
            environment: "development".to_string(),
            auth_user: auth_user.to_string(),
            auth_pass: auth_pass.to_string(),
            jwt: JwtConfig::with_secret("in-memory-test-secret-0123456789abcdef"),
            login_delay_ms: 0,
            request_timeout_ms: 30_000,
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY_DATABASE
    }
}
