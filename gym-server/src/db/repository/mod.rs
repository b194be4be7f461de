//! Repository Module
//!
//! One module of free async functions per table. Every function takes a
//! generic executor so it runs on the pool or inside a transaction.

pub mod attendance;
pub mod client;
pub mod coach;
pub mod history;
pub mod payment;
pub mod promotion;
pub mod statistics;

use shared::error::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation; carries the database message
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl RepoError {
    /// Column named by a `UNIQUE constraint failed: table.column` message
    pub fn duplicate_column(&self) -> Option<&str> {
        match self {
            RepoError::Duplicate(msg) => msg
                .rsplit(": ")
                .next()
                .and_then(|target| target.split(',').next())
                .and_then(|col| col.trim().split('.').nth(1)),
            _ => None,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(shared::error::ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => {
                AppError::with_message(shared::error::ErrorCode::AlreadyExists, msg)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository error");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
