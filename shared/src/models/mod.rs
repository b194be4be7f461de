//! Data models
//!
//! Shared between the server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64`; all instants are Unix millis (UTC).

pub mod attendance;
pub mod auth;
pub mod client;
pub mod coach;
pub mod history;
pub mod payment;
pub mod promotion;
pub mod statistics;

// Re-exports
pub use attendance::*;
pub use auth::*;
pub use client::*;
pub use coach::*;
pub use history::*;
pub use payment::*;
pub use promotion::*;
pub use statistics::*;
