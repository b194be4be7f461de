//! Shared types for the gym management service
//!
//! Error system, entity models and small utilities used by the server
//! and by any client that talks to its HTTP API.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
