//! Core: configuration, shared state, server lifecycle, startup errors
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - handles shared by every request
//! - [`Server`] - HTTP listener and graceful shutdown
//! - [`ServerError`] - startup failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
