//! Attendance API

mod handler;

use axum::{Router, routing::{delete, get}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::check_in))
        .route("/{id}", delete(handler::delete))
}
