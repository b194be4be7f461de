//! Payment API
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /api/payments | GET, POST | latest payments / create |
//! | /api/payments/{id} | GET, PUT, DELETE | fetch / partial update / soft delete |
//! | /api/payments/{id}/history | GET | snapshot log |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/history", get(handler::history))
}
