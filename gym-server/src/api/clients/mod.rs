//! Client API
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /api/clients | GET, POST | list (`?include_deleted=1`) / create |
//! | /api/clients/{id} | GET, PUT, DELETE | fetch / partial update / soft delete |
//! | /api/clients/{id}/history | GET | snapshot log |
//! | /api/clients/{id}/changes | GET | field changelog |
//! | /api/clients/{id}/payments | GET | the client's payments |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/clients", routes())
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
        .route("/{id}/changes", get(handler::changes))
        .route("/{id}/payments", get(handler::payments))
}
