//! Order API Module
//!
//! Reads go straight to the repository. Every write goes through the
//! lifecycle manager so settlement archival cannot be bypassed.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
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
        // Archive records of one order
        .route("/{id}/history", get(handler::history))
}
