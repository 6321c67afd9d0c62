//! Digest API 模块 (销售日报预览/发送)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/digest", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/preview", get(handler::preview))
        .route("/send", post(handler::send))
}
