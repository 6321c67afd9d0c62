//! Statistics API 模块 (数据统计)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stats", get(handler::get_stats))
}
