//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单 CRUD 与单个订单的归档记录
//! - [`history`] - 归档列表与区间汇总
//! - [`stats`] - 实时统计
//! - [`digest`] - 销售日报预览/发送

pub mod digest;
pub mod health;
pub mod history;
pub mod orders;
pub mod stats;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::AppResult;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(history::router())
        .merge(stats::router())
        .merge(digest::router())
}

/// Build a fully configured application with middleware and state
///
/// Used by both the HTTP server and in-process (oneshot) tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
