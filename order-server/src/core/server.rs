//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::{Result, ServerState};

/// HTTP Server
pub struct Server {
    state: ServerState,
}

impl Server {
    /// Create server from an initialized state
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// 启动 HTTP 服务，直到收到 Ctrl-C / SIGTERM
    pub async fn run(&self) -> Result<()> {
        let state = self.state.clone();
        let tasks = state.start_background_tasks();

        let app = api::build_app(state.clone());
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🍖 Order server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tasks.shutdown().await;
        state.pool.close().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down...");
}
