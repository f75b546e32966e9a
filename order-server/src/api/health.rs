//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "connections": 3, "current_sequence": 42 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    /// 当前 WebSocket 连接数
    connections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_sequence: Option<u64>,
}

/// GET /health
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let stats = state.orders.stats();
    if let Err(e) = &stats {
        tracing::warn!(error = %e, "Health check could not read storage");
    }

    Json(HealthResponse {
        status: if stats.is_ok() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        connections: state.hub.connection_count(),
        current_sequence: stats.ok().map(|s| s.current_sequence),
    })
}
