//! Item API Module (kitchen)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/items/{item_id}/status | PUT | 推进菜品状态 |
//! | /api/items/{item_id}/ready | POST | 标记出餐 |

mod handler;

use axum::{
    Router, middleware,
    routing::{post, put},
};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{item_id}/status", put(handler::set_status))
        .route("/{item_id}/ready", post(handler::mark_ready))
        .layer(middleware::from_fn(require_role(
            "kitchen",
            permissions::is_kitchen,
        )))
}
