//! Order API Module
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /api/orders | POST | 下单 | 任何人 (无令牌为访客) |
//! | /api/orders | GET | 按状态列出订单 | 员工 / 厨房 |
//! | /api/orders/{id} | GET | 订单详情 | 员工或订单所有者 |
//! | /api/orders/{id}/events | GET | 事件流 | 服务员 |
//! | /api/orders/{id}/items | POST | 加菜 | 订单所有者 |
//! | /api/orders/{id}/items/{item_id} | DELETE | 退菜 | 订单所有者 |
//! | /api/orders/{id}/resubmit | POST | 重新提交 | 订单所有者 |
//! | /api/orders/{id}/status | PUT | 修改状态 | 服务员 (所有者可取消待审订单) |
//! | /api/orders/{id}/staff-response | POST | 审核 | 服务员 |
//! | /api/orders/{id}/confirm | POST | 顾客确认 | 订单所有者 |
//! | /api/orders/{id}/start-preparing | POST | 开始制作 | 厨房 |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{permissions, require_role};
use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // Owner and guest access is checked per order inside the handlers
    let open_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/items/{item_id}", delete(handler::cancel_item))
        .route("/{id}/resubmit", post(handler::resubmit))
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/confirm", post(handler::confirm));

    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_role("staff", permissions::is_staff)));

    let floor_routes = Router::new()
        .route("/{id}/events", get(handler::events))
        .route("/{id}/staff-response", post(handler::staff_response))
        .layer(middleware::from_fn(require_role(
            "waiter",
            permissions::is_floor_staff,
        )));

    let kitchen_routes = Router::new()
        .route("/{id}/start-preparing", post(handler::start_preparing))
        .layer(middleware::from_fn(require_role(
            "kitchen",
            permissions::is_kitchen,
        )));

    open_routes
        .merge(staff_routes)
        .merge(floor_routes)
        .merge(kitchen_routes)
}
