//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单接口
//! - [`items`] - 菜品状态接口 (厨房)
//! - [`ws`] - 实时推送连接

pub mod health;
pub mod items;
pub mod orders;
pub mod ws;

use axum::{Router, middleware};
use http::HeaderMap;
use shared::order::{COMMAND_ID_HEADER, OrderCommand, OrderCommandPayload, OrderItem, OrderSnapshot};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CurrentUser, attach_user, permissions};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(items::router())
        .merge(ws::router())
}

/// Build the full application with state and tower middleware
pub fn build_router(state: ServerState) -> Router {
    let timeout = state.config.request_timeout();

    build_app()
        // 可选认证 - 携带令牌时必须有效
        .layer(middleware::from_fn_with_state(state.clone(), attach_user))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build a ledger command for the caller
///
/// An `X-Command-Id` header replaces the generated command id.
pub(crate) fn command(
    headers: &HeaderMap,
    user: Option<&CurrentUser>,
    payload: OrderCommandPayload,
) -> OrderCommand {
    let (operator_id, role) = permissions::operator(user);
    let cmd = OrderCommand::new(operator_id, role, payload);

    match headers
        .get(COMMAND_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(id) => cmd.with_command_id(id),
        None => cmd,
    }
}

/// Run an order command off the async runtime
pub(crate) async fn execute(state: &ServerState, cmd: OrderCommand) -> AppResult<OrderSnapshot> {
    let orders = state.orders.clone();
    tokio::task::spawn_blocking(move || orders.execute_command(cmd))
        .await
        .map_err(|e| AppError::Internal(format!("Command task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Run an item command off the async runtime
pub(crate) async fn execute_item(state: &ServerState, cmd: OrderCommand) -> AppResult<OrderItem> {
    let orders = state.orders.clone();
    tokio::task::spawn_blocking(move || orders.execute_item_command(cmd))
        .await
        .map_err(|e| AppError::Internal(format!("Command task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Load an order or fail with 404
pub(crate) fn load_order(state: &ServerState, order_id: &str) -> AppResult<OrderSnapshot> {
    Ok(state.orders.get_order(order_id)?)
}
