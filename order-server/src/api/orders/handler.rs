//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::HeaderMap;
use shared::ApiResponse;
use shared::Role;
use shared::order::{
    AddItemsRequest, CreateOrderRequest, ItemChanges, ListOrdersQuery, OrderCommandPayload,
    OrderEvent, OrderSnapshot, SetOrderStatusRequest, StaffResponseRequest,
};

use crate::api::{command, execute, load_order};
use crate::auth::CurrentUser;
use crate::auth::permissions::{ensure_may_set_status, ensure_order_access, ensure_order_owner};
use crate::core::ServerState;
use crate::utils::{AppResult, ok};

type OrderResponse = AppResult<Json<ApiResponse<OrderSnapshot>>>;

/// POST /api/orders - 下单
///
/// Registered customers own the order they create; everyone else creates a
/// guest order.
pub async fn create(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> OrderResponse {
    let customer_id = user
        .as_ref()
        .filter(|u| u.role == Role::Customer)
        .map(|u| u.id.clone());

    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::CreateOrder {
            table_id: payload.table_id,
            customer_id,
            lines: payload.lines,
            payment_method: payload.payment_method,
        },
    );
    let order = execute(&state, cmd).await?;
    Ok(ok(order))
}

/// GET /api/orders?status= - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderSnapshot>>>> {
    let orders = state.orders.list_orders(query.status)?;
    Ok(ok(orders))
}

/// GET /api/orders/{id} - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> OrderResponse {
    let order = load_order(&state, &id)?;
    ensure_order_access(user.as_ref(), &order)?;
    Ok(ok(order))
}

/// GET /api/orders/{id}/events - 事件流
pub async fn events(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<OrderEvent>>>> {
    Ok(ok(state.orders.order_events(&id)?))
}

/// POST /api/orders/{id}/items - 加菜
pub async fn add_items(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<AddItemsRequest>,
) -> OrderResponse {
    ensure_order_owner(user.as_ref(), &load_order(&state, &id)?)?;
    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::AddItems {
            order_id: id,
            lines: payload.lines,
        },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// DELETE /api/orders/{id}/items/{item_id} - 退菜
pub async fn cancel_item(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Path((id, item_id)): Path<(String, String)>,
) -> OrderResponse {
    ensure_order_owner(user.as_ref(), &load_order(&state, &id)?)?;
    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::CancelItem {
            order_id: id,
            item_id,
        },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// POST /api/orders/{id}/resubmit - 按最小变更重新提交
pub async fn resubmit(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<ItemChanges>,
) -> OrderResponse {
    ensure_order_owner(user.as_ref(), &load_order(&state, &id)?)?;
    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::Resubmit {
            order_id: id,
            changes,
        },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// PUT /api/orders/{id}/status - 修改订单状态
pub async fn set_status(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<SetOrderStatusRequest>,
) -> OrderResponse {
    ensure_may_set_status(user.as_ref(), &load_order(&state, &id)?, payload.status)?;
    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::SetOrderStatus {
            order_id: id,
            status: payload.status,
            payment_method: payload.payment_method,
        },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// POST /api/orders/{id}/staff-response - 服务员审核
pub async fn staff_response(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<StaffResponseRequest>,
) -> OrderResponse {
    let cmd = command(
        &headers,
        Some(&user),
        OrderCommandPayload::StaffRespond {
            order_id: id,
            approved: payload.approved,
            reason: payload.reason,
        },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// POST /api/orders/{id}/confirm - 顾客确认
pub async fn confirm(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> OrderResponse {
    ensure_order_owner(user.as_ref(), &load_order(&state, &id)?)?;
    let cmd = command(
        &headers,
        user.as_ref(),
        OrderCommandPayload::CustomerConfirm { order_id: id },
    );
    Ok(ok(execute(&state, cmd).await?))
}

/// POST /api/orders/{id}/start-preparing - 开始制作
pub async fn start_preparing(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> OrderResponse {
    let cmd = command(
        &headers,
        Some(&user),
        OrderCommandPayload::StartPreparing { order_id: id },
    );
    Ok(ok(execute(&state, cmd).await?))
}
