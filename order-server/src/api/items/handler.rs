//! Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;
use shared::ApiResponse;
use shared::order::{MarkItemReadyRequest, OrderCommandPayload, OrderItem, SetItemStatusRequest};

use crate::api::{command, execute_item};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ok};

/// PUT /api/items/{item_id}/status
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(payload): Json<SetItemStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let cmd = command(
        &headers,
        Some(&user),
        OrderCommandPayload::SetItemStatus {
            item_id,
            status: payload.status,
        },
    );
    Ok(ok(execute_item(&state, cmd).await?))
}

/// POST /api/items/{item_id}/ready
///
/// The preparer defaults to the caller.
pub async fn mark_ready(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(payload): Json<MarkItemReadyRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let preparer_id = payload.preparer_id.unwrap_or_else(|| user.id.clone());
    let cmd = command(
        &headers,
        Some(&user),
        OrderCommandPayload::MarkItemReady {
            item_id,
            preparer_id,
        },
    );
    Ok(ok(execute_item(&state, cmd).await?))
}
