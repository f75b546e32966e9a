//! HTTP request bodies for the order API

use super::types::{CartLine, ItemStatus, OrderStatus, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Optional header carrying a client-chosen command id (idempotent retries)
pub const COMMAND_ID_HEADER: &str = "x-command-id";

/// `POST /api/orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub lines: Vec<CartLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// `POST /api/orders/{id}/items`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddItemsRequest {
    pub lines: Vec<CartLine>,
}

/// `PUT /api/orders/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// `POST /api/orders/{id}/staff-response`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffResponseRequest {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `PUT /api/items/{item_id}/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetItemStatusRequest {
    pub status: ItemStatus,
}

/// `POST /api/items/{item_id}/ready`
///
/// The preparer defaults to the authenticated kitchen user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarkItemReadyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparer_id: Option<String>,
}

/// `GET /api/orders?status=`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOrdersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}
