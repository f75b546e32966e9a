//! Order commands - requests from clients to change an order

use super::types::{CartLine, ItemChanges, ItemStatus, OrderStatus, PaymentMethod};
use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Order command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Client-chosen id, used for idempotency
    pub command_id: String,
    /// Operator issuing the command (`guest` for unauthenticated diners)
    pub operator_id: String,
    pub operator_role: Role,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    /// Build a command with a fresh id
    pub fn new(
        operator_id: impl Into<String>,
        operator_role: Role,
        payload: OrderCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.into(),
            operator_role,
            timestamp: chrono::Utc::now().timestamp_millis(),
            payload,
        }
    }

    /// Replace the generated id with a caller-provided one
    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = command_id.into();
        self
    }
}

/// Command payloads, one per ledger operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    CreateOrder {
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
        lines: Vec<CartLine>,
        #[serde(skip_serializing_if = "Option::is_none")]
        payment_method: Option<PaymentMethod>,
    },

    AddItems {
        order_id: String,
        lines: Vec<CartLine>,
    },

    CancelItem {
        order_id: String,
        item_id: String,
    },

    Resubmit {
        order_id: String,
        changes: ItemChanges,
    },

    SetOrderStatus {
        order_id: String,
        status: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        payment_method: Option<PaymentMethod>,
    },

    StaffRespond {
        order_id: String,
        approved: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    CustomerConfirm {
        order_id: String,
    },

    SetItemStatus {
        item_id: String,
        status: ItemStatus,
    },

    StartPreparing {
        order_id: String,
    },

    MarkItemReady {
        item_id: String,
        preparer_id: String,
    },
}

impl OrderCommandPayload {
    /// Target order, when the payload names one directly
    ///
    /// Item-scoped payloads resolve their order through the item index.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::CreateOrder { .. }
            | OrderCommandPayload::SetItemStatus { .. }
            | OrderCommandPayload::MarkItemReady { .. } => None,
            OrderCommandPayload::AddItems { order_id, .. }
            | OrderCommandPayload::CancelItem { order_id, .. }
            | OrderCommandPayload::Resubmit { order_id, .. }
            | OrderCommandPayload::SetOrderStatus { order_id, .. }
            | OrderCommandPayload::StaffRespond { order_id, .. }
            | OrderCommandPayload::CustomerConfirm { order_id }
            | OrderCommandPayload::StartPreparing { order_id } => Some(order_id),
        }
    }

    /// Item-scoped payloads
    pub fn item_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::SetItemStatus { item_id, .. }
            | OrderCommandPayload::MarkItemReady { item_id, .. } => Some(item_id),
            _ => None,
        }
    }

    /// Cart lines needing catalog resolution before execution
    pub fn cart_lines(&self) -> Vec<&CartLine> {
        match self {
            OrderCommandPayload::CreateOrder { lines, .. }
            | OrderCommandPayload::AddItems { lines, .. } => lines.iter().collect(),
            OrderCommandPayload::Resubmit { changes, .. } => changes.add.iter().collect(),
            _ => Vec::new(),
        }
    }
}
