//! Order events - immutable facts recorded after command processing

use super::types::{ItemStatus, OrderItem, OrderStatus, PaymentMethod, QuantityChange};
use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number, authoritative ordering for replay
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds), kept for audit only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event (`guest` when unauthenticated)
    pub operator_id: String,
    pub operator_role: Role,
    /// Command that triggered this event
    pub command_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    OrderStatusChanged,

    // Items
    ItemsAdded,
    ItemCancelled,
    OrderResubmitted,

    // Review
    StaffResponded,
    CustomerConfirmed,

    // Kitchen
    PreparationStarted,
    ItemStatusChanged,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            OrderEventType::OrderStatusChanged => write!(f, "ORDER_STATUS_CHANGED"),
            OrderEventType::ItemsAdded => write!(f, "ITEMS_ADDED"),
            OrderEventType::ItemCancelled => write!(f, "ITEM_CANCELLED"),
            OrderEventType::OrderResubmitted => write!(f, "ORDER_RESUBMITTED"),
            OrderEventType::StaffResponded => write!(f, "STAFF_RESPONDED"),
            OrderEventType::CustomerConfirmed => write!(f, "CUSTOMER_CONFIRMED"),
            OrderEventType::PreparationStarted => write!(f, "PREPARATION_STARTED"),
            OrderEventType::ItemStatusChanged => write!(f, "ITEM_STATUS_CHANGED"),
        }
    }
}

/// Event payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        #[serde(skip_serializing_if = "Option::is_none")]
        customer_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        items: Vec<OrderItem>,
        payment_id: String,
        payment_method: PaymentMethod,
    },

    ItemsAdded {
        items: Vec<OrderItem>,
    },

    ItemCancelled {
        item_id: String,
        item_name: String,
        /// price × quantity of the cancelled line
        line_total: f64,
    },

    OrderResubmitted {
        added: Vec<OrderItem>,
        removed: Vec<String>,
        quantity: Vec<QuantityChange>,
    },

    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        payment_method: Option<PaymentMethod>,
    },

    StaffResponded {
        staff_id: String,
        approved: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    CustomerConfirmed {},

    PreparationStarted {
        item_ids: Vec<String>,
    },

    ItemStatusChanged {
        item_id: String,
        from: ItemStatus,
        to: ItemStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        preparer_id: Option<String>,
        /// This change completed the last outstanding item of a preparing order
        #[serde(default)]
        order_ready: bool,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Global sequence number (authoritative ordering)
    /// * `order_id` - Order this event belongs to
    /// * `operator_id` / `operator_role` - Who triggered this event
    /// * `command_id` - Command that triggered this event
    /// * `client_timestamp` - Client-provided timestamp (for audit, may have clock skew)
    /// * `event_type` - Event type
    /// * `payload` - Event payload
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_role: Role,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            // Server timestamp is always set by the server
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id,
            operator_role,
            command_id,
            event_type,
            payload,
        }
    }
}
