//! Order snapshot - the authoritative aggregate (order + items + payment)
//!
//! Snapshots are produced by applying events in sequence order and are the
//! unit of atomic update in the ledger.

use super::types::{
    ConfirmationEntry, ItemStatus, OrderItem, OrderStatus, Payment, PaymentMethod, ReviewStatus,
    WaiterResponse,
};
use serde::{Deserialize, Serialize};

/// Order snapshot - computed from event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Customer owning the order (None for guest orders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Dine-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Staff member who last responded to the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    /// Items in submission order
    pub items: Vec<OrderItem>,
    /// Payment (1:1, created with the order)
    pub payment: Payment,
    /// Order status
    pub status: OrderStatus,
    /// Σ price × quantity over attached items
    pub total_amount: f64,
    #[serde(default)]
    pub discount: f64,
    /// First time the order entered `served`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,
    /// Staff review of the current content
    pub waiter_response: WaiterResponse,
    pub customer_confirmed: bool,
    /// Append-only audit trail
    pub confirmation_history: Vec<ConfirmationEntry>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Sequence of the last applied event
    pub last_sequence: u64,
}

impl OrderSnapshot {
    /// Create an empty snapshot (used before applying `OrderCreated`)
    pub fn new(order_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            payment: Payment::unpaid(String::new(), PaymentMethod::default()),
            order_id,
            customer_id: None,
            table_id: None,
            staff_id: None,
            items: Vec::new(),
            status: OrderStatus::Pending,
            total_amount: 0.0,
            discount: 0.0,
            served_at: None,
            waiter_response: WaiterResponse::pending(),
            customer_confirmed: false,
            confirmation_history: Vec::new(),
            created_at: now,
            updated_at: now,
            last_sequence: 0,
        }
    }

    pub fn find_item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// Every item is ready or served (vacuously true for an empty order)
    pub fn all_items_done(&self) -> bool {
        self.items.iter().all(|i| i.status.is_done())
    }

    /// Items still in the given status
    pub fn items_in(&self, status: ItemStatus) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(move |i| i.status == status)
    }

    pub fn is_guest_order(&self) -> bool {
        self.customer_id.is_none()
    }

    /// Guest orders belong to whoever holds the id
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        match &self.customer_id {
            Some(owner) => owner == user_id,
            None => true,
        }
    }

    /// The order content awaits a staff decision
    pub fn awaits_review(&self) -> bool {
        self.status == OrderStatus::Pending
            && self.waiter_response.status == ReviewStatus::Pending
    }
}
