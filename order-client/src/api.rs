//! Order API abstraction
//!
//! [`HttpClient`](crate::HttpClient) is the network implementation; the
//! reconciler only depends on this trait so it can run against any backend.

use async_trait::async_trait;
use shared::order::{
    CartLine, ItemChanges, ItemStatus, OrderEvent, OrderItem, OrderSnapshot, OrderStatus,
    PaymentMethod,
};

use crate::ClientResult;

#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(
        &self,
        table_id: Option<&str>,
        lines: Vec<CartLine>,
        payment_method: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot>;

    async fn get_order(&self, order_id: &str) -> ClientResult<OrderSnapshot>;

    async fn list_orders(&self, status: Option<OrderStatus>) -> ClientResult<Vec<OrderSnapshot>>;

    async fn order_events(&self, order_id: &str) -> ClientResult<Vec<OrderEvent>>;

    async fn add_items(&self, order_id: &str, lines: Vec<CartLine>) -> ClientResult<OrderSnapshot>;

    async fn cancel_item(&self, order_id: &str, item_id: &str) -> ClientResult<OrderSnapshot>;

    /// Replay a staged change set in one command
    async fn resubmit(&self, order_id: &str, changes: ItemChanges) -> ClientResult<OrderSnapshot>;

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot>;

    async fn staff_respond(
        &self,
        order_id: &str,
        approved: bool,
        reason: Option<&str>,
    ) -> ClientResult<OrderSnapshot>;

    async fn confirm(&self, order_id: &str) -> ClientResult<OrderSnapshot>;

    async fn start_preparing(&self, order_id: &str) -> ClientResult<OrderSnapshot>;

    async fn set_item_status(&self, item_id: &str, status: ItemStatus) -> ClientResult<OrderItem>;

    async fn mark_item_ready(
        &self,
        item_id: &str,
        preparer_id: Option<&str>,
    ) -> ClientResult<OrderItem>;
}
