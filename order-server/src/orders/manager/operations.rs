//! 按操作划分的账本接口
//!
//! 每个方法构造对应的 [`OrderCommandPayload`] 并交给 `execute_command`，
//! 便于在 HTTP 层之外直接驱动账本。

use shared::Role;
use shared::order::{
    CartLine, ItemChanges, ItemStatus, OrderCommand, OrderCommandPayload, OrderEvent, OrderItem,
    OrderSnapshot, OrderStatus, PaymentMethod,
};

use super::{ManagerError, ManagerResult, OrdersManager};

/// Who issues a ledger operation
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: String,
    pub role: Role,
}

impl Operator {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    fn command(&self, payload: OrderCommandPayload) -> OrderCommand {
        OrderCommand::new(self.id.clone(), self.role, payload)
    }
}

impl OrdersManager {
    pub fn create_order(
        &self,
        by: &Operator,
        table_id: Option<String>,
        lines: Vec<CartLine>,
        customer_id: Option<String>,
        payment_method: Option<PaymentMethod>,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::CreateOrder {
            table_id,
            customer_id,
            lines,
            payment_method,
        }))
    }

    pub fn add_items(
        &self,
        by: &Operator,
        order_id: &str,
        lines: Vec<CartLine>,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::AddItems {
            order_id: order_id.to_string(),
            lines,
        }))
    }

    pub fn cancel_item(
        &self,
        by: &Operator,
        order_id: &str,
        item_id: &str,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::CancelItem {
            order_id: order_id.to_string(),
            item_id: item_id.to_string(),
        }))
    }

    pub fn resubmit(
        &self,
        by: &Operator,
        order_id: &str,
        changes: ItemChanges,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::Resubmit {
            order_id: order_id.to_string(),
            changes,
        }))
    }

    pub fn set_order_status(
        &self,
        by: &Operator,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::SetOrderStatus {
            order_id: order_id.to_string(),
            status,
            payment_method,
        }))
    }

    pub fn staff_respond(
        &self,
        by: &Operator,
        order_id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::StaffRespond {
            order_id: order_id.to_string(),
            approved,
            reason,
        }))
    }

    pub fn customer_confirm(&self, by: &Operator, order_id: &str) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::CustomerConfirm {
            order_id: order_id.to_string(),
        }))
    }

    pub fn start_preparing(&self, by: &Operator, order_id: &str) -> ManagerResult<OrderSnapshot> {
        self.execute_command(by.command(OrderCommandPayload::StartPreparing {
            order_id: order_id.to_string(),
        }))
    }

    pub fn set_item_status(
        &self,
        by: &Operator,
        item_id: &str,
        status: ItemStatus,
    ) -> ManagerResult<OrderItem> {
        self.execute_item_command(by.command(OrderCommandPayload::SetItemStatus {
            item_id: item_id.to_string(),
            status,
        }))
    }

    pub fn mark_item_ready(
        &self,
        by: &Operator,
        item_id: &str,
        preparer_id: &str,
    ) -> ManagerResult<OrderItem> {
        self.execute_item_command(by.command(OrderCommandPayload::MarkItemReady {
            item_id: item_id.to_string(),
            preparer_id: preparer_id.to_string(),
        }))
    }

    /// Current order, or `OrderNotFound`
    pub fn get_order(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        self.get_snapshot(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// Event history of an order, or `OrderNotFound` when it has none
    pub fn order_events(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        let events = self.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }
        Ok(events)
    }
}
