use super::*;
use crate::services::InMemoryCatalog;
use shared::Role;
use shared::order::{CatalogEntry, CatalogRef, ItemChanges, ItemStatus, ReviewStatus};

fn entry(catalog: CatalogRef, name: &str, price: f64, available: bool) -> CatalogEntry {
    CatalogEntry {
        catalog,
        name: name.to_string(),
        price,
        expense: price / 4.0,
        available,
    }
}

fn test_catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::from_entries([
        entry(CatalogRef::dish("pho"), "Pho bo", 50_000.0, true),
        entry(CatalogRef::dish("com"), "Com tam", 100_000.0, true),
        entry(CatalogRef::dish("tra"), "Tra da", 30_000.0, true),
        entry(CatalogRef::combo("lunch"), "Lunch set", 120_000.0, true),
        entry(CatalogRef::dish("sold-out"), "Bun rieu", 45_000.0, false),
    ]))
}

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, test_catalog())
}

fn line(id: &str, quantity: i32) -> CartLine {
    CartLine {
        catalog: CatalogRef::dish(id),
        quantity,
        note: None,
    }
}

fn customer_cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("cust-1", Role::Customer, payload)
}

fn waiter_cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("waiter-1", Role::Waiter, payload)
}

fn kitchen_cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("chef-1", Role::Kitchen, payload)
}

// ========================================================================
// Helper: create an order with items
// ========================================================================

fn create_order(manager: &OrdersManager, lines: Vec<CartLine>) -> OrderSnapshot {
    manager
        .execute_command(customer_cmd(OrderCommandPayload::CreateOrder {
            table_id: Some("T1".to_string()),
            customer_id: Some("cust-1".to_string()),
            lines,
            payment_method: None,
        }))
        .expect("Failed to create order")
}

fn respond(
    manager: &OrdersManager,
    order_id: &str,
    approved: bool,
    reason: Option<&str>,
) -> ManagerResult<OrderSnapshot> {
    manager.execute_command(waiter_cmd(OrderCommandPayload::StaffRespond {
        order_id: order_id.to_string(),
        approved,
        reason: reason.map(str::to_string),
    }))
}

fn confirm(manager: &OrdersManager, order_id: &str) -> ManagerResult<OrderSnapshot> {
    manager.execute_command(customer_cmd(OrderCommandPayload::CustomerConfirm {
        order_id: order_id.to_string(),
    }))
}

/// Create, approve and confirm an order
fn confirmed_order(manager: &OrdersManager, lines: Vec<CartLine>) -> OrderSnapshot {
    let order = create_order(manager, lines);
    respond(manager, &order.order_id, true, None).unwrap();
    confirm(manager, &order.order_id).unwrap()
}

fn start_preparing(manager: &OrdersManager, order_id: &str) -> ManagerResult<OrderSnapshot> {
    manager.execute_command(kitchen_cmd(OrderCommandPayload::StartPreparing {
        order_id: order_id.to_string(),
    }))
}

fn set_status(
    manager: &OrdersManager,
    order_id: &str,
    status: OrderStatus,
) -> ManagerResult<OrderSnapshot> {
    manager.execute_command(waiter_cmd(OrderCommandPayload::SetOrderStatus {
        order_id: order_id.to_string(),
        status,
        payment_method: None,
    }))
}

fn mark_ready(manager: &OrdersManager, item_id: &str) -> ManagerResult<OrderItem> {
    manager.execute_item_command(kitchen_cmd(OrderCommandPayload::MarkItemReady {
        item_id: item_id.to_string(),
        preparer_id: "chef-1".to_string(),
    }))
}

mod test_flows;
