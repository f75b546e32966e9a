use std::sync::Mutex;

use async_trait::async_trait;
use shared::order::{
    CartLine, CatalogRef, CatalogVariant, OrderEvent, OrderItem, PaymentMethod, WaiterResponse,
};

use super::*;
use crate::ClientError;

fn price_of(catalog_id: &str) -> f64 {
    match catalog_id {
        "pho" => 50_000.0,
        "com" => 100_000.0,
        "tra" => 30_000.0,
        _ => 20_000.0,
    }
}

pub(crate) fn live_item(item_id: &str, catalog_id: &str, quantity: i32) -> OrderItem {
    OrderItem {
        item_id: item_id.to_string(),
        order_id: "ord-1".to_string(),
        catalog: CatalogRef::dish(catalog_id),
        item_type: CatalogVariant::Dish,
        name: catalog_id.to_string(),
        price: price_of(catalog_id),
        expense: 0.0,
        quantity,
        status: ItemStatus::Pending,
        prepared_by: None,
        note: None,
        created_at: 0,
        updated_at: 0,
    }
}

pub(crate) fn staged(
    temp_id: &str,
    catalog_id: &str,
    quantity: i32,
    note: Option<&str>,
) -> StagedItem {
    StagedItem {
        temp_id: temp_id.to_string(),
        catalog: CatalogRef::dish(catalog_id),
        name: catalog_id.to_string(),
        price: price_of(catalog_id),
        quantity,
        note: note.map(str::to_string),
    }
}

fn entry(catalog_id: &str) -> CatalogEntry {
    CatalogEntry {
        catalog: CatalogRef::dish(catalog_id),
        name: catalog_id.to_string(),
        price: price_of(catalog_id),
        expense: 0.0,
        available: true,
    }
}

fn order(review: ReviewStatus, items: Vec<OrderItem>) -> OrderSnapshot {
    let mut order = OrderSnapshot::new("ord-1".to_string());
    order.total_amount = items.iter().map(|i| i.price * f64::from(i.quantity)).sum();
    order.items = items;
    order.waiter_response = WaiterResponse {
        status: review,
        reason: (review == ReviewStatus::Rejected).then(|| "table full".to_string()),
        responded_at: None,
    };
    order
}

fn rejected_order() -> OrderSnapshot {
    order(
        ReviewStatus::Rejected,
        vec![live_item("i-1", "pho", 1), live_item("i-2", "com", 1)],
    )
}

/// In-memory stand-in for the order API
///
/// Applies resubmissions the way the ledger does, or fails with a
/// conflict when `fail` is set.
#[derive(Default)]
struct MockApi {
    current: Mutex<Option<OrderSnapshot>>,
    received: Mutex<Vec<ItemChanges>>,
    fail: bool,
}

impl MockApi {
    fn serving(order: OrderSnapshot) -> Self {
        Self {
            current: Mutex::new(Some(order)),
            ..Default::default()
        }
    }

    fn failing(order: OrderSnapshot) -> Self {
        Self {
            fail: true,
            ..Self::serving(order)
        }
    }

    fn received(&self) -> Vec<ItemChanges> {
        self.received.lock().unwrap().clone()
    }

    fn unused<T>() -> ClientResult<T> {
        Err(ClientError::Internal("not used in these tests".to_string()))
    }
}

#[async_trait]
impl OrderApi for MockApi {
    async fn create_order(
        &self,
        _: Option<&str>,
        _: Vec<CartLine>,
        _: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn get_order(&self, _: &str) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn list_orders(&self, _: Option<OrderStatus>) -> ClientResult<Vec<OrderSnapshot>> {
        Self::unused()
    }

    async fn order_events(&self, _: &str) -> ClientResult<Vec<OrderEvent>> {
        Self::unused()
    }

    async fn add_items(&self, _: &str, _: Vec<CartLine>) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn cancel_item(&self, _: &str, _: &str) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn resubmit(&self, _: &str, changes: ItemChanges) -> ClientResult<OrderSnapshot> {
        self.received.lock().unwrap().push(changes.clone());
        let mut guard = self.current.lock().unwrap();
        let current = guard.as_mut().unwrap();

        if self.fail {
            return Err(ClientError::Conflict {
                message: "item i-2 is preparing".to_string(),
                current: Some(Box::new(current.clone())),
            });
        }

        current.items.retain(|i| !changes.remove.contains(&i.item_id));
        for change in &changes.quantity {
            if let Some(item) = current.find_item_mut(&change.item_id) {
                item.quantity = change.quantity;
            }
        }
        let next = current.items.len();
        for (n, line) in changes.add.iter().enumerate() {
            let item_id = format!("i-new-{}", next + n);
            let mut item = live_item(&item_id, &line.catalog.id, line.quantity);
            item.note = line.note.clone();
            current.items.push(item);
        }
        current.total_amount = current
            .items
            .iter()
            .map(|i| i.price * f64::from(i.quantity))
            .sum();
        current.waiter_response = WaiterResponse::pending();
        current.customer_confirmed = false;
        Ok(current.clone())
    }

    async fn set_order_status(
        &self,
        _: &str,
        _: OrderStatus,
        _: Option<PaymentMethod>,
    ) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn staff_respond(
        &self,
        _: &str,
        _: bool,
        _: Option<&str>,
    ) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn confirm(&self, _: &str) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn start_preparing(&self, _: &str) -> ClientResult<OrderSnapshot> {
        Self::unused()
    }

    async fn set_item_status(&self, _: &str, _: ItemStatus) -> ClientResult<OrderItem> {
        Self::unused()
    }

    async fn mark_item_ready(&self, _: &str, _: Option<&str>) -> ClientResult<OrderItem> {
        Self::unused()
    }
}

#[test]
fn test_rejected_order_opens_for_editing() {
    let reconciler = EditReconciler::new(rejected_order());
    assert!(reconciler.is_editing());
    assert_eq!(reconciler.display().len(), 2);
    assert_eq!(reconciler.display_total(), 150_000.0);
    assert!(!reconciler.has_changes());

    let mut approved = EditReconciler::new(order(ReviewStatus::Approved, vec![]));
    assert!(!approved.is_editing());
    assert_eq!(
        approved.add(&entry("pho"), 1, None),
        Err(EditError::NotEditing)
    );
    approved.begin_edit().unwrap();
    assert!(approved.is_editing());
}

#[test]
fn test_terminal_order_cannot_be_edited() {
    let mut paid = order(ReviewStatus::Approved, vec![]);
    paid.status = OrderStatus::Paid;
    let mut reconciler = EditReconciler::new(paid);
    assert!(matches!(
        reconciler.begin_edit(),
        Err(EditError::NotEditable {
            status: OrderStatus::Paid,
            ..
        })
    ));
}

#[test]
fn test_additions_merge_by_catalog_and_note() {
    let mut reconciler = EditReconciler::new(rejected_order());

    // Same dish, no note: grows the pending server row
    let key = reconciler.add(&entry("pho"), 2, None).unwrap();
    assert_eq!(key, RowKey::Server("i-1".to_string()));

    // Different note: new staged row, then merges with itself
    let staged_key = reconciler.add(&entry("pho"), 1, Some("no onion")).unwrap();
    assert!(staged_key.is_staged());
    assert_eq!(
        reconciler.add(&entry("pho"), 1, Some(" no onion ")).unwrap(),
        staged_key
    );

    let rows = reconciler.display();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].quantity, 3);
    assert_eq!(rows[2].quantity, 2);
    assert_eq!(rows[2].note.as_deref(), Some("no onion"));
    assert_eq!(reconciler.display_total(), 3.0 * 50_000.0 + 100_000.0 + 2.0 * 50_000.0);

    let plan = reconciler.plan();
    assert_eq!(plan.quantity.len(), 1);
    assert_eq!(plan.quantity[0].quantity, 3);
    assert_eq!(plan.add.len(), 1);
    assert!(plan.remove.is_empty());
}

#[test]
fn test_additions_do_not_merge_into_started_items() {
    let mut items = vec![live_item("i-1", "pho", 1)];
    items[0].status = ItemStatus::Preparing;
    let mut reconciler = EditReconciler::new(order(ReviewStatus::Approved, items));
    reconciler.begin_edit().unwrap();

    assert!(reconciler.add(&entry("pho"), 1, None).unwrap().is_staged());
    assert_eq!(
        reconciler.remove(&RowKey::Server("i-1".to_string())),
        Err(EditError::ItemLocked {
            item_id: "i-1".to_string(),
            status: ItemStatus::Preparing
        })
    );
}

#[test]
fn test_merged_quantity_stays_in_range() {
    let mut reconciler = EditReconciler::new(rejected_order());

    // Merging into the server row would overflow
    assert_eq!(
        reconciler.add(&entry("pho"), i32::MAX, None),
        Err(EditError::InvalidQuantity(i32::MAX))
    );
    assert!(!reconciler.has_changes());
    assert_eq!(reconciler.display()[0].quantity, 1);

    // Same for a staged row
    let staged = reconciler.add(&entry("pho"), 5, Some("extra herbs")).unwrap();
    assert_eq!(
        reconciler.add(&entry("pho"), MAX_QUANTITY, Some("extra herbs")),
        Err(EditError::InvalidQuantity(MAX_QUANTITY + 5))
    );
    let row = reconciler.display().iter().find(|r| r.key == staged).unwrap();
    assert_eq!(row.quantity, 5);

    // Direct edits and new rows are bounded as well
    assert_eq!(
        reconciler.set_quantity(&staged, MAX_QUANTITY + 1),
        Err(EditError::InvalidQuantity(MAX_QUANTITY + 1))
    );
    assert_eq!(
        reconciler.add(&entry("com"), MAX_QUANTITY + 1, Some("to go")),
        Err(EditError::InvalidQuantity(MAX_QUANTITY + 1))
    );
    assert!(reconciler.set_quantity(&staged, MAX_QUANTITY).is_ok());
}

#[test]
fn test_removing_staged_row_sends_nothing() {
    let mut reconciler = EditReconciler::new(rejected_order());
    let key = reconciler.add(&entry("tra"), 2, None).unwrap();
    assert!(reconciler.has_changes());

    reconciler.remove(&key).unwrap();
    assert!(!reconciler.has_changes());
    assert!(reconciler.plan().remove.is_empty());
    assert_eq!(reconciler.display().len(), 2);

    assert_eq!(
        reconciler.remove(&key),
        Err(EditError::UnknownRow(key.clone()))
    );
}

#[test]
fn test_quantity_edits() {
    let mut reconciler = EditReconciler::new(rejected_order());
    let pho = RowKey::Server("i-1".to_string());
    let com = RowKey::Server("i-2".to_string());

    reconciler.set_quantity(&pho, 4).unwrap();
    assert_eq!(reconciler.plan().quantity[0].quantity, 4);

    // Back to the live quantity: no change left
    reconciler.set_quantity(&pho, 1).unwrap();
    assert!(!reconciler.has_changes());

    // Zero removes the row
    reconciler.set_quantity(&com, 0).unwrap();
    assert_eq!(reconciler.plan().remove, vec!["i-2".to_string()]);
    assert_eq!(reconciler.display().len(), 1);
    assert_eq!(
        reconciler.set_quantity(&com, 2),
        Err(EditError::UnknownRow(com.clone()))
    );
    assert_eq!(
        reconciler.add(&entry("pho"), -1, None),
        Err(EditError::InvalidQuantity(-1))
    );
}

#[tokio::test]
async fn test_resubmit_after_rejection() {
    let api = MockApi::serving(rejected_order());
    let mut reconciler = EditReconciler::new(rejected_order());
    assert_eq!(reconciler.order().total_amount, 150_000.0);

    reconciler.add(&entry("tra"), 2, None).unwrap();
    let order = reconciler.resubmit(&api).await.unwrap().clone();

    // Only the new line travels; the original items keep their ids
    let sent = api.received();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].add.len(), 1);
    assert!(sent[0].remove.is_empty());
    assert!(sent[0].quantity.is_empty());

    assert_eq!(order.items.len(), 3);
    assert_eq!(order.items[0].item_id, "i-1");
    assert_eq!(order.items[1].item_id, "i-2");
    assert_eq!(order.total_amount, 210_000.0);
    assert_eq!(order.waiter_response.status, ReviewStatus::Pending);

    assert!(!reconciler.is_editing());
    assert!(reconciler.staged().is_empty());
    assert_eq!(reconciler.display().len(), 3);
    assert!(reconciler.display().iter().all(|r| !r.key.is_staged()));
}

#[tokio::test]
async fn test_failed_resubmit_keeps_buffer() {
    let api = MockApi::failing(rejected_order());
    let mut reconciler = EditReconciler::new(rejected_order());
    reconciler.add(&entry("tra"), 2, None).unwrap();
    reconciler
        .remove(&RowKey::Server("i-2".to_string()))
        .unwrap();
    let before = reconciler.display().to_vec();
    let plan_before = reconciler.plan();

    let err = reconciler.resubmit(&api).await.unwrap_err();
    assert!(err.current_order().is_some());

    assert!(reconciler.is_editing());
    assert_eq!(reconciler.display(), before.as_slice());
    assert_eq!(reconciler.plan(), plan_before);
    assert_eq!(reconciler.order().items.len(), 2);
}

#[tokio::test]
async fn test_zero_change_resubmit_still_goes_out() {
    let api = MockApi::serving(rejected_order());
    let mut reconciler = EditReconciler::new(rejected_order());

    let order = reconciler.resubmit(&api).await.unwrap();
    assert_eq!(order.waiter_response.status, ReviewStatus::Pending);
    assert!(api.received()[0].is_empty());
}

#[test]
fn test_rebase_drops_stale_edits() {
    let mut reconciler = EditReconciler::new(rejected_order());
    reconciler
        .set_quantity(&RowKey::Server("i-1".to_string()), 3)
        .unwrap();
    reconciler
        .remove(&RowKey::Server("i-2".to_string()))
        .unwrap();
    reconciler.add(&entry("tra"), 1, None).unwrap();

    // Someone else cancelled i-1 meanwhile
    let mut newer = rejected_order();
    newer.items.remove(0);
    reconciler.rebase(newer);

    let plan = reconciler.plan();
    assert!(plan.quantity.is_empty());
    assert_eq!(plan.remove, vec!["i-2".to_string()]);
    assert_eq!(plan.add.len(), 1);

    let mut cancelled = rejected_order();
    cancelled.status = OrderStatus::Cancelled;
    reconciler.rebase(cancelled);
    assert!(!reconciler.is_editing());
    assert!(!reconciler.has_changes());
}
