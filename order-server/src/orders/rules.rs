//! Order state rules
//!
//! Guards used by actions before emitting events, and the side effects that
//! appliers share (review reset, payment sync).

use super::money;
use super::traits::OrderError;
use shared::order::{
    ItemStatus, OrderItem, OrderSnapshot, OrderStatus, PaymentMethod, PaymentStatus,
    WaiterResponse,
};

/// Content edits (add, cancel, resubmit) are allowed until the order is settled
pub fn ensure_modifiable(snapshot: &OrderSnapshot) -> Result<(), OrderError> {
    match snapshot.status {
        OrderStatus::Cancelled => Err(OrderError::IllegalTransition(format!(
            "order {} is cancelled",
            snapshot.order_id
        ))),
        OrderStatus::Paid => Err(OrderError::IllegalTransition(format!(
            "order {} is already paid",
            snapshot.order_id
        ))),
        _ => Ok(()),
    }
}

/// Only pending items may be removed or re-quantified
pub fn ensure_item_pending(item: &OrderItem) -> Result<(), OrderError> {
    if item.status != ItemStatus::Pending {
        return Err(OrderError::IllegalTransition(format!(
            "item {} is {}, only pending items can change",
            item.item_id, item.status
        )));
    }
    Ok(())
}

/// Look up an item the caller saw on this order
///
/// A missing item means the caller's view is stale (removed concurrently),
/// so it is reported as a conflict rather than a plain not-found.
pub fn require_listed_item<'a>(
    snapshot: &'a OrderSnapshot,
    item_id: &str,
) -> Result<&'a OrderItem, OrderError> {
    snapshot.find_item(item_id).ok_or_else(|| {
        OrderError::IllegalTransition(format!(
            "item {} is no longer on order {}",
            item_id, snapshot.order_id
        ))
    })
}

/// Look up the target of an item-scoped command
pub fn require_item<'a>(
    snapshot: &'a OrderSnapshot,
    item_id: &str,
) -> Result<&'a OrderItem, OrderError> {
    snapshot
        .find_item(item_id)
        .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))
}

/// Manual order status transitions
///
/// | from | to |
/// |------|----|
/// | pending | cancelled |
/// | confirmed | preparing, cancelled |
/// | preparing | ready (all items ready/served), cancelled |
/// | ready | served, cancelled |
/// | served | paid, cancelled |
///
/// `pending → confirmed` only happens through customer confirmation.
pub fn check_status_transition(
    snapshot: &OrderSnapshot,
    to: OrderStatus,
) -> Result<(), OrderError> {
    let from = snapshot.status;
    let legal = match (from, to) {
        (f, OrderStatus::Cancelled) => !f.is_terminal(),
        (OrderStatus::Confirmed, OrderStatus::Preparing) => true,
        (OrderStatus::Preparing, OrderStatus::Ready) => {
            if !snapshot.all_items_done() {
                return Err(OrderError::IllegalTransition(format!(
                    "order {} still has items in preparation",
                    snapshot.order_id
                )));
            }
            true
        }
        (OrderStatus::Ready, OrderStatus::Served) => true,
        (OrderStatus::Served, OrderStatus::Paid) => true,
        _ => false,
    };

    if !legal {
        return Err(OrderError::IllegalTransition(format!(
            "cannot move order {} from {} to {}",
            snapshot.order_id, from, to
        )));
    }
    Ok(())
}

/// Forward move of a single item, checked against the order status
///
/// Items advance exactly one step. `preparing` and `ready` need the order in
/// the kitchen; `served` needs the item ready and the order not yet settled.
pub fn check_item_transition(
    snapshot: &OrderSnapshot,
    item: &OrderItem,
    to: ItemStatus,
) -> Result<(), OrderError> {
    if to.rank() != item.status.rank() + 1 {
        return Err(OrderError::IllegalTransition(format!(
            "item {} cannot move from {} to {}",
            item.item_id, item.status, to
        )));
    }

    let order_ok = match to {
        ItemStatus::Pending => false,
        ItemStatus::Preparing | ItemStatus::Ready => snapshot.status == OrderStatus::Preparing,
        ItemStatus::Served => matches!(
            snapshot.status,
            OrderStatus::Preparing | OrderStatus::Ready | OrderStatus::Served
        ),
    };
    if !order_ok {
        return Err(OrderError::IllegalTransition(format!(
            "item {} cannot become {} while order {} is {}",
            item.item_id, to, snapshot.order_id, snapshot.status
        )));
    }
    Ok(())
}

/// The item becoming ready finishes the last outstanding item of a preparing order
pub fn completes_order(snapshot: &OrderSnapshot, item_id: &str, to: ItemStatus) -> bool {
    to == ItemStatus::Ready
        && snapshot.status == OrderStatus::Preparing
        && snapshot
            .items
            .iter()
            .filter(|i| i.item_id != item_id)
            .all(|i| i.status.is_done())
}

/// Reset review state after a content edit
///
/// Waiter response goes back to pending, the customer confirmation is
/// withdrawn, and an order past `pending` returns to `pending` for review.
pub fn reset_review(snapshot: &mut OrderSnapshot, timestamp: i64) {
    snapshot.waiter_response = WaiterResponse::pending();
    snapshot.customer_confirmed = false;
    if snapshot.status != OrderStatus::Pending {
        snapshot.status = OrderStatus::Pending;
        sync_payment(snapshot, timestamp, None);
    }
}

/// Derive payment state from order status
///
/// Paid orders settle `total - discount`; every other status leaves the
/// payment unpaid with nothing collected.
pub fn sync_payment(snapshot: &mut OrderSnapshot, timestamp: i64, method: Option<PaymentMethod>) {
    if let Some(method) = method {
        snapshot.payment.method = method;
    }
    if snapshot.status == OrderStatus::Paid {
        snapshot.payment.status = PaymentStatus::Paid;
        snapshot.payment.amount_paid = money::payable_amount(snapshot);
        snapshot.payment.pay_time = Some(timestamp);
    } else {
        snapshot.payment.status = PaymentStatus::Unpaid;
        snapshot.payment.amount_paid = 0.0;
        snapshot.payment.pay_time = None;
    }
}
