//! OrderCreated event applier
//!
//! Initializes a fresh snapshot: items, unpaid payment, review pending.

use super::{record, touch};
use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{
    EventPayload, HistoryAction, OrderEvent, OrderSnapshot, OrderStatus, Payment, WaiterResponse,
};

/// OrderCreated applier
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            customer_id,
            table_id,
            items,
            payment_id,
            payment_method,
        } = &event.payload
        {
            snapshot.order_id = event.order_id.clone();
            snapshot.customer_id = customer_id.clone();
            snapshot.table_id = table_id.clone();
            snapshot.items = items.clone();
            snapshot.payment = Payment::unpaid(payment_id.clone(), *payment_method);
            snapshot.status = OrderStatus::Pending;
            snapshot.waiter_response = WaiterResponse::pending();
            snapshot.customer_confirmed = false;
            snapshot.created_at = event.timestamp;

            money::recalculate_total(snapshot);

            record(
                snapshot,
                event,
                HistoryAction::Created,
                Some(format!("{} item(s)", items.len())),
            );
            touch(snapshot, event);
        }
    }
}
