//! OrderStatusChanged event applier
//!
//! Manual order transitions. Serving marks ready items served and stamps
//! `served_at` the first time; payment follows the new status.

use super::{record, touch};
use crate::orders::rules;
use crate::orders::traits::EventApplier;
use shared::order::{
    EventPayload, HistoryAction, ItemStatus, OrderEvent, OrderSnapshot, OrderStatus,
};

/// OrderStatusChanged applier
pub struct OrderStatusChangedApplier;

impl EventApplier for OrderStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderStatusChanged {
            from,
            to,
            payment_method,
        } = &event.payload
        {
            snapshot.status = *to;

            if *to == OrderStatus::Served {
                snapshot.served_at.get_or_insert(event.timestamp);
                for item in snapshot
                    .items
                    .iter_mut()
                    .filter(|i| i.status == ItemStatus::Ready)
                {
                    item.status = ItemStatus::Served;
                    item.updated_at = event.timestamp;
                }
            }

            rules::sync_payment(snapshot, event.timestamp, *payment_method);
            record(
                snapshot,
                event,
                HistoryAction::StatusChanged,
                Some(format!("{} -> {}", from, to)),
            );
            touch(snapshot, event);
        }
    }
}
