//! ItemsAdded event applier
//!
//! Appends the new items and sends the order back for review.

use super::{record, touch};
use crate::orders::traits::EventApplier;
use crate::orders::{money, rules};
use shared::order::{EventPayload, HistoryAction, OrderEvent, OrderSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemsAdded { items } = &event.payload {
            // New lines are always new items, never merged into existing ones
            snapshot.items.extend(items.iter().cloned());
            money::recalculate_total(snapshot);

            rules::reset_review(snapshot, event.timestamp);
            record(
                snapshot,
                event,
                HistoryAction::ItemsAdded,
                Some(format!("{} item(s)", items.len())),
            );
            touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{event, item, snapshot};
    use shared::order::{ItemStatus, OrderEventType, OrderStatus, ReviewStatus};

    #[test]
    fn test_items_added_recomputes_total_and_resets_review() {
        let mut snapshot = snapshot(
            OrderStatus::Pending,
            vec![item("i-1", 150_000.0, 1, ItemStatus::Pending)],
        );
        snapshot.waiter_response.status = ReviewStatus::Rejected;
        snapshot.waiter_response.reason = Some("table full".to_string());

        let event = event(
            2,
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items: vec![item("i-2", 30_000.0, 2, ItemStatus::Pending)],
            },
        );
        ItemsAddedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.total_amount, 210_000.0);
        assert_eq!(snapshot.waiter_response.status, ReviewStatus::Pending);
        assert!(snapshot.waiter_response.reason.is_none());
        assert_eq!(snapshot.confirmation_history.len(), 1);
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_items_added_to_preparing_order_returns_it_to_pending() {
        let mut snapshot = snapshot(
            OrderStatus::Preparing,
            vec![item("i-1", 10.0, 1, ItemStatus::Preparing)],
        );
        snapshot.customer_confirmed = true;

        let event = event(
            3,
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items: vec![item("i-2", 5.0, 1, ItemStatus::Pending)],
            },
        );
        ItemsAddedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Pending);
        assert!(!snapshot.customer_confirmed);
        assert_eq!(snapshot.items[0].status, ItemStatus::Preparing);
    }
}
