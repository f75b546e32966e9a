//! ItemStatusChanged event applier
//!
//! Moves one item forward. When the event completes the last outstanding
//! item, the order itself becomes ready.

use super::{record, touch};
use crate::orders::rules;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, HistoryAction, OrderEvent, OrderSnapshot, OrderStatus};

/// ItemStatusChanged applier
pub struct ItemStatusChangedApplier;

impl EventApplier for ItemStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemStatusChanged {
            item_id,
            to,
            preparer_id,
            order_ready,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot.find_item_mut(item_id) {
                item.status = *to;
                item.updated_at = event.timestamp;
                if let Some(preparer) = preparer_id {
                    item.prepared_by = Some(preparer.clone());
                }
            }

            if *order_ready && snapshot.status == OrderStatus::Preparing {
                snapshot.status = OrderStatus::Ready;
                rules::sync_payment(snapshot, event.timestamp, None);
                record(
                    snapshot,
                    event,
                    HistoryAction::StatusChanged,
                    Some(format!("{} -> {}", OrderStatus::Preparing, OrderStatus::Ready)),
                );
            }

            touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{event, item, snapshot};
    use shared::order::{ItemStatus, OrderEventType};

    fn item_event(item_id: &str, to: ItemStatus, order_ready: bool) -> OrderEvent {
        event(
            6,
            OrderEventType::ItemStatusChanged,
            EventPayload::ItemStatusChanged {
                item_id: item_id.to_string(),
                from: ItemStatus::Preparing,
                to,
                preparer_id: Some("chef-1".to_string()),
                order_ready,
            },
        )
    }

    #[test]
    fn test_item_ready_keeps_order_preparing() {
        let mut snapshot = snapshot(
            OrderStatus::Preparing,
            vec![
                item("i-1", 10.0, 1, ItemStatus::Preparing),
                item("i-2", 10.0, 1, ItemStatus::Preparing),
            ],
        );
        let event = item_event("i-1", ItemStatus::Ready, false);
        ItemStatusChangedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].status, ItemStatus::Ready);
        assert_eq!(snapshot.items[0].prepared_by.as_deref(), Some("chef-1"));
        assert_eq!(snapshot.status, OrderStatus::Preparing);
        assert!(snapshot.confirmation_history.is_empty());
        assert_eq!(snapshot.last_sequence, 6);
    }

    #[test]
    fn test_last_item_ready_advances_order() {
        let mut snapshot = snapshot(
            OrderStatus::Preparing,
            vec![
                item("i-1", 10.0, 1, ItemStatus::Ready),
                item("i-2", 10.0, 1, ItemStatus::Preparing),
            ],
        );
        let event = item_event("i-2", ItemStatus::Ready, true);
        ItemStatusChangedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Ready);
        assert_eq!(
            snapshot.confirmation_history[0].action,
            HistoryAction::StatusChanged
        );
    }
}
