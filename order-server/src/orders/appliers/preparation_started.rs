//! PreparationStarted event applier

use super::{record, touch};
use crate::orders::rules;
use crate::orders::traits::EventApplier;
use shared::order::{
    EventPayload, HistoryAction, ItemStatus, OrderEvent, OrderSnapshot, OrderStatus,
};

/// PreparationStarted applier
///
/// The listed pending items move to preparing and the order follows.
pub struct PreparationStartedApplier;

impl EventApplier for PreparationStartedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PreparationStarted { item_ids } = &event.payload {
            for item in snapshot.items.iter_mut() {
                if item.status == ItemStatus::Pending && item_ids.contains(&item.item_id) {
                    item.status = ItemStatus::Preparing;
                    item.updated_at = event.timestamp;
                }
            }

            let from = snapshot.status;
            snapshot.status = OrderStatus::Preparing;
            rules::sync_payment(snapshot, event.timestamp, None);

            record(
                snapshot,
                event,
                HistoryAction::StatusChanged,
                Some(format!("{} -> {}", from, OrderStatus::Preparing)),
            );
            touch(snapshot, event);
        }
    }
}
