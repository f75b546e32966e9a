//! OrderResubmitted event applier
//!
//! Replays a minimal change set: removals, then quantity changes, then
//! appended items. Items the customer did not touch keep their identity.

use super::{record, touch};
use crate::orders::traits::EventApplier;
use crate::orders::{money, rules};
use shared::order::{EventPayload, HistoryAction, OrderEvent, OrderSnapshot};

/// OrderResubmitted applier
pub struct OrderResubmittedApplier;

impl EventApplier for OrderResubmittedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderResubmitted {
            added,
            removed,
            quantity,
        } = &event.payload
        {
            snapshot.items.retain(|i| !removed.contains(&i.item_id));

            for change in quantity {
                if let Some(item) = snapshot.find_item_mut(&change.item_id) {
                    item.quantity = change.quantity;
                    item.updated_at = event.timestamp;
                }
            }

            snapshot.items.extend(added.iter().cloned());
            money::recalculate_total(snapshot);

            rules::reset_review(snapshot, event.timestamp);
            record(
                snapshot,
                event,
                HistoryAction::Resubmitted,
                Some(format!(
                    "+{} -{} ~{}",
                    added.len(),
                    removed.len(),
                    quantity.len()
                )),
            );
            touch(snapshot, event);
        }
    }
}
