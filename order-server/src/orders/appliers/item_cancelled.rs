//! ItemCancelled event applier

use super::{record, touch};
use crate::orders::traits::EventApplier;
use crate::orders::{money, rules};
use shared::order::{EventPayload, HistoryAction, OrderEvent, OrderSnapshot};

/// ItemCancelled applier
///
/// Detaches the item and subtracts its recorded line total from the order.
pub struct ItemCancelledApplier;

impl EventApplier for ItemCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemCancelled {
            item_id,
            item_name,
            line_total,
        } = &event.payload
        {
            snapshot.items.retain(|i| &i.item_id != item_id);
            money::subtract_line(snapshot, *line_total);

            rules::reset_review(snapshot, event.timestamp);
            record(
                snapshot,
                event,
                HistoryAction::ItemCancelled,
                Some(item_name.clone()),
            );
            touch(snapshot, event);
        }
    }
}
