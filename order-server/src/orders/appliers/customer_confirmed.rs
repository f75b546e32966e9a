//! CustomerConfirmed event applier

use super::{record, touch};
use crate::orders::rules;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, HistoryAction, OrderEvent, OrderSnapshot, OrderStatus};

/// CustomerConfirmed applier
pub struct CustomerConfirmedApplier;

impl EventApplier for CustomerConfirmedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::CustomerConfirmed {} = &event.payload {
            snapshot.customer_confirmed = true;
            snapshot.status = OrderStatus::Confirmed;
            rules::sync_payment(snapshot, event.timestamp, None);

            record(snapshot, event, HistoryAction::CustomerConfirmed, None);
            touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{event, snapshot};
    use shared::order::{OrderEventType, ReviewStatus};

    #[test]
    fn test_confirmation_moves_order_to_confirmed() {
        let mut snapshot = snapshot(OrderStatus::Pending, vec![]);
        snapshot.waiter_response.status = ReviewStatus::Approved;

        let event = event(
            3,
            OrderEventType::CustomerConfirmed,
            EventPayload::CustomerConfirmed {},
        );
        CustomerConfirmedApplier.apply(&mut snapshot, &event);

        assert!(snapshot.customer_confirmed);
        assert_eq!(snapshot.status, OrderStatus::Confirmed);
        assert_eq!(snapshot.waiter_response.status, ReviewStatus::Approved);
        assert_eq!(snapshot.last_sequence, 3);
    }
}
