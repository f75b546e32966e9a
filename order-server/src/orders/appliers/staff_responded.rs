//! StaffResponded event applier

use super::{record, touch};
use crate::orders::traits::EventApplier;
use shared::order::{
    EventPayload, HistoryAction, OrderEvent, OrderSnapshot, ReviewStatus, WaiterResponse,
};

/// StaffResponded applier
pub struct StaffRespondedApplier;

impl EventApplier for StaffRespondedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::StaffResponded {
            staff_id,
            approved,
            reason,
        } = &event.payload
        {
            let (status, action) = if *approved {
                (ReviewStatus::Approved, HistoryAction::StaffApproved)
            } else {
                (ReviewStatus::Rejected, HistoryAction::StaffRejected)
            };

            snapshot.waiter_response = WaiterResponse {
                status,
                reason: reason.clone(),
                responded_at: Some(event.timestamp),
            };
            snapshot.staff_id = Some(staff_id.clone());

            record(snapshot, event, action, reason.clone());
            touch(snapshot, event);
        }
    }
}
