//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::order::{ConfirmationEntry, EventPayload, HistoryAction, OrderEvent, OrderSnapshot};

use crate::orders::traits::EventApplier;

mod customer_confirmed;
mod item_cancelled;
mod item_status_changed;
mod items_added;
mod order_created;
mod order_resubmitted;
mod order_status_changed;
mod preparation_started;
mod staff_responded;

pub use customer_confirmed::CustomerConfirmedApplier;
pub use item_cancelled::ItemCancelledApplier;
pub use item_status_changed::ItemStatusChangedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_created::OrderCreatedApplier;
pub use order_resubmitted::OrderResubmittedApplier;
pub use order_status_changed::OrderStatusChangedApplier;
pub use preparation_started::PreparationStartedApplier;
pub use staff_responded::StaffRespondedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemCancelled(ItemCancelledApplier),
    OrderResubmitted(OrderResubmittedApplier),
    OrderStatusChanged(OrderStatusChangedApplier),
    StaffResponded(StaffRespondedApplier),
    CustomerConfirmed(CustomerConfirmedApplier),
    PreparationStarted(PreparationStartedApplier),
    ItemStatusChanged(ItemStatusChangedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemCancelled { .. } => {
                EventAction::ItemCancelled(ItemCancelledApplier)
            }
            EventPayload::OrderResubmitted { .. } => {
                EventAction::OrderResubmitted(OrderResubmittedApplier)
            }
            EventPayload::OrderStatusChanged { .. } => {
                EventAction::OrderStatusChanged(OrderStatusChangedApplier)
            }
            EventPayload::StaffResponded { .. } => {
                EventAction::StaffResponded(StaffRespondedApplier)
            }
            EventPayload::CustomerConfirmed { .. } => {
                EventAction::CustomerConfirmed(CustomerConfirmedApplier)
            }
            EventPayload::PreparationStarted { .. } => {
                EventAction::PreparationStarted(PreparationStartedApplier)
            }
            EventPayload::ItemStatusChanged { .. } => {
                EventAction::ItemStatusChanged(ItemStatusChangedApplier)
            }
        }
    }
}

/// Advance sequence and timestamp after applying an event
pub(crate) fn touch(snapshot: &mut OrderSnapshot, event: &OrderEvent) {
    snapshot.last_sequence = event.sequence;
    snapshot.updated_at = event.timestamp;
}

/// Append one entry to the confirmation history
pub(crate) fn record(
    snapshot: &mut OrderSnapshot,
    event: &OrderEvent,
    action: HistoryAction,
    details: Option<String>,
) {
    snapshot.confirmation_history.push(ConfirmationEntry {
        action,
        timestamp: event.timestamp,
        details,
    });
}
