//! Committed event → push notifications
//!
//! | event | order channel | role group |
//! |-------|---------------|------------|
//! | OrderCreated | created | floor-staff: needs-staff-review |
//! | ItemsAdded, ItemCancelled, OrderResubmitted | updated | floor-staff: needs-staff-review |
//! | StaffResponded | staff-approved / staff-rejected | |
//! | CustomerConfirmed | confirmed | kitchen: confirmed |
//! | PreparationStarted | updated | |
//! | OrderStatusChanged → cancelled | cancelled | kitchen: cancelled |
//! | OrderStatusChanged (other) | updated | |
//! | ItemStatusChanged | item-status-changed | |

use serde_json::json;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};
use shared::{NotificationType, RoleGroup, ServerMessage};

/// Pushes produced by one committed event
#[derive(Debug, Clone, PartialEq)]
pub struct Notifications {
    pub order: ServerMessage,
    pub group: Option<(RoleGroup, ServerMessage)>,
}

/// Map a committed event and the resulting order to its pushes
pub fn notifications_for(event: &OrderEvent, order: &OrderSnapshot) -> Notifications {
    let order_json = json!({ "order": order });

    let (kind, data, group) = match &event.payload {
        EventPayload::OrderCreated { .. } => (
            NotificationType::Created,
            order_json,
            Some((RoleGroup::FloorStaff, NotificationType::NeedsStaffReview)),
        ),
        EventPayload::ItemsAdded { .. }
        | EventPayload::ItemCancelled { .. }
        | EventPayload::OrderResubmitted { .. } => (
            NotificationType::Updated,
            order_json,
            Some((RoleGroup::FloorStaff, NotificationType::NeedsStaffReview)),
        ),
        EventPayload::StaffResponded {
            approved: true, ..
        } => (NotificationType::StaffApproved, order_json, None),
        EventPayload::StaffResponded {
            approved: false,
            reason,
            ..
        } => (
            NotificationType::StaffRejected,
            json!({ "order": order, "reason": reason }),
            None,
        ),
        EventPayload::CustomerConfirmed {} => (
            NotificationType::Confirmed,
            order_json,
            Some((RoleGroup::Kitchen, NotificationType::Confirmed)),
        ),
        EventPayload::PreparationStarted { .. } => (NotificationType::Updated, order_json, None),
        EventPayload::OrderStatusChanged {
            to: OrderStatus::Cancelled,
            ..
        } => (
            NotificationType::Cancelled,
            order_json,
            Some((RoleGroup::Kitchen, NotificationType::Cancelled)),
        ),
        EventPayload::OrderStatusChanged { .. } => (NotificationType::Updated, order_json, None),
        EventPayload::ItemStatusChanged { item_id, .. } => (
            NotificationType::ItemStatusChanged,
            json!({ "order": order, "item": order.find_item(item_id) }),
            None,
        ),
    };

    let group = group.map(|(group, group_kind)| {
        let data = json!({ "order": order });
        (
            group,
            ServerMessage::event(group_kind, &event.order_id, data),
        )
    });

    Notifications {
        order: ServerMessage::event(kind, &event.order_id, data),
        group,
    }
}
