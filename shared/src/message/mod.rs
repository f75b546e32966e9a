//! Live update protocol between the subscription hub and its connections
//!
//! Text frames carry JSON envelopes tagged by `type`:
//!
//! ```json
//! {"type":"subscribe","orderId":"o-1"}
//! {"type":"event","eventType":"updated","orderId":"o-1","data":{...},"timestamp":1700000000000}
//! ```

use crate::models::RoleGroup;
use serde::{Deserialize, Serialize};

/// Client → hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Watch one order; replaces any previous subscription
    Subscribe { order_id: String },
    Unsubscribe { order_id: String },
    Ping,
    /// Join a role broadcast group
    Announce { role: RoleGroup },
}

/// Hub → client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Connected {
        connection_id: String,
    },
    Subscribed {
        order_id: String,
    },
    Unsubscribed {
        order_id: String,
    },
    Announced {
        role: RoleGroup,
    },
    Pong,
    Error {
        message: String,
    },
    Event {
        event_type: NotificationType,
        order_id: String,
        data: serde_json::Value,
        timestamp: i64,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Build an event push
    pub fn event(
        event_type: NotificationType,
        order_id: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        ServerMessage::Event {
            event_type,
            order_id: order_id.into(),
            data,
            timestamp: crate::util::now_millis(),
        }
    }
}

/// Kinds of pushed notifications
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Created,
    Updated,
    Confirmed,
    Cancelled,
    ItemStatusChanged,
    NeedsStaffReview,
    StaffApproved,
    StaffRejected,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationType::Created => "created",
            NotificationType::Updated => "updated",
            NotificationType::Confirmed => "confirmed",
            NotificationType::Cancelled => "cancelled",
            NotificationType::ItemStatusChanged => "item-status-changed",
            NotificationType::NeedsStaffReview => "needs-staff-review",
            NotificationType::StaffApproved => "staff-approved",
            NotificationType::StaffRejected => "staff-rejected",
        };
        f.write_str(s)
    }
}
