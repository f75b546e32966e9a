//! Event broadcaster
//!
//! ```text
//! OrdersManager ── broadcast<CommittedEvent> ──► forwarder ──► SubscriptionHub
//!                                                                  │
//!                              heartbeat ──► sweep                 ├── order channels
//!                                                                  └── role groups
//!                                                                        │
//!                                       session (one per WebSocket) ◄────┘
//! ```

pub mod forwarder;
pub mod heartbeat;
pub mod notify;
pub mod session;
pub mod subscriptions;

pub use forwarder::{run_forwarder, spawn_forwarder};
pub use heartbeat::{DEFAULT_HEARTBEAT_INTERVAL, run_heartbeat, spawn_heartbeat};
pub use notify::{Notifications, notifications_for};
pub use session::{SessionContext, run_session};
pub use subscriptions::{Connection, DEFAULT_QUEUE_CAPACITY, HubError, Outbound, SubscriptionHub};
