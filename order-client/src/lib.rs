//! Order Client - HTTP and live-update client for the order server
//!
//! - [`HttpClient`]: typed calls to the order API ([`OrderApi`])
//! - [`EditReconciler`]: stages a customer's edits and resubmits them as
//!   one minimal change set
//! - [`LiveSubscription`]: WebSocket subscription to one order that
//!   reconnects on its own

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod reconciler;
pub mod subscription;

pub use api::OrderApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use reconciler::{DisplayRow, EditError, EditReconciler, RowKey, StagedItem};
pub use subscription::{LiveSubscription, SubscriptionEvent};

// Re-export shared types for convenience
pub use shared::ApiResponse;
pub use shared::order::{ItemChanges, OrderItem, OrderSnapshot};
