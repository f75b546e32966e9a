//! Shared types for the order lifecycle services
//!
//! Domain types (orders, items, payments), the ledger's command and event
//! vocabulary, the live update protocol and the HTTP response envelope.

pub mod message;
pub mod models;
pub mod order;
pub mod response;
pub mod util;

// Re-exports
pub use message::{ClientMessage, NotificationType, ServerMessage};
pub use models::{Role, RoleGroup};
pub use response::{API_CODE_SUCCESS, ApiResponse};
pub use serde::{Deserialize, Serialize};
