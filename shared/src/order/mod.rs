//! Order Event Sourcing Module
//!
//! This module provides types for the order event sourcing system:
//! - Commands: Requests from clients to modify orders
//! - Events: Immutable facts recorded after command processing
//! - Snapshots: Authoritative order state computed from the event stream
//! - Requests: HTTP bodies accepted by the order API

pub mod command;
pub mod event;
pub mod request;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use request::*;
pub use snapshot::OrderSnapshot;
pub use types::*;
