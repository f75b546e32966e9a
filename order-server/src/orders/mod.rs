//! Order ledger
//!
//! Orders are event sourced:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence layer for events, snapshots, and indices
//! - **actions**: one command handler per ledger operation
//! - **appliers**: one pure applier per event type
//! - **rules**: state machine guards shared by actions and appliers
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!        SubscriptionHub forwarder
//! ```

// Declared first: appliers dispatch through the EventApplier trait
pub mod traits;

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod rules;
pub mod storage;

// Re-exports
pub use manager::{CommittedEvent, ManagerError, ManagerResult, Operator, OrdersManager};
pub use storage::OrderStorage;
pub use traits::OrderError;

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, EventPayload, OrderCommand, OrderCommandPayload, OrderEvent,
    OrderEventType, OrderSnapshot, OrderStatus,
};
