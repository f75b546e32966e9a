//! Core traits of the command pipeline
//!
//! - [`CommandHandler`]: validates a command against the current snapshot and
//!   emits the events describing its effect (no mutation)
//! - [`EventApplier`]: folds one event into a snapshot (pure)
//! - [`CommandContext`]: snapshot cache and provisional sequence allocator
//!   shared by a single command execution

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use shared::Role;
use shared::order::{OrderEvent, OrderSnapshot};
use std::collections::HashMap;
use thiserror::Error;

use super::storage::OrderStorage;

/// Errors raised while validating a command
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Catalog entry not found: {0}")]
    CatalogEntryNotFound(String),

    /// The order's current state does not allow the operation
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Who issued a command and when
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_role: Role,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Per-command execution context
///
/// Snapshots are loaded once and cached; sequence numbers handed out here are
/// provisional (1, 2, ...) and rebased onto the global counter at commit.
pub struct CommandContext<'a> {
    storage: &'a OrderStorage,
    snapshots: HashMap<String, OrderSnapshot>,
    next_sequence: u64,
}

impl<'a> CommandContext<'a> {
    pub fn new(storage: &'a OrderStorage) -> Self {
        Self {
            storage,
            snapshots: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Load an order snapshot (cached after the first read)
    pub fn load_snapshot(&mut self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.snapshots.get(order_id) {
            return Ok(snapshot.clone());
        }
        let snapshot = self
            .storage
            .order(order_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        self.snapshots
            .insert(order_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    /// Provisional sequence for the next event of this command
    pub fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }
}

/// Command handler: turns a command into events
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier: folds one event into a snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
