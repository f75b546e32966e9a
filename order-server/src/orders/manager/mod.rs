//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Event broadcasting after commit
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Resolve catalog lines
//!     ├─ 3. Resolve target order and take its lock
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Begin write transaction, rebase sequences
//!     ├─ 6. Apply events to the snapshot via EventApplier
//!     ├─ 7. Persist events, snapshot, item index
//!     ├─ 8. Mark command processed and commit
//!     ├─ 9. Broadcast committed event(s)
//!     └─ 10. Release the order lock, drop its entry when idle
//! ```
//!
//! Commands on the same order are serialized by a per-order lock; commands
//! on different orders only contend for the short commit transaction.

mod error;
mod operations;

pub use error::*;
pub use operations::Operator;

use super::actions::{
    AddItemsAction, CancelItemAction, CommandAction, CreateOrderAction, CustomerConfirmAction,
    MarkItemReadyAction, ResolvedLine, ResubmitAction, SetItemStatusAction, SetOrderStatusAction,
    StaffRespondAction, StartPreparingAction,
};
use super::appliers::EventAction;
use super::storage::{OrderStorage, StorageStats};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier};
use crate::services::CatalogLookup;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::order::{
    CartLine, OrderCommand, OrderCommandPayload, OrderEvent, OrderItem, OrderSnapshot, OrderStatus,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default event broadcast channel capacity
pub const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// An event together with the order state right after it was committed
#[derive(Debug, Clone)]
pub struct CommittedEvent {
    pub event: OrderEvent,
    pub order: OrderSnapshot,
}

/// OrdersManager for command processing
#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<dyn CatalogLookup>,
    event_tx: broadcast::Sender<CommittedEvent>,
    order_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("locked_orders", &self.order_locks.len())
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        tracing::info!("OrdersManager started");
        Ok(Self::with_storage(storage, catalog))
    }

    /// Create an OrdersManager with existing storage
    pub fn with_storage(storage: OrderStorage, catalog: Arc<dyn CatalogLookup>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            catalog,
            event_tx,
            order_locks: Arc::new(DashMap::new()),
        }
    }

    /// Replace the broadcast channel with one of the given capacity
    ///
    /// Must be called before anyone subscribes.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        self.event_tx = event_tx;
        self
    }

    /// Subscribe to committed events
    pub fn subscribe(&self) -> broadcast::Receiver<CommittedEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute a command and return the resulting order
    ///
    /// A duplicate `command_id` returns the current order without
    /// re-executing or broadcasting anything.
    pub fn execute_command(&self, cmd: OrderCommand) -> ManagerResult<OrderSnapshot> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before locking)
        if let Some(order_id) = self.storage.command_order(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return self.require_snapshot(&order_id);
        }

        // 2. Resolve catalog lines outside the lock
        let resolved = self.resolve_lines(cmd.payload.cart_lines())?;

        // 3. Resolve the target order and serialize on it
        let order_id = self.target_order(&cmd.payload)?;
        let lock = self.order_lock(&order_id);
        let result = {
            let _guard = lock.lock();
            self.process_locked(&cmd, &order_id, resolved)
                .map(|(snapshot, events)| {
                    // Sent under the order lock so one order's stream keeps commit order
                    self.broadcast(&snapshot, events);
                    snapshot
                })
        };
        drop(lock);
        self.release_lock(&order_id);
        result
    }

    /// Execute an item-scoped command and return the updated item
    pub fn execute_item_command(&self, cmd: OrderCommand) -> ManagerResult<OrderItem> {
        let item_id = cmd
            .payload
            .item_id()
            .map(str::to_string)
            .ok_or_else(|| ManagerError::Validation("command is not item-scoped".to_string()))?;

        let snapshot = self.execute_command(cmd)?;
        snapshot
            .find_item(&item_id)
            .cloned()
            .ok_or(ManagerError::ItemNotFound(item_id))
    }

    /// Steps 4-8 of the command flow; the caller holds the order lock
    fn process_locked(
        &self,
        cmd: &OrderCommand,
        order_id: &str,
        resolved: Vec<ResolvedLine>,
    ) -> ManagerResult<(OrderSnapshot, Vec<OrderEvent>)> {
        // 4. Validate against the current snapshot and generate events
        let mut ctx = CommandContext::new(&self.storage);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_role: cmd.operator_role,
            timestamp: cmd.timestamp,
        };
        let action = build_action(&cmd.payload, order_id, resolved);
        let mut events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(|e| ManagerError::from(e).with_current(self.current_snapshot(order_id)))?;

        let mut snapshot = match &cmd.payload {
            OrderCommandPayload::CreateOrder { .. } => OrderSnapshot::new(order_id.to_string()),
            _ => ctx.load_snapshot(order_id)?,
        };

        // 5. Begin write transaction
        let txn = self.storage.write()?;

        // Double-check idempotency within transaction. A racing create-order
        // retry generated its own id, so answer with the logged order.
        if let Some(committed_order) = txn.processed_order(&cmd.command_id)? {
            txn.abort()?;
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command (raced)");
            return Ok((self.require_snapshot(&committed_order)?, vec![]));
        }

        let current_sequence = txn.sequence()?;
        let items_before: HashSet<String> =
            snapshot.items.iter().map(|i| i.item_id.clone()).collect();

        // 6. Rebase provisional sequences and apply
        for event in events.iter_mut() {
            event.sequence += current_sequence;
            let applier: EventAction = (&*event).into();
            applier.apply(&mut snapshot, event);
        }

        // 7. Persist events, snapshot, item index
        for event in &events {
            txn.append_event(event)?;
        }
        txn.put_order(&snapshot)?;

        let items_after: HashSet<&str> =
            snapshot.items.iter().map(|i| i.item_id.as_str()).collect();
        for item_id in &items_after {
            if !items_before.contains(*item_id) {
                txn.set_item_owner(item_id, order_id)?;
            }
        }
        for item_id in &items_before {
            if !items_after.contains(item_id.as_str()) {
                txn.clear_item_owner(item_id)?;
            }
        }

        if let Some(last) = events.last() {
            txn.set_sequence(last.sequence)?;
        }

        // 8. Mark command processed and commit
        txn.record_command(&cmd.command_id, order_id)?;
        txn.commit()?;

        for event in &events {
            tracing::info!(
                order_id = %order_id,
                command_id = %cmd.command_id,
                sequence = event.sequence,
                event_type = %event.event_type,
                status = %snapshot.status,
                "Order event committed"
            );
        }

        Ok((snapshot, events))
    }

    /// Look up every cart line in the catalog
    fn resolve_lines(&self, lines: Vec<&CartLine>) -> ManagerResult<Vec<ResolvedLine>> {
        lines
            .into_iter()
            .map(|line| {
                let entry = self
                    .catalog
                    .lookup(&line.catalog)
                    .ok_or_else(|| ManagerError::CatalogEntryNotFound(line.catalog.to_string()))?;
                Ok(ResolvedLine {
                    line: line.clone(),
                    entry,
                })
            })
            .collect()
    }

    /// Order a command targets; create-order gets a fresh id
    fn target_order(&self, payload: &OrderCommandPayload) -> ManagerResult<String> {
        if let Some(order_id) = payload.order_id() {
            return Ok(order_id.to_string());
        }
        if let Some(item_id) = payload.item_id() {
            return self
                .storage
                .item_owner(item_id)?
                .ok_or_else(|| ManagerError::ItemNotFound(item_id.to_string()));
        }
        Ok(shared::util::prefixed_id("ord"))
    }

    fn order_lock(&self, order_id: &str) -> Arc<Mutex<()>> {
        self.order_locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the lock entry once no command holds or waits on it
    fn release_lock(&self, order_id: &str) {
        self.order_locks
            .remove_if(order_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn broadcast(&self, snapshot: &OrderSnapshot, events: Vec<OrderEvent>) {
        for event in events {
            let committed = CommittedEvent {
                event,
                order: snapshot.clone(),
            };
            if self.event_tx.send(committed).is_err() {
                tracing::debug!("Event broadcast skipped: no active receivers");
                break;
            }
        }
    }

    /// Number of orders with a live lock entry
    pub fn locked_orders(&self) -> usize {
        self.order_locks.len()
    }

    fn current_snapshot(&self, order_id: &str) -> Option<OrderSnapshot> {
        self.storage.order(order_id).ok().flatten()
    }

    fn require_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        self.storage
            .order(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    // ========== Queries ==========

    /// Get an order snapshot
    pub fn get_snapshot(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        Ok(self.storage.order(order_id)?)
    }

    /// List orders, optionally filtered by status, oldest first
    pub fn list_orders(&self, status: Option<OrderStatus>) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.orders(status)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.events(order_id)?)
    }

    /// Rebuild a snapshot from events (for verification)
    ///
    /// Uses EventApplier to apply each event to build the snapshot.
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        let events = self.storage.events(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
        }

        Ok(snapshot)
    }

    pub fn stats(&self) -> ManagerResult<StorageStats> {
        Ok(self.storage.stats()?)
    }
}

/// Convert a command payload into its action
fn build_action(
    payload: &OrderCommandPayload,
    order_id: &str,
    resolved: Vec<ResolvedLine>,
) -> CommandAction {
    let order_id = order_id.to_string();
    match payload {
        OrderCommandPayload::CreateOrder {
            table_id,
            customer_id,
            payment_method,
            ..
        } => CommandAction::CreateOrder(CreateOrderAction {
            order_id,
            table_id: table_id.clone(),
            customer_id: customer_id.clone(),
            lines: resolved,
            payment_method: *payment_method,
        }),
        OrderCommandPayload::AddItems { .. } => CommandAction::AddItems(AddItemsAction {
            order_id,
            lines: resolved,
        }),
        OrderCommandPayload::CancelItem { item_id, .. } => {
            CommandAction::CancelItem(CancelItemAction {
                order_id,
                item_id: item_id.clone(),
            })
        }
        OrderCommandPayload::Resubmit { changes, .. } => CommandAction::Resubmit(ResubmitAction {
            order_id,
            add: resolved,
            remove: changes.remove.clone(),
            quantity: changes.quantity.clone(),
        }),
        OrderCommandPayload::SetOrderStatus {
            status,
            payment_method,
            ..
        } => CommandAction::SetOrderStatus(SetOrderStatusAction {
            order_id,
            status: *status,
            payment_method: *payment_method,
        }),
        OrderCommandPayload::StaffRespond {
            approved, reason, ..
        } => CommandAction::StaffRespond(StaffRespondAction {
            order_id,
            approved: *approved,
            reason: reason.clone(),
        }),
        OrderCommandPayload::CustomerConfirm { .. } => {
            CommandAction::CustomerConfirm(CustomerConfirmAction { order_id })
        }
        OrderCommandPayload::StartPreparing { .. } => {
            CommandAction::StartPreparing(StartPreparingAction { order_id })
        }
        OrderCommandPayload::SetItemStatus { item_id, status } => {
            CommandAction::SetItemStatus(SetItemStatusAction {
                order_id,
                item_id: item_id.clone(),
                status: *status,
            })
        }
        OrderCommandPayload::MarkItemReady {
            item_id,
            preparer_id,
        } => CommandAction::MarkItemReady(MarkItemReadyAction {
            order_id,
            item_id: item_id.clone(),
            preparer_id: preparer_id.clone(),
        }),
    }
}

#[cfg(test)]
mod tests;
