//! Ledger persistence on redb
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `order_events` | `(order_id, sequence)` | JSON [`OrderEvent`] |
//! | `order_snapshots` | `order_id` | JSON [`OrderSnapshot`] |
//! | `item_owner` | `item_id` | `order_id` |
//! | `command_log` | `command_id` | `order_id` |
//! | `ledger_meta` | `"sequence"` | `u64` |
//!
//! Writes go through [`LedgerTxn`]; a command's events, its snapshot, the
//! item index and the command log entry land in one commit.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::order::{OrderEvent, OrderSnapshot, OrderStatus};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const ORDER_EVENTS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("order_events");
const ORDER_SNAPSHOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("order_snapshots");
const ITEM_OWNER: TableDefinition<&str, &str> = TableDefinition::new("item_owner");
const COMMAND_LOG: TableDefinition<&str, &str> = TableDefinition::new("command_log");
const LEDGER_META: TableDefinition<&str, u64> = TableDefinition::new("ledger_meta");

const SEQUENCE: &str = "sequence";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Corrupt record: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Durable home of events and snapshots
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open (or create) a database file
    ///
    /// A returned commit is durable: redb defaults to immediate durability.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::prepare(Database::create(path)?)
    }

    /// Throwaway database kept in memory
    pub fn open_in_memory() -> StorageResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        Self::prepare(Database::builder().create_with_backend(backend)?)
    }

    fn prepare(db: Database) -> StorageResult<Self> {
        let txn = db.begin_write()?;
        txn.open_table(ORDER_EVENTS)?;
        txn.open_table(ORDER_SNAPSHOTS)?;
        txn.open_table(ITEM_OWNER)?;
        txn.open_table(COMMAND_LOG)?;
        txn.open_table(LEDGER_META)?;
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Start a ledger write
    pub fn write(&self) -> StorageResult<LedgerTxn> {
        Ok(LedgerTxn {
            txn: self.db.begin_write()?,
        })
    }

    /// Highest committed event sequence (0 before the first event)
    pub fn sequence(&self) -> StorageResult<u64> {
        let read = self.db.begin_read()?;
        let meta = read.open_table(LEDGER_META)?;
        Ok(meta.get(SEQUENCE)?.map_or(0, |v| v.value()))
    }

    /// Order touched by an already processed command
    pub fn command_order(&self, command_id: &str) -> StorageResult<Option<String>> {
        let read = self.db.begin_read()?;
        let log = read.open_table(COMMAND_LOG)?;
        Ok(log.get(command_id)?.map(|v| v.value().to_owned()))
    }

    pub fn order(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read = self.db.begin_read()?;
        let snapshots = read.open_table(ORDER_SNAPSHOTS)?;
        snapshots
            .get(order_id)?
            .map(|v| decode(v.value()))
            .transpose()
    }

    /// Orders in creation order, optionally with one status only
    pub fn orders(&self, status: Option<OrderStatus>) -> StorageResult<Vec<OrderSnapshot>> {
        let read = self.db.begin_read()?;
        let snapshots = read.open_table(ORDER_SNAPSHOTS)?;

        let mut orders = Vec::new();
        for entry in snapshots.iter()? {
            let (_, value) = entry?;
            let order: OrderSnapshot = decode(value.value())?;
            if status.is_none_or(|s| s == order.status) {
                orders.push(order);
            }
        }
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    /// Event history of one order, by ascending sequence
    pub fn events(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read = self.db.begin_read()?;
        let events = read.open_table(ORDER_EVENTS)?;
        events
            .range((order_id, 0)..=(order_id, u64::MAX))?
            .map(|entry| decode(entry?.1.value()))
            .collect()
    }

    /// Order that owns an item
    pub fn item_owner(&self, item_id: &str) -> StorageResult<Option<String>> {
        let read = self.db.begin_read()?;
        let owners = read.open_table(ITEM_OWNER)?;
        Ok(owners.get(item_id)?.map(|v| v.value().to_owned()))
    }

    pub fn stats(&self) -> StorageResult<StorageStats> {
        let read = self.db.begin_read()?;
        let meta = read.open_table(LEDGER_META)?;
        Ok(StorageStats {
            event_count: read.open_table(ORDER_EVENTS)?.len()?,
            order_count: read.open_table(ORDER_SNAPSHOTS)?.len()?,
            processed_command_count: read.open_table(COMMAND_LOG)?.len()?,
            current_sequence: meta.get(SEQUENCE)?.map_or(0, |v| v.value()),
        })
    }
}

/// One atomic ledger write
///
/// Dropping it without [`LedgerTxn::commit`] discards everything.
pub struct LedgerTxn {
    txn: WriteTransaction,
}

impl LedgerTxn {
    pub fn sequence(&self) -> StorageResult<u64> {
        let meta = self.txn.open_table(LEDGER_META)?;
        Ok(meta.get(SEQUENCE)?.map_or(0, |v| v.value()))
    }

    pub fn set_sequence(&self, sequence: u64) -> StorageResult<()> {
        self.txn.open_table(LEDGER_META)?.insert(SEQUENCE, sequence)?;
        Ok(())
    }

    /// Order of an already committed command (read under the write lock)
    pub fn processed_order(&self, command_id: &str) -> StorageResult<Option<String>> {
        let log = self.txn.open_table(COMMAND_LOG)?;
        let order_id = log.get(command_id)?.map(|v| v.value().to_owned());
        Ok(order_id)
    }

    pub fn record_command(&self, command_id: &str, order_id: &str) -> StorageResult<()> {
        self.txn.open_table(COMMAND_LOG)?.insert(command_id, order_id)?;
        Ok(())
    }

    pub fn append_event(&self, event: &OrderEvent) -> StorageResult<()> {
        let bytes = encode(event)?;
        let mut events = self.txn.open_table(ORDER_EVENTS)?;
        events.insert((event.order_id.as_str(), event.sequence), bytes.as_slice())?;
        Ok(())
    }

    pub fn put_order(&self, order: &OrderSnapshot) -> StorageResult<()> {
        let bytes = encode(order)?;
        let mut snapshots = self.txn.open_table(ORDER_SNAPSHOTS)?;
        snapshots.insert(order.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    pub fn set_item_owner(&self, item_id: &str, order_id: &str) -> StorageResult<()> {
        self.txn.open_table(ITEM_OWNER)?.insert(item_id, order_id)?;
        Ok(())
    }

    pub fn clear_item_owner(&self, item_id: &str) -> StorageResult<()> {
        self.txn.open_table(ITEM_OWNER)?.remove(item_id)?;
        Ok(())
    }

    pub fn commit(self) -> StorageResult<()> {
        Ok(self.txn.commit()?)
    }

    pub fn abort(self) -> StorageResult<()> {
        Ok(self.txn.abort()?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub event_count: u64,
    pub order_count: u64,
    pub processed_command_count: u64,
    pub current_sequence: u64,
}
