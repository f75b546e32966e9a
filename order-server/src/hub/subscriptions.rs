//! Connection and subscription registry
//!
//! ```text
//! by_order:      order_id ──► {connection_id}
//! by_connection: connection_id ──► order_id      (at most one)
//! groups:        floor-staff | kitchen ──► {connection_id}
//! ```
//!
//! Every connection owns a bounded outbound queue. Publishing never blocks:
//! a connection whose queue is full or closed is dropped from the set it was
//! being published to.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::util::prefixed_id;
use shared::{Role, RoleGroup, ServerMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default per-connection outbound queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Hub errors
#[derive(Debug, Error, PartialEq)]
pub enum HubError {
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Role {role} may not join {group}")]
    Forbidden { role: Role, group: RoleGroup },
}

/// Item queued for a connection's writer
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(ServerMessage),
    /// Liveness probe, written as a WebSocket ping
    Probe,
}

/// Receiving half handed to the session task
#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub rx: mpsc::Receiver<Outbound>,
    /// Cancelled when the hub terminates the connection
    pub shutdown: CancellationToken,
}

struct ConnectionHandle {
    tx: mpsc::Sender<Outbound>,
    /// Cleared by each heartbeat, set again by any client frame
    alive: Arc<AtomicBool>,
    shutdown: CancellationToken,
    role: Role,
}

#[derive(Default)]
struct Registry {
    by_order: HashMap<String, HashSet<String>>,
    by_connection: HashMap<String, String>,
    groups: HashMap<RoleGroup, HashSet<String>>,
}

impl Registry {
    /// Remove the connection's order subscription, returning the order
    fn detach(&mut self, connection_id: &str) -> Option<String> {
        let order_id = self.by_connection.remove(connection_id)?;
        if let Some(set) = self.by_order.get_mut(&order_id) {
            set.remove(connection_id);
            if set.is_empty() {
                self.by_order.remove(&order_id);
            }
        }
        Some(order_id)
    }

    fn purge(&mut self, connection_id: &str) {
        self.detach(connection_id);
        self.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }
}

struct HubInner {
    connections: DashMap<String, ConnectionHandle>,
    registry: Mutex<Registry>,
    queue_capacity: usize,
}

/// Pub/sub hub for live order updates
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct SubscriptionHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for SubscriptionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHub")
            .field("connections", &self.inner.connections.len())
            .field("queue_capacity", &self.inner.queue_capacity)
            .finish()
    }
}

impl Default for SubscriptionHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl SubscriptionHub {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: DashMap::new(),
                registry: Mutex::new(Registry::default()),
                queue_capacity: queue_capacity.max(1),
            }),
        }
    }

    /// Register a new connection and queue its `connected` greeting
    pub fn register(&self, role: Role) -> Connection {
        let id = prefixed_id("conn");
        let (tx, rx) = mpsc::channel(self.inner.queue_capacity);
        let shutdown = CancellationToken::new();

        let _ = tx.try_send(Outbound::Message(ServerMessage::Connected {
            connection_id: id.clone(),
        }));

        self.inner.connections.insert(
            id.clone(),
            ConnectionHandle {
                tx,
                alive: Arc::new(AtomicBool::new(true)),
                shutdown: shutdown.clone(),
                role,
            },
        );
        tracing::debug!(connection_id = %id, role = %role, "Connection registered");

        Connection { id, rx, shutdown }
    }

    /// Forget a connection and every subscription it holds
    pub fn unregister(&self, connection_id: &str) {
        self.inner.registry.lock().purge(connection_id);
        if self.inner.connections.remove(connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Subscribe to an order, replacing any previous subscription
    ///
    /// Returns the order previously watched.
    pub fn subscribe(
        &self,
        connection_id: &str,
        order_id: &str,
    ) -> Result<Option<String>, HubError> {
        self.ensure_connected(connection_id)?;

        let mut registry = self.inner.registry.lock();
        let previous = registry.detach(connection_id);
        registry
            .by_order
            .entry(order_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
        registry
            .by_connection
            .insert(connection_id.to_string(), order_id.to_string());

        Ok(previous.filter(|p| p != order_id))
    }

    /// Drop the subscription if it targets `order_id`
    pub fn unsubscribe(&self, connection_id: &str, order_id: &str) -> bool {
        let mut registry = self.inner.registry.lock();
        if registry.by_connection.get(connection_id).map(String::as_str) == Some(order_id) {
            registry.detach(connection_id);
            true
        } else {
            false
        }
    }

    /// Join a role group; the connection's identity must hold a matching role
    pub fn announce(&self, connection_id: &str, group: RoleGroup) -> Result<(), HubError> {
        let role = self
            .inner
            .connections
            .get(connection_id)
            .map(|h| h.role)
            .ok_or_else(|| HubError::ConnectionNotFound(connection_id.to_string()))?;

        if !role.may_join(group) {
            return Err(HubError::Forbidden { role, group });
        }

        self.inner
            .registry
            .lock()
            .groups
            .entry(group)
            .or_default()
            .insert(connection_id.to_string());
        Ok(())
    }

    /// Record that the client answered (any frame counts)
    pub fn mark_alive(&self, connection_id: &str) {
        if let Some(handle) = self.inner.connections.get(connection_id) {
            handle.alive.store(true, Ordering::Relaxed);
        }
    }

    /// Queue a message for one connection
    pub fn send_to(&self, connection_id: &str, message: ServerMessage) -> bool {
        self.inner
            .connections
            .get(connection_id)
            .is_some_and(|h| h.tx.try_send(Outbound::Message(message)).is_ok())
    }

    /// Publish to every subscriber of an order; returns the number reached
    pub fn publish_to_order(&self, order_id: &str, message: &ServerMessage) -> usize {
        let targets: Vec<String> = match self.inner.registry.lock().by_order.get(order_id) {
            Some(set) => set.iter().cloned().collect(),
            None => return 0,
        };

        let (delivered, failed) = self.fan_out(&targets, message);
        if !failed.is_empty() {
            let mut registry = self.inner.registry.lock();
            for connection_id in &failed {
                // Only if still subscribed to this order
                if registry.by_connection.get(connection_id).map(String::as_str) == Some(order_id) {
                    registry.detach(connection_id);
                }
            }
            tracing::debug!(
                order_id = %order_id,
                dropped = failed.len(),
                "Dropped unreachable subscribers"
            );
        }
        delivered
    }

    /// Publish to every member of a role group; returns the number reached
    pub fn publish_to_group(&self, group: RoleGroup, message: &ServerMessage) -> usize {
        let targets: Vec<String> = match self.inner.registry.lock().groups.get(&group) {
            Some(set) => set.iter().cloned().collect(),
            None => return 0,
        };

        let (delivered, failed) = self.fan_out(&targets, message);
        if !failed.is_empty() {
            let mut registry = self.inner.registry.lock();
            if let Some(members) = registry.groups.get_mut(&group) {
                for connection_id in &failed {
                    members.remove(connection_id);
                }
                if members.is_empty() {
                    registry.groups.remove(&group);
                }
            }
        }
        delivered
    }

    fn fan_out(&self, targets: &[String], message: &ServerMessage) -> (usize, Vec<String>) {
        let mut delivered = 0;
        let mut failed = Vec::new();
        for connection_id in targets {
            let sent = self
                .inner
                .connections
                .get(connection_id)
                .is_some_and(|h| h.tx.try_send(Outbound::Message(message.clone())).is_ok());
            if sent {
                delivered += 1;
            } else {
                failed.push(connection_id.clone());
            }
        }
        (delivered, failed)
    }

    /// One heartbeat round
    ///
    /// Connections that did not answer the previous probe are terminated and
    /// purged; the rest are marked unanswered and probed. Returns the number
    /// terminated.
    pub fn heartbeat_sweep(&self) -> usize {
        let mut dead = Vec::new();
        for entry in self.inner.connections.iter() {
            let handle = entry.value();
            if !handle.alive.swap(false, Ordering::Relaxed)
                || handle.tx.try_send(Outbound::Probe).is_err()
            {
                dead.push(entry.key().clone());
            }
        }

        for connection_id in &dead {
            if let Some((_, handle)) = self.inner.connections.remove(connection_id) {
                handle.shutdown.cancel();
            }
            self.inner.registry.lock().purge(connection_id);
            tracing::info!(connection_id = %connection_id, "Terminated unresponsive connection");
        }
        dead.len()
    }

    /// Terminate every connection (server shutdown)
    pub fn close_all(&self) {
        for entry in self.inner.connections.iter() {
            entry.value().shutdown.cancel();
        }
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn subscriber_count(&self, order_id: &str) -> usize {
        self.inner
            .registry
            .lock()
            .by_order
            .get(order_id)
            .map_or(0, HashSet::len)
    }

    pub fn group_size(&self, group: RoleGroup) -> usize {
        self.inner
            .registry
            .lock()
            .groups
            .get(&group)
            .map_or(0, HashSet::len)
    }

    /// Order currently watched by a connection
    pub fn subscription_of(&self, connection_id: &str) -> Option<String> {
        self.inner
            .registry
            .lock()
            .by_connection
            .get(connection_id)
            .cloned()
    }

    fn ensure_connected(&self, connection_id: &str) -> Result<(), HubError> {
        if self.inner.connections.contains_key(connection_id) {
            Ok(())
        } else {
            Err(HubError::ConnectionNotFound(connection_id.to_string()))
        }
    }
}
