//! Ledger → hub forwarder
//!
//! A single task consumes committed events in commit order, so pushes for
//! one order reach its subscribers in the order they were committed.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::SubscriptionHub;
use super::notify::notifications_for;
use crate::orders::CommittedEvent;

/// Spawn the forwarder task
pub fn spawn_forwarder(
    source: broadcast::Receiver<CommittedEvent>,
    hub: SubscriptionHub,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_forwarder(source, hub, shutdown))
}

/// Run until the source closes or shutdown is requested
pub async fn run_forwarder(
    mut source: broadcast::Receiver<CommittedEvent>,
    hub: SubscriptionHub,
    shutdown: CancellationToken,
) {
    tracing::info!("Event forwarder started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Event forwarder shutting down");
                break;
            }
            received = source.recv() => match received {
                Ok(committed) => forward(&hub, &committed),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Best-effort delivery: skipped pushes are not replayed
                    tracing::warn!(skipped = n, "Event forwarder lagged, notifications skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Ledger channel closed, event forwarder stopping");
                    break;
                }
            }
        }
    }
}

fn forward(hub: &SubscriptionHub, committed: &CommittedEvent) {
    let notifications = notifications_for(&committed.event, &committed.order);
    let reached = hub.publish_to_order(&committed.event.order_id, &notifications.order);

    if let Some((group, message)) = &notifications.group {
        let members = hub.publish_to_group(*group, message);
        tracing::debug!(
            order_id = %committed.event.order_id,
            event_type = %committed.event.event_type,
            subscribers = reached,
            group = %group,
            members,
            "Forwarded event"
        );
    } else {
        tracing::debug!(
            order_id = %committed.event.order_id,
            event_type = %committed.event.event_type,
            subscribers = reached,
            "Forwarded event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Outbound;
    use crate::orders::appliers::test_support::{event, snapshot};
    use shared::order::{EventPayload, OrderEventType, OrderStatus};
    use shared::{NotificationType, Role, RoleGroup, ServerMessage};
    use std::time::Duration;

    async fn next_event(rx: &mut tokio::sync::mpsc::Receiver<Outbound>) -> NotificationType {
        loop {
            let item = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timed out")
                .expect("closed");
            if let Outbound::Message(ServerMessage::Event { event_type, .. }) = item {
                return event_type;
            }
        }
    }

    #[tokio::test]
    async fn test_forwards_to_order_and_group() {
        let hub = SubscriptionHub::default();
        let mut diner = hub.register(Role::Customer);
        let mut kitchen = hub.register(Role::Kitchen);
        hub.subscribe(&diner.id, "order-1").unwrap();
        hub.announce(&kitchen.id, RoleGroup::Kitchen).unwrap();

        let (tx, rx) = broadcast::channel(16);
        let shutdown = CancellationToken::new();
        let handle = spawn_forwarder(rx, hub.clone(), shutdown.clone());

        tx.send(CommittedEvent {
            event: event(
                5,
                OrderEventType::CustomerConfirmed,
                EventPayload::CustomerConfirmed {},
            ),
            order: snapshot(OrderStatus::Confirmed, vec![]),
        })
        .unwrap();

        assert_eq!(next_event(&mut diner.rx).await, NotificationType::Confirmed);
        assert_eq!(next_event(&mut kitchen.rx).await, NotificationType::Confirmed);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_ledger_closes() {
        let (tx, rx) = broadcast::channel::<CommittedEvent>(4);
        let handle = spawn_forwarder(rx, SubscriptionHub::default(), CancellationToken::new());
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("forwarder did not stop")
            .unwrap();
    }
}
