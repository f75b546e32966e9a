//! WebSocket session
//!
//! One task per connection: writes whatever the hub queues for it, reads
//! client frames and answers them through the same queue so replies and
//! pushes stay in order.
//!
//! Subscribing needs the same read access as `GET /api/orders/{id}`.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use shared::{ClientMessage, Role, ServerMessage};

use super::{Connection, Outbound, SubscriptionHub};
use crate::auth::CurrentUser;
use crate::auth::permissions::{ensure_order_access, is_staff};
use crate::orders::OrdersManager;
use crate::utils::AppResult;

/// Who is on the other end of a connection
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub hub: SubscriptionHub,
    pub orders: OrdersManager,
    pub user: Option<CurrentUser>,
}

impl SessionContext {
    pub fn role(&self) -> Role {
        self.user.as_ref().map_or(Role::Guest, |u| u.role)
    }

    /// Staff watch any order; diners only orders they may read
    fn ensure_may_watch(&self, order_id: &str) -> AppResult<()> {
        if self.user.as_ref().is_some_and(|u| is_staff(&u.role)) {
            return Ok(());
        }
        let order = self.orders.get_order(order_id)?;
        ensure_order_access(self.user.as_ref(), &order)
    }
}

/// Drive one connection until either side closes or the hub terminates it
pub async fn run_session(socket: WebSocket, ctx: SessionContext) {
    let hub = &ctx.hub;
    let role = ctx.role();
    let Connection {
        id,
        mut rx,
        shutdown,
    } = hub.register(role);
    let (mut sink, mut stream) = socket.split();

    tracing::info!(connection_id = %id, role = %role, "WS connected");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,

            outbound = rx.recv() => {
                let frame = match outbound {
                    Some(Outbound::Message(msg)) => match serde_json::to_string(&msg) {
                        Ok(text) => Message::Text(text.into()),
                        Err(e) => {
                            tracing::warn!(
                                connection_id = %id,
                                error = %e,
                                "Failed to encode message"
                            );
                            continue;
                        }
                    },
                    Some(Outbound::Probe) => Message::Ping(Default::default()),
                    None => break,
                };
                if sink.send(frame).await.is_err() {
                    break;
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(frame)) => {
                        // Any frame answers the heartbeat
                        hub.mark_alive(&id);
                        match frame {
                            Message::Text(text) => {
                                let reply = handle_client_text(&ctx, &id, text.as_str());
                                hub.send_to(&id, reply);
                            }
                            Message::Close(_) => break,
                            _ => {}
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %id, error = %e, "WS read error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    hub.unregister(&id);
    let _ = sink.close().await;
    tracing::info!(connection_id = %id, "WS disconnected");
}

/// Apply one client message and build the reply
pub fn handle_client_text(ctx: &SessionContext, connection_id: &str, text: &str) -> ServerMessage {
    let hub = &ctx.hub;
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => return ServerMessage::error(format!("Invalid message: {}", e)),
    };

    match message {
        ClientMessage::Subscribe { order_id } => {
            if let Err(e) = ctx.ensure_may_watch(&order_id) {
                tracing::warn!(
                    connection_id = %connection_id,
                    order_id = %order_id,
                    error = %e,
                    "Subscription refused"
                );
                return ServerMessage::error(e.to_string());
            }
            subscribe(hub, connection_id, order_id)
        }
        ClientMessage::Unsubscribe { order_id } => {
            hub.unsubscribe(connection_id, &order_id);
            ServerMessage::Unsubscribed { order_id }
        }
        ClientMessage::Ping => ServerMessage::Pong,
        ClientMessage::Announce { role } => match hub.announce(connection_id, role) {
            Ok(()) => ServerMessage::Announced { role },
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Announcement refused");
                ServerMessage::error(e.to_string())
            }
        },
    }
}

fn subscribe(hub: &SubscriptionHub, connection_id: &str, order_id: String) -> ServerMessage {
    match hub.subscribe(connection_id, &order_id) {
        Ok(previous) => {
            tracing::debug!(
                connection_id = %connection_id,
                order_id = %order_id,
                previous = ?previous,
                "Subscribed"
            );
            ServerMessage::Subscribed { order_id }
        }
        Err(e) => ServerMessage::error(e.to_string()),
    }
}
