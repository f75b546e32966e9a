//! Live order subscription over the hub WebSocket
//!
//! A background task keeps one connection open, re-issuing the current
//! subscription (and role announcement) after every reconnect. The server
//! keeps no session state, so a reconnect looks like a fresh client.
//!
//! ```ignore
//! let mut live = LiveSubscription::spawn(&config);
//! live.subscribe("ord-1");
//! while let Some(event) = live.next().await {
//!     if let SubscriptionEvent::Notification { event_type, data, .. } = event { ... }
//! }
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use shared::{ClientMessage, NotificationType, RoleGroup, ServerMessage};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use crate::ClientConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Buffered events before the task waits on the consumer
const EVENT_BUFFER: usize = 256;

/// What the subscription reports to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// A (re)connection was established
    Connected { connection_id: String },
    Subscribed { order_id: String },
    Unsubscribed { order_id: String },
    Announced { role: RoleGroup },
    Pong,
    /// Pushed order change
    Notification {
        event_type: NotificationType,
        order_id: String,
        data: serde_json::Value,
        timestamp: i64,
    },
    /// Hub-side error reply
    Error { message: String },
    /// The connection dropped; a reconnect is scheduled
    Disconnected,
}

/// Capped exponential backoff
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: initial,
        }
    }

    /// Delay to wait now; the following one doubles up to the cap
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Handle to the background subscription task
pub struct LiveSubscription {
    order: watch::Sender<Option<String>>,
    group: watch::Sender<Option<RoleGroup>>,
    events: mpsc::Receiver<SubscriptionEvent>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LiveSubscription {
    /// Start connecting in the background
    pub fn spawn(config: &ClientConfig) -> Self {
        let (order, order_rx) = watch::channel(None);
        let (group, group_rx) = watch::channel(None);
        let (events_tx, events) = mpsc::channel(EVENT_BUFFER);
        let shutdown = CancellationToken::new();

        let worker = Worker {
            url: config.live_url(),
            backoff: Backoff::new(config.reconnect_delay, config.max_reconnect_delay),
            order: order_rx,
            group: group_rx,
            events: events_tx,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            order,
            group,
            events,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Watch `order_id`, replacing the current order
    pub fn subscribe(&self, order_id: impl Into<String>) {
        self.order.send_replace(Some(order_id.into()));
    }

    /// Stop watching any order
    pub fn unsubscribe(&self) {
        self.order.send_replace(None);
    }

    /// Join a role group (needs a staff token)
    pub fn announce(&self, group: RoleGroup) {
        self.group.send_replace(Some(group));
    }

    /// Order currently requested
    pub fn current_order(&self) -> Option<String> {
        self.order.borrow().clone()
    }

    /// Next event; `None` once the subscription is closed
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }

    /// Close the connection and stop reconnecting
    pub async fn close(mut self) {
        self.shutdown.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Live subscription task failed");
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Worker {
    url: String,
    backoff: Backoff,
    order: watch::Receiver<Option<String>>,
    group: watch::Receiver<Option<RoleGroup>>,
    events: mpsc::Sender<SubscriptionEvent>,
    shutdown: CancellationToken,
}

/// How a session ended
enum SessionEnd {
    Disconnected,
    Stopped,
}

impl Worker {
    async fn run(mut self) {
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            match connect_async(self.url.as_str()).await {
                Ok((ws, _)) => {
                    self.backoff.reset();
                    match self.run_session(ws).await {
                        SessionEnd::Stopped => break,
                        SessionEnd::Disconnected => {
                            if self.emit(SubscriptionEvent::Disconnected).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "Live connection failed");
                }
            }

            let delay = self.backoff.next_delay();
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        tracing::debug!("Live subscription stopped");
    }

    async fn run_session(&mut self, ws: WsStream) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        // Replay what the owner asked for before the connection existed
        let mut subscribed = self.order.borrow_and_update().clone();
        let mut replay = Vec::new();
        if let Some(role) = *self.group.borrow_and_update() {
            replay.push(ClientMessage::Announce { role });
        }
        if let Some(order_id) = &subscribed {
            replay.push(ClientMessage::Subscribe {
                order_id: order_id.clone(),
            });
        }
        for msg in replay {
            if send(&mut sink, &msg).await.is_err() {
                return SessionEnd::Disconnected;
            }
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = sink.close().await;
                    return SessionEnd::Stopped;
                }

                changed = self.order.changed() => {
                    if changed.is_err() {
                        let _ = sink.close().await;
                        return SessionEnd::Stopped;
                    }
                    let wanted = self.order.borrow_and_update().clone();
                    let msg = match (&wanted, &subscribed) {
                        (Some(order_id), _) => Some(ClientMessage::Subscribe {
                            order_id: order_id.clone(),
                        }),
                        (None, Some(previous)) => Some(ClientMessage::Unsubscribe {
                            order_id: previous.clone(),
                        }),
                        (None, None) => None,
                    };
                    subscribed = wanted;
                    if let Some(msg) = msg {
                        if send(&mut sink, &msg).await.is_err() {
                            return SessionEnd::Disconnected;
                        }
                    }
                }

                changed = self.group.changed() => {
                    if changed.is_err() {
                        let _ = sink.close().await;
                        return SessionEnd::Stopped;
                    }
                    let role = *self.group.borrow_and_update();
                    if let Some(role) = role {
                        let msg = ClientMessage::Announce { role };
                        if send(&mut sink, &msg).await.is_err() {
                            return SessionEnd::Disconnected;
                        }
                    }
                }

                incoming = stream.next() => {
                    let text = match incoming {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => return SessionEnd::Disconnected,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::debug!(error = %e, "Live connection read error");
                            return SessionEnd::Disconnected;
                        }
                    };
                    let event = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(msg) => SubscriptionEvent::from(msg),
                        Err(e) => {
                            tracing::warn!(error = %e, "Unreadable hub message");
                            continue;
                        }
                    };
                    if self.emit(event).await.is_err() {
                        let _ = sink.close().await;
                        return SessionEnd::Stopped;
                    }
                }
            }
        }
    }

    async fn emit(&self, event: SubscriptionEvent) -> Result<(), ()> {
        self.events.send(event).await.map_err(|_| ())
    }
}

async fn send<S>(sink: &mut S, msg: &ClientMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(text.into())).await.map_err(|e| {
        tracing::debug!(error = %e, "Live connection write error");
    })
}

impl From<ServerMessage> for SubscriptionEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Connected { connection_id } => {
                SubscriptionEvent::Connected { connection_id }
            }
            ServerMessage::Subscribed { order_id } => SubscriptionEvent::Subscribed { order_id },
            ServerMessage::Unsubscribed { order_id } => {
                SubscriptionEvent::Unsubscribed { order_id }
            }
            ServerMessage::Announced { role } => SubscriptionEvent::Announced { role },
            ServerMessage::Pong => SubscriptionEvent::Pong,
            ServerMessage::Error { message } => SubscriptionEvent::Error { message },
            ServerMessage::Event {
                event_type,
                order_id,
                data,
                timestamp,
            } => SubscriptionEvent::Notification {
                event_type,
                order_id,
                data,
                timestamp,
            },
        }
    }
}
