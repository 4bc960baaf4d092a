//! WebSocket gateway: connection lifecycle, event dispatch, delivery.
//!
//! The gateway owns everything the coordinator must not: sockets,
//! connection IDs, and outbound channels. Inbound events are dispatched
//! under a single mutex so each one runs to completion before the next,
//! which is the serialization the coordinator's state machine assumes.
//! Delivery is fire-and-forget through per-connection channels; a send to
//! a closed channel is dropped and the eventual disconnect event cleans
//! the room up.

use crate::coordinator::{Outbound, RoomCoordinator};
use crate::protocol::{ClientEvent, ServerEvent};
use crate::store::ConnectionId;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Outbound channel for one connection.
type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Coordinator plus the delivery registry, guarded together so every
/// inbound event is validated, applied, and queued atomically.
#[derive(Debug, Default)]
struct GatewayInner {
    coordinator: RoomCoordinator,
    senders: HashMap<ConnectionId, EventSender>,
}

impl GatewayInner {
    fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { to, event } in outbound {
            match self.senders.get(&to) {
                // Fire and forget: a dead receiver means the connection
                // is gone and its disconnect event will follow.
                Some(sender) => {
                    let _ = sender.send(event);
                }
                None => debug!(connection_id = to, "Dropping event for unknown connection"),
            }
        }
    }
}

/// The real-time channel boundary between clients and the coordinator.
#[derive(Debug, Default)]
pub struct SessionGateway {
    inner: Mutex<GatewayInner>,
    next_connection: AtomicU64,
}

impl SessionGateway {
    /// Creates a gateway with a fresh coordinator.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session gateway");
        Self::default()
    }

    fn register(&self, sender: EventSender) -> ConnectionId {
        let connection_id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().expect("gateway lock");
        inner.senders.insert(connection_id, sender);
        info!(connection_id, "Connection registered");
        connection_id
    }

    /// Routes one parsed client event through the coordinator and queues
    /// the resulting notifications. Rejections go back to the requester
    /// only.
    #[instrument(skip(self, event))]
    fn dispatch(&self, connection_id: ConnectionId, event: ClientEvent) {
        let mut inner = self.inner.lock().expect("gateway lock");
        let result = match event {
            ClientEvent::CreateRoom { display_name } => {
                let (_, outbound) = inner.coordinator.create_room(connection_id, display_name);
                Ok(outbound)
            }
            ClientEvent::JoinRoom {
                room_code,
                display_name,
            } => inner
                .coordinator
                .join_room(&room_code, connection_id, display_name),
            ClientEvent::MakeMove { room_code, index } => {
                inner.coordinator.make_move(&room_code, connection_id, index)
            }
            ClientEvent::Reset { room_code } => inner.coordinator.reset(&room_code),
        };

        match result {
            Ok(outbound) => inner.deliver(outbound),
            Err(error) => {
                warn!(connection_id, %error, "Event rejected");
                inner.deliver(vec![Outbound {
                    to: connection_id,
                    event: ServerEvent::Error {
                        message: error.to_string(),
                    },
                }]);
            }
        }
    }

    /// Tears down whatever room the connection was in and deregisters its
    /// outbound channel. Runs exactly once per connection, on socket
    /// close.
    #[instrument(skip(self))]
    fn drop_connection(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.lock().expect("gateway lock");
        let outbound = inner.coordinator.disconnect(connection_id);
        inner.deliver(outbound);
        inner.senders.remove(&connection_id);
        info!(connection_id, "Connection closed");
    }
}

/// Builds the HTTP application: a health text route and the WebSocket
/// endpoint.
pub fn router(gateway: Arc<SessionGateway>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(websocket_handler))
        .with_state(gateway)
}

async fn index() -> &'static str {
    "Tic-Tac-Toe Server"
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(gateway): State<Arc<SessionGateway>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, gateway))
}

/// Runs one connection: a writer task drains the outbound channel into
/// the socket while this task reads, parses, and dispatches inbound
/// frames until the socket closes.
async fn handle_socket(socket: WebSocket, gateway: Arc<SessionGateway>) {
    let (mut sink, mut stream) = socket.split();
    let (sender, mut receiver) = mpsc::unbounded_channel::<ServerEvent>();
    let connection_id = gateway.register(sender);

    let writer = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, "Failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(error) => {
                debug!(connection_id, %error, "Socket read error");
                break;
            }
        };
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => gateway.dispatch(connection_id, event),
                Err(error) => {
                    warn!(connection_id, %error, "Unparseable client event");
                    let inner = gateway.inner.lock().expect("gateway lock");
                    inner.deliver(vec![Outbound {
                        to: connection_id,
                        event: ServerEvent::Error {
                            message: "malformed event".to_string(),
                        },
                    }]);
                }
            },
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; pings are
            // answered by axum itself.
            _ => {}
        }
    }

    gateway.drop_connection(connection_id);
    // The registry held the only sender, so the writer drains and exits.
    let _ = writer.await;
}
