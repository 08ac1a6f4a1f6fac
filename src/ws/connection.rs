//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events. Each
//! connection owns its seat selection and the actor it announced.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage};
use super::subscription::{SubscriptionManager, parse_collections};
use crate::domain::{Actor, ChangeKind, Collection, SeatAction, SeatNumber, SeatPicker, TableEvent};
use crate::service::SessionService;

/// Per-connection state.
#[derive(Debug, Default)]
pub struct ConnectionState {
    /// Collection filter.
    pub subs: SubscriptionManager,
    /// Seat-click selection.
    pub picker: SeatPicker,
    /// User announced via `hello`.
    pub actor: Option<Actor>,
    /// Presence key announced via `hello`.
    pub client_key: Option<String>,
}

impl ConnectionState {
    /// Creates an idle, unsubscribed connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the selection consistent with events from other clients.
    pub fn observe(&mut self, event: &TableEvent) {
        if let TableEvent::RowChanged {
            collection: Collection::Seats,
            change: ChangeKind::Delete,
            id,
            ..
        } = event
        {
            self.picker.forget(*id);
        }
    }
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<TableEvent>,
    service: Arc<SessionService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut conn = ConnectionState::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut conn, &service).await;
                        if let Some(json) = encode(&reply)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(table_event) => {
                        conn.observe(&table_event);
                        if conn.subs.matches(&table_event)
                            && let Ok(payload) = serde_json::to_value(&table_event)
                            && let Some(json) = encode(&WsMessage::event(payload))
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                        // Missed row events: tell the client to reload what it follows.
                        let mut closed = false;
                        for collection in conn.subs.collections() {
                            let payload = json!({
                                "event_type": "collection_reloaded",
                                "collection": collection,
                                "len": null,
                                "timestamp": chrono::Utc::now(),
                            });
                            if let Some(json) = encode(&WsMessage::event(payload))
                                && ws_tx.send(Message::text(json)).await.is_err() {
                                    closed = true;
                                    break;
                                }
                        }
                        if closed {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if let Some(key) = conn.client_key.take() {
        service.leave_presence(&key).await;
    }
    tracing::debug!("ws connection closed");
}

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg).ok()
}

/// Handles a text message from the client, returning the reply.
pub async fn handle_text_message(
    text: &str,
    conn: &mut ConnectionState,
    service: &SessionService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { collections } => {
            let (parsed, wildcard, unknown) = parse_collections(&collections);
            conn.subs.subscribe(&parsed, wildcard);
            WsMessage::response(
                msg.id,
                json!({
                    "subscribed": conn.subs.collections(),
                    "wildcard": conn.subs.is_subscribed_all(),
                    "unknown": unknown,
                }),
            )
        }
        WsCommand::Unsubscribe { collections } => {
            let (parsed, wildcard, unknown) = parse_collections(&collections);
            conn.subs.unsubscribe(&parsed, wildcard);
            WsMessage::response(
                msg.id,
                json!({
                    "subscribed": conn.subs.collections(),
                    "unknown": unknown,
                }),
            )
        }
        WsCommand::Hello {
            client_key,
            username,
        } => {
            let username = username
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty());
            conn.actor = username.as_deref().map(|u| service.actor_named(u));
            if let Some(previous) = conn.client_key.replace(client_key.clone())
                && previous != client_key
            {
                service.leave_presence(&previous).await;
            }
            let online = service.announce_presence(&client_key, username).await;
            WsMessage::response(
                msg.id,
                json!({
                    "online": online,
                    "is_admin": conn.actor.as_ref().is_some_and(|a| a.is_admin),
                }),
            )
        }
        WsCommand::SeatClick { seat } => {
            let seat = match SeatNumber::new(seat) {
                Ok(seat) => seat,
                Err(e) => return WsMessage::error(msg.id, e.error_code(), e.to_string()),
            };
            match service
                .seat_click(&mut conn.picker, seat, conn.actor.as_ref())
                .await
            {
                Ok(SeatAction::Refused(warning)) => WsMessage::error(msg.id, 403, warning),
                Ok(action) => WsMessage::response(msg.id, action_payload(&action)),
                Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
            }
        }
        WsCommand::ClearSelection => {
            conn.picker.reset();
            WsMessage::response(msg.id, json!({ "action": "deselect", "selected": null }))
        }
    }
}

fn action_payload(action: &SeatAction) -> serde_json::Value {
    match action {
        SeatAction::Ignore => json!({ "action": "ignore", "selected": null }),
        SeatAction::Select(id) => json!({ "action": "select", "selected": id }),
        SeatAction::Deselect => json!({ "action": "deselect", "selected": null }),
        SeatAction::Swap { selected, other } => json!({
            "action": "swap",
            "player_id": selected,
            "other_player_id": other,
            "selected": null,
        }),
        SeatAction::Move { selected, seat } => json!({
            "action": "move",
            "player_id": selected,
            "seat": seat,
            "selected": null,
        }),
        SeatAction::Refused(message) => json!({ "action": "refused", "message": message }),
    }
}
