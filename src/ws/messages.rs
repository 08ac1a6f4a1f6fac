//! WebSocket message types: envelope, commands, and replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Server event with a fresh id.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Reply to the command with id `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply. `code` follows the REST error codes, or the HTTP status
    /// for protocol errors.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error or warning.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to change events of collections.
    Subscribe {
        /// Collection names (`players`, `seats`, ...). Use `["*"]` for all.
        collections: Vec<String>,
    },
    /// Unsubscribe from collections.
    Unsubscribe {
        /// Collection names to drop.
        collections: Vec<String>,
    },
    /// Announce this client for the online counter.
    Hello {
        /// Key unique to the browser tab.
        client_key: String,
        /// Logged-in user, if any; drives the seat access check.
        #[serde(default)]
        username: Option<String>,
    },
    /// Click on a table seat.
    SeatClick {
        /// Seat number, 1 to 12.
        seat: u8,
    },
    /// Drop the current seat selection.
    ClearSelection,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_payload() {
        let Ok(cmd) = serde_json::from_value::<WsCommand>(serde_json::json!({
            "command": "seat_click",
            "seat": 4
        })) else {
            panic!("seat_click should parse");
        };
        assert_eq!(cmd, WsCommand::SeatClick { seat: 4 });

        let Ok(cmd) = serde_json::from_value::<WsCommand>(serde_json::json!({
            "command": "hello",
            "client_key": "tab-1"
        })) else {
            panic!("hello should parse");
        };
        assert_eq!(
            cmd,
            WsCommand::Hello {
                client_key: "tab-1".to_string(),
                username: None
            }
        );
    }

    #[test]
    fn error_envelope_carries_code() {
        let msg = WsMessage::error("req-1".to_string(), 403, "nope");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 403);
        assert_eq!(msg.payload["message"], "nope");
    }
}
