//! Gateway wire protocol
//!
//! Events are JSON objects tagged by a `type` field. The private-message
//! and room sub-protocols each own their event names; the gateway only
//! parses the envelope and dispatches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

/// Events a client may send over the gateway connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Direct message to another user
    PrivateMessage { to: Uuid, content: String },
    /// Subscribe to a room
    JoinRoom { room: String },
    /// Unsubscribe from a room
    LeaveRoom { room: String },
    /// Broadcast to a room's subscribers
    RoomMessage { room: String, content: String },
}

/// Events the server pushes to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once after the handshake succeeds
    Ready { user_id: Uuid },
    /// A direct message delivered to this connection
    PrivateMessage {
        id: Uuid,
        from: Uuid,
        to: Uuid,
        time: DateTime<Utc>,
        content: String,
    },
    /// A room broadcast delivered to this connection
    RoomMessage {
        room: String,
        from: Uuid,
        name: String,
        time: DateTime<Utc>,
        content: String,
    },
    /// Acknowledges a room subscription
    Joined { room: String },
    /// Acknowledges leaving a room
    Left { room: String },
}

impl ServerEvent {
    /// Serialize for the wire
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize server event: {}", e);
            "{}".to_string()
        })
    }
}
