//! In-memory connection and room registries
//!
//! Both registries hold only transient state: a connection is registered
//! after the handshake and removed on disconnect, with nothing persisted.
//! The two sub-protocol handlers coordinate through these shared registries
//! rather than through any global state of their own.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// One live gateway connection
#[derive(Clone)]
struct ConnectionHandle {
    user_id: Uuid,
    outbound: mpsc::Sender<String>,
}

/// Registry of live connections, keyed by connection id
///
/// A user may hold several connections at once; delivery to a user fans out
/// to all of them, best effort.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection's outbound queue
    pub async fn register(&self, conn_id: Uuid, user_id: Uuid, outbound: mpsc::Sender<String>) {
        self.inner
            .write()
            .await
            .insert(conn_id, ConnectionHandle { user_id, outbound });
    }

    /// Drop a connection
    pub async fn unregister(&self, conn_id: Uuid) {
        self.inner.write().await.remove(&conn_id);
    }

    /// Deliver a payload to every live connection of a user
    ///
    /// Returns how many connections accepted the payload. Zero simply means
    /// the recipient is offline; persistence is the caller's concern.
    pub async fn send_to_user(&self, user_id: Uuid, payload: &str) -> usize {
        let targets: Vec<mpsc::Sender<String>> = self
            .inner
            .read()
            .await
            .values()
            .filter(|handle| handle.user_id == user_id)
            .map(|handle| handle.outbound.clone())
            .collect();

        let mut delivered = 0;
        for outbound in targets {
            if outbound.send(payload.to_string()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver a payload to every live connection of a user except one
    ///
    /// Used to echo a sender's own message to their other devices without
    /// bouncing it back down the originating connection.
    pub async fn send_to_user_except(
        &self,
        user_id: Uuid,
        exclude_conn: Uuid,
        payload: &str,
    ) -> usize {
        let targets: Vec<mpsc::Sender<String>> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|(conn_id, handle)| handle.user_id == user_id && **conn_id != exclude_conn)
            .map(|(_, handle)| handle.outbound.clone())
            .collect();

        let mut delivered = 0;
        for outbound in targets {
            if outbound.send(payload.to_string()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of live connections
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Registry of room subscriptions, keyed by room name
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, HashMap<Uuid, mpsc::Sender<String>>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a room
    pub async fn join(&self, room: &str, conn_id: Uuid, outbound: mpsc::Sender<String>) {
        self.rooms
            .write()
            .await
            .entry(room.to_string())
            .or_default()
            .insert(conn_id, outbound);
    }

    /// Unsubscribe a connection from a room; returns whether it was a member
    pub async fn leave(&self, room: &str, conn_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let was_member = members.remove(&conn_id).is_some();
        if members.is_empty() {
            rooms.remove(room);
        }
        was_member
    }

    /// Drop a connection from every room it joined
    pub async fn leave_all(&self, conn_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        for members in rooms.values_mut() {
            members.remove(&conn_id);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    /// Whether a connection is subscribed to a room
    pub async fn is_member(&self, room: &str, conn_id: Uuid) -> bool {
        self.rooms
            .read()
            .await
            .get(room)
            .is_some_and(|members| members.contains_key(&conn_id))
    }

    /// Deliver a payload to every subscriber of a room
    pub async fn broadcast(&self, room: &str, payload: &str) -> usize {
        let targets: Vec<mpsc::Sender<String>> = match self.rooms.read().await.get(room) {
            Some(members) => members.values().cloned().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for outbound in targets {
            if outbound.send(payload.to_string()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}
