//! Room Registry
//!
//! Tracks which connections are joined to which conversation room. Group
//! rooms are keyed by the conversation id; one-to-one rooms by the
//! symmetric pair key (see [`crate::shared::direct_room_key`]).
//!
//! Locking is per room so unrelated rooms never serialize each other: the
//! outer map guards room lookup, each room guards its own membership, and
//! each room carries a send lock that the message pipeline holds across
//! persist + fan-out to keep delivery order equal to persistence order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::session::{ConnectionId, Session};

/// One conversation room's runtime state
#[derive(Debug, Default)]
pub struct Room {
    members: RwLock<HashMap<ConnectionId, Session>>,
    send_lock: Mutex<()>,
}

impl Room {
    /// Snapshot of the sessions currently joined.
    ///
    /// The snapshot may go stale immediately; senders into a session that
    /// disconnected mid-fan-out are dropped silently.
    pub async fn members(&self) -> Vec<Session> {
        self.members.read().await.values().cloned().collect()
    }

    pub async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }

    /// Serialize sends within this room. Held across persist + fan-out so
    /// members observe messages in persistence order.
    pub async fn ordered(&self) -> MutexGuard<'_, ()> {
        self.send_lock.lock().await
    }
}

/// Registry of all rooms and per-connection join sets
///
/// Purely in-memory; rebuilt empty on restart.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    conn_rooms: RwLock<HashMap<ConnectionId, HashSet<String>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a room.
    pub async fn room(&self, key: &str) -> Arc<Room> {
        if let Some(room) = self.rooms.read().await.get(key) {
            return Arc::clone(room);
        }
        let mut rooms = self.rooms.write().await;
        Arc::clone(rooms.entry(key.to_string()).or_default())
    }

    /// Add a session to a room. Idempotent: joining twice is a no-op.
    /// Returns true when the session was not already a member.
    pub async fn join(&self, session: &Session, key: &str) -> bool {
        // Membership is inserted while the outer lock is held so that
        // cleanup_empty (which takes the outer write lock) can never observe
        // a room as empty while a join for it is in flight.
        let inserted = {
            let rooms = self.rooms.read().await;
            match rooms.get(key) {
                Some(room) => Some(
                    room.members
                        .write()
                        .await
                        .insert(session.id, session.clone())
                        .is_none(),
                ),
                None => None,
            }
        };

        let inserted = match inserted {
            Some(inserted) => inserted,
            None => {
                let mut rooms = self.rooms.write().await;
                let room = rooms.entry(key.to_string()).or_default();
                let inserted = room
                    .members
                    .write()
                    .await
                    .insert(session.id, session.clone())
                    .is_none();
                inserted
            }
        };

        if inserted {
            self.conn_rooms
                .write()
                .await
                .entry(session.id)
                .or_default()
                .insert(key.to_string());
        }
        inserted
    }

    /// Remove a session from one room.
    pub async fn leave(&self, connection: ConnectionId, key: &str) -> bool {
        let room = {
            let rooms = self.rooms.read().await;
            rooms.get(key).cloned()
        };

        let removed = match room {
            Some(room) => room.members.write().await.remove(&connection).is_some(),
            None => false,
        };

        if removed {
            let mut conn_rooms = self.conn_rooms.write().await;
            if let Some(keys) = conn_rooms.get_mut(&connection) {
                keys.remove(key);
            }
        }
        removed
    }

    /// Sessions currently joined to a room; empty if the room is unknown.
    pub async fn members_of(&self, key: &str) -> Vec<Session> {
        let room = {
            let rooms = self.rooms.read().await;
            rooms.get(key).cloned()
        };
        match room {
            Some(room) => room.members().await,
            None => Vec::new(),
        }
    }

    /// Remove a connection from every room it had joined (disconnect path).
    /// Returns the keys it was removed from.
    pub async fn remove_from_all(&self, connection: ConnectionId) -> Vec<String> {
        let keys: Vec<String> = {
            let mut conn_rooms = self.conn_rooms.write().await;
            conn_rooms
                .remove(&connection)
                .map(|keys| keys.into_iter().collect())
                .unwrap_or_default()
        };

        let rooms = self.rooms.read().await;
        for key in &keys {
            if let Some(room) = rooms.get(key) {
                room.members.write().await.remove(&connection);
            }
        }
        keys
    }

    /// Drop rooms with no members. Rooms whose membership is being touched
    /// concurrently are kept for the next sweep.
    pub async fn cleanup_empty(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, room| match room.members.try_write() {
            Ok(members) => !members.is_empty(),
            Err(_) => true,
        });
        before - rooms.len()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
