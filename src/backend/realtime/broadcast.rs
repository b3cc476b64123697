//! Global Event Broadcasting
//!
//! Presence transitions go to every connected client, not just one room.
//! They travel over a `tokio::sync::broadcast` channel; every connection's
//! writer task holds a subscription and forwards received events to its
//! socket.

use tokio::sync::broadcast;

use crate::shared::ServerEvent;

/// Broadcast channel for events addressed to all connections
///
/// Can be cloned and shared across handlers to broadcast from anywhere in
/// the application.
pub type ServerEventBroadcast = broadcast::Sender<ServerEvent>;

/// Broadcast an event to all connected clients.
///
/// Returns the number of subscribers that received the event (0 if none —
/// not an error, there may simply be no connections).
pub fn broadcast_event(broadcast_tx: &ServerEventBroadcast, event: ServerEvent) -> usize {
    match broadcast_tx.send(event) {
        Ok(subscriber_count) => subscriber_count,
        Err(e) => {
            tracing::debug!("[Realtime] no subscribers to receive event: {:?}", e);
            0
        }
    }
}
