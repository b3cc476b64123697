//! Session Context
//!
//! A session binds one verified identity to one live connection. The engine
//! only ever talks to a connection through its session handle; the set of
//! rooms a session has joined is tracked by the room registry, keyed by the
//! connection id.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{Identity, ServerEvent};

/// Unique id of one live connection
pub type ConnectionId = Uuid;

/// Handle to one authenticated connection
///
/// Cloning is cheap; clones share the same outbound channel. One identity
/// may own any number of concurrent sessions (multiple devices or tabs).
#[derive(Debug, Clone)]
pub struct Session {
    pub id: ConnectionId,
    pub identity: Identity,
    outbound: mpsc::UnboundedSender<ServerEvent>,
}

impl Session {
    /// Create a session and the receiving end of its outbound channel,
    /// which the connection's writer task drains.
    pub fn new(identity: Identity) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                identity,
                outbound,
            },
            rx,
        )
    }

    pub fn user_id(&self) -> &str {
        &self.identity.id
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    /// Queue an event for this connection.
    ///
    /// Delivery to a connection that is already closing is silently
    /// dropped; callers never observe the race.
    pub fn send(&self, event: ServerEvent) {
        if self.outbound.send(event).is_err() {
            tracing::trace!(connection = %self.id, "dropped event for closed connection");
        }
    }
}
