//! Real-time Engine
//!
//! In-memory state behind the WebSocket gateway: per-connection sessions,
//! the room registry, the presence reference counter, and the global event
//! broadcast. Everything here is rebuilt from scratch on restart; clients
//! re-join their rooms after reconnecting.

pub mod broadcast;
pub mod presence;
pub mod rooms;
pub mod session;

pub use broadcast::{broadcast_event, ServerEventBroadcast};
pub use presence::PresenceTracker;
pub use rooms::RoomRegistry;
pub use session::{ConnectionId, Session};
