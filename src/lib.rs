//! chatrelay - Real-time Chat Backend
//!
//! chatrelay is a real-time chat backend built on axum and tokio. Clients
//! hold persistent WebSocket connections, join one-to-one or group
//! conversation rooms, exchange messages, see typing and presence
//! indicators, and track which messages they have read.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire-level and domain types
//!   - Chat message and conversation query types
//!   - Client/server event enums
//!   - Error taxonomy
//!
//! - **`backend`** - Server-side code
//!   - Connection gateway and per-event chat handlers
//!   - Room registry, presence tracking, event broadcasting
//!   - User directory and message store collaborators
//!   - Configuration and server initialization

pub mod backend;
pub mod shared;
