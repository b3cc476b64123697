//! Shared Types
//!
//! Types used by both the real-time engine and its tests: identities,
//! persisted chat messages, wire events, and the error taxonomy.

pub mod error;
pub mod event;
pub mod identity;
pub mod message;

pub use error::ChatError;
pub use event::{ClientEvent, OutgoingMessage, ServerEvent};
pub use identity::Identity;
pub use message::{direct_room_key, ChatMessage, ConversationQuery, Pagination};
