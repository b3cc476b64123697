//! Chat Message Data Structures
//!
//! The persisted message entity, conversation queries, and room key
//! derivation.
//!
//! A message belongs to exactly one conversation: a group room (`chat_room`
//! set, `receiver` empty) or a one-to-one exchange (`receiver` set,
//! `chat_room` empty), discriminated by `is_group`. Messages are immutable
//! except for `read_by`, which only ever gains members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derive the room key for a one-to-one conversation.
///
/// Symmetric: the same pair of ids yields the same key regardless of
/// argument order.
pub fn direct_room_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}

/// A persisted chat message
///
/// Field names serialize in camelCase to match the wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID
    pub id: Uuid,
    /// User id of the sender
    pub sender: String,
    /// Message content
    pub content: String,
    /// Group conversation id (group messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_room: Option<String>,
    /// Recipient user id (one-to-one messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Conversation discriminator
    pub is_group: bool,
    /// User ids that have read this message; set semantics, grows only
    #[serde(default)]
    pub read_by: Vec<String>,
    /// When the message was persisted
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a one-to-one message
    pub fn direct(sender: impl Into<String>, receiver: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            content: content.into(),
            chat_room: None,
            receiver: Some(receiver.into()),
            is_group: false,
            read_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a group message
    pub fn group(sender: impl Into<String>, chat_room: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            content: content.into(),
            chat_room: Some(chat_room.into()),
            receiver: None,
            is_group: true,
            read_by: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Identifies the set of messages belonging to one conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationQuery {
    /// All messages of a group room
    Group { chat_room: String },
    /// All messages exchanged between two users, in either direction
    Direct { user_a: String, user_b: String },
}

impl ConversationQuery {
    /// Build the query for a client-supplied target.
    ///
    /// For one-to-one conversations the target id names the other
    /// participant; the requester is the second endpoint.
    pub fn from_target(requester: &str, chat_id: &str, is_group: bool) -> Self {
        if is_group {
            Self::Group {
                chat_room: chat_id.to_string(),
            }
        } else {
            Self::Direct {
                user_a: requester.to_string(),
                user_b: chat_id.to_string(),
            }
        }
    }

    /// The fan-out room key for this conversation
    pub fn room_key(&self) -> String {
        match self {
            Self::Group { chat_room } => chat_room.clone(),
            Self::Direct { user_a, user_b } => direct_room_key(user_a, user_b),
        }
    }

    /// Whether a message belongs to this conversation
    pub fn matches(&self, message: &ChatMessage) -> bool {
        match self {
            Self::Group { chat_room } => {
                message.is_group && message.chat_room.as_deref() == Some(chat_room.as_str())
            }
            Self::Direct { user_a, user_b } => {
                !message.is_group
                    && ((message.sender == *user_a
                        && message.receiver.as_deref() == Some(user_b.as_str()))
                        || (message.sender == *user_b
                            && message.receiver.as_deref() == Some(user_a.as_str())))
            }
        }
    }
}

/// Page selection for history queries; pages are 1-based
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    /// Number of rows to skip before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}
