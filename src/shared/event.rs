//! Wire Events
//!
//! Client-to-server and server-to-client events exchanged over the
//! WebSocket connection. Every frame is a JSON object of the form
//! `{"event": <name>, "data": <payload>}` with camelCase payload fields.

use serde::{Deserialize, Serialize};

use crate::shared::message::ChatMessage;

/// Events a client may send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Join a conversation room
    JoinChat { chat_id: String, is_group: bool },
    /// Send a message into a conversation
    SendMessage {
        content: String,
        #[serde(default)]
        receiver_id: Option<String>,
        #[serde(default)]
        chat_room_id: Option<String>,
        is_group: bool,
    },
    /// Typing indicator, relayed to the room without persistence
    Typing { chat_id: String, is_group: bool },
    /// Mark every unread message of a conversation as read
    MarkMessagesRead { chat_id: String, is_group: bool },
}

/// A persisted message augmented with the sender's display name for fan-out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub sender_name: String,
}

/// Events the server pushes to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// An identity gained its first live connection
    UserOnline { user_id: String },
    /// An identity lost its last live connection
    UserOffline { user_id: String },
    /// A message was persisted and fanned out to the room
    ReceiveMessage(OutgoingMessage),
    /// Someone else in the room is typing
    UserTyping { user_id: String },
    /// Read receipts were recorded for a conversation
    MessagesRead {
        chat_id: String,
        /// Absent on the direct acknowledgment to the requester
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
        count: u64,
    },
    /// Handler failure, delivered to the requesting connection only
    Error { msg: String },
}

impl ServerEvent {
    pub fn user_online(user_id: impl Into<String>) -> Self {
        Self::UserOnline {
            user_id: user_id.into(),
        }
    }

    pub fn user_offline(user_id: impl Into<String>) -> Self {
        Self::UserOffline {
            user_id: user_id.into(),
        }
    }

    pub fn receive_message(message: ChatMessage, sender_name: impl Into<String>) -> Self {
        Self::ReceiveMessage(OutgoingMessage {
            message,
            sender_name: sender_name.into(),
        })
    }

    pub fn user_typing(user_id: impl Into<String>) -> Self {
        Self::UserTyping {
            user_id: user_id.into(),
        }
    }

    /// Room broadcast after read receipts were recorded
    pub fn messages_read(chat_id: impl Into<String>, user_id: impl Into<String>, count: u64) -> Self {
        Self::MessagesRead {
            chat_id: chat_id.into(),
            user_id: Some(user_id.into()),
            count,
        }
    }

    /// Direct acknowledgment to the requester
    pub fn messages_read_ack(chat_id: impl Into<String>, count: u64) -> Self {
        Self::MessagesRead {
            chat_id: chat_id.into(),
            user_id: None,
            count,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { msg: msg.into() }
    }
}
