//! Message Store Collaborator
//!
//! Persistence for chat messages. The engine consumes it through the
//! [`MessageStore`] trait and never mutates `read_by` itself: the set-add is
//! an atomic storage-layer operation so concurrent mark-read calls cannot
//! duplicate entries or lose updates.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::{ChatError, ChatMessage, ConversationQuery, Pagination};

pub use memory::MemoryMessageStore;
pub use pg::PgMessageStore;

/// External message store consumed by the pipeline and receipt tracker
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message; fan-out must not happen before this returns
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage, ChatError>;

    /// Messages of a conversation not yet read by `user_id`, oldest first
    async fn find_unread(
        &self,
        query: &ConversationQuery,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Atomically add `user_id` to the `read_by` set of each message.
    ///
    /// Idempotent: messages already containing the user are untouched.
    /// Returns the number of messages actually modified.
    async fn add_to_read_by(&self, ids: &[Uuid], user_id: &str) -> Result<u64, ChatError>;

    /// Total number of messages in a conversation
    async fn count(&self, query: &ConversationQuery) -> Result<u64, ChatError>;

    /// One history page of a conversation, newest first
    async fn list(
        &self,
        query: &ConversationQuery,
        page: Pagination,
    ) -> Result<Vec<ChatMessage>, ChatError>;
}
