//! In-memory message store
//!
//! Backs the server when no database is configured, and the tests.
//! Insertion order doubles as persistence order; all mutation happens under
//! one mutex, which makes the `read_by` set-add atomic.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::{ChatError, ChatMessage, ConversationQuery, Pagination};

use super::MessageStore;

#[derive(Default)]
pub struct MemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a single message, for assertions
    pub fn get(&self, id: Uuid) -> Option<ChatMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage, ChatError> {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_unread(
        &self,
        query: &ConversationQuery,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .iter()
            .filter(|m| query.matches(m))
            .filter(|m| !m.read_by.iter().any(|r| r == user_id))
            .cloned()
            .collect())
    }

    async fn add_to_read_by(&self, ids: &[Uuid], user_id: &str) -> Result<u64, ChatError> {
        let mut messages = self.messages.lock().unwrap();
        let mut affected = 0;
        for message in messages.iter_mut().filter(|m| ids.contains(&m.id)) {
            if !message.read_by.iter().any(|r| r == user_id) {
                message.read_by.push(user_id.to_string());
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn count(&self, query: &ConversationQuery) -> Result<u64, ChatError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().filter(|m| query.matches(m)).count() as u64)
    }

    async fn list(
        &self,
        query: &ConversationQuery,
        page: Pagination,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages
            .iter()
            .filter(|m| query.matches(m))
            .rev()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }
}
