//! Shared test helpers
//!
//! Builds the application state around the in-memory collaborators and
//! drives the session lifecycle without a WebSocket transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use chatrelay::backend::chat::socket::{close_session, open_session};
use chatrelay::backend::realtime::Session;
use chatrelay::backend::server::state::AppState;
use chatrelay::backend::store::{MemoryMessageStore, MessageStore};
use chatrelay::backend::users::MemoryUserDirectory;
use chatrelay::shared::{
    ChatError, ChatMessage, ConversationQuery, Identity, Pagination, ServerEvent,
};

/// Application state plus concrete handles to the in-memory collaborators.
pub struct TestContext {
    pub state: AppState,
    pub users: Arc<MemoryUserDirectory>,
    pub messages: Arc<MemoryMessageStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserDirectory::new());
        let messages = Arc::new(MemoryMessageStore::new());
        let state = AppState::new(users.clone(), messages.clone());
        Self {
            state,
            users,
            messages,
        }
    }

    /// Open an authenticated session, as the gateway would after a
    /// successful handshake.
    pub async fn connect(
        &self,
        user_id: &str,
        username: &str,
    ) -> (Session, UnboundedReceiver<ServerEvent>) {
        open_session(&self.state, Identity::new(user_id, username)).await
    }

    /// Run the gateway's disconnect cleanup for a session.
    pub async fn disconnect(&self, session: &Session) {
        close_session(&self.state, session).await;
    }
}

/// Collect every event currently queued on a session channel.
pub fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Collect every event currently queued on a broadcast subscription.
pub fn drain_broadcast(
    rx: &mut tokio::sync::broadcast::Receiver<ServerEvent>,
) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Message store whose writes always fail.
pub struct FailingMessageStore;

#[async_trait]
impl MessageStore for FailingMessageStore {
    async fn create(&self, _message: ChatMessage) -> Result<ChatMessage, ChatError> {
        Err(ChatError::persistence("store offline"))
    }

    async fn find_unread(
        &self,
        _query: &ConversationQuery,
        _user_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Err(ChatError::persistence("store offline"))
    }

    async fn add_to_read_by(&self, _ids: &[Uuid], _user_id: &str) -> Result<u64, ChatError> {
        Err(ChatError::persistence("store offline"))
    }

    async fn count(&self, _query: &ConversationQuery) -> Result<u64, ChatError> {
        Err(ChatError::persistence("store offline"))
    }

    async fn list(
        &self,
        _query: &ConversationQuery,
        _page: Pagination,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Err(ChatError::persistence("store offline"))
    }
}
