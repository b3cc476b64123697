//! Chat Event Handlers
//!
//! One module per client event. Handler failures never cross the handler
//! boundary: they are logged and converted to an `error` event for the
//! requesting connection, which stays open.

pub mod join;
pub mod read;
pub mod send;
pub mod typing;

use crate::backend::realtime::Session;
use crate::backend::server::state::AppState;
use crate::shared::{ClientEvent, ServerEvent};

/// Dispatch one client event to its handler.
pub async fn handle_client_event(state: &AppState, session: &Session, event: ClientEvent) {
    let result = match event {
        ClientEvent::JoinChat { chat_id, is_group } => {
            join::handle_join(state, session, chat_id, is_group).await
        }
        ClientEvent::SendMessage {
            content,
            receiver_id,
            chat_room_id,
            is_group,
        } => send::handle_send(state, session, content, receiver_id, chat_room_id, is_group).await,
        ClientEvent::Typing { chat_id, is_group } => {
            typing::handle_typing(state, session, chat_id, is_group).await
        }
        ClientEvent::MarkMessagesRead { chat_id, is_group } => {
            read::handle_mark_read(state, session, chat_id, is_group).await
        }
    };

    if let Err(error) = result {
        tracing::warn!("[Chat] handler failure for {}: {}", session.user_id(), error);
        session.send(ServerEvent::error(error.to_string()));
    }
}
