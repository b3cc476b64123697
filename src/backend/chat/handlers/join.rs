//! Join Handler
//!
//! Adds the session to a conversation room. For one-to-one chats the
//! client supplies the other participant's id and the symmetric pair key
//! is derived; group chats join the room named by the conversation id.
//!
//! No check that the requester is an authorized participant of the target
//! conversation; the client-supplied id is trusted as in the reference
//! behavior.

use crate::backend::realtime::Session;
use crate::backend::server::state::AppState;
use crate::shared::{direct_room_key, ChatError};

pub async fn handle_join(
    state: &AppState,
    session: &Session,
    chat_id: String,
    is_group: bool,
) -> Result<(), ChatError> {
    if chat_id.is_empty() {
        return Err(ChatError::validation("chatId is required"));
    }

    let key = if is_group {
        chat_id
    } else {
        direct_room_key(session.user_id(), &chat_id)
    };

    let joined = state.registry.join(session, &key).await;
    if joined {
        tracing::debug!("[Chat] {} joined room {}", session.user_id(), key);
    }
    Ok(())
}
