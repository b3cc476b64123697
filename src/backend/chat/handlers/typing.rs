//! Typing Indicator Handler
//!
//! Pure ephemeral fan-out: no persistence, no acknowledgment. The sending
//! connection is excluded; the sender's other sessions still receive the
//! relay.

use crate::backend::realtime::Session;
use crate::backend::server::state::AppState;
use crate::shared::{direct_room_key, ChatError, ServerEvent};

pub async fn handle_typing(
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

    let event = ServerEvent::user_typing(session.user_id());
    for member in state.registry.members_of(&key).await {
        if member.id != session.id {
            member.send(event.clone());
        }
    }

    Ok(())
}
