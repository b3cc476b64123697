//! Send Handler
//!
//! The message pipeline: validate, persist, fan out. Nothing is fanned out
//! before the store acknowledges the write, and a failed write is reported
//! to the sender only.

use crate::backend::realtime::Session;
use crate::backend::server::state::AppState;
use crate::shared::{ChatError, ChatMessage, ConversationQuery, ServerEvent};

pub async fn handle_send(
    state: &AppState,
    session: &Session,
    content: String,
    receiver_id: Option<String>,
    chat_room_id: Option<String>,
    is_group: bool,
) -> Result<(), ChatError> {
    if content.trim().is_empty() {
        return Err(ChatError::validation("content must not be empty"));
    }

    let (message, query) = if is_group {
        let chat_room = chat_room_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ChatError::validation("chatRoomId is required for group messages"))?;
        let query = ConversationQuery::Group {
            chat_room: chat_room.clone(),
        };
        (ChatMessage::group(session.user_id(), chat_room, content), query)
    } else {
        let receiver = receiver_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ChatError::validation("receiverId is required for direct messages"))?;
        let query = ConversationQuery::Direct {
            user_a: session.user_id().to_string(),
            user_b: receiver.clone(),
        };
        (ChatMessage::direct(session.user_id(), receiver, content), query)
    };

    let room = state.registry.room(&query.room_key()).await;

    // Held across persist + fan-out: members of this room observe messages
    // in persistence order.
    let _order = room.ordered().await;

    let stored = state.messages.create(message).await?;
    tracing::debug!(
        "[Chat] message {} persisted for room {}",
        stored.id,
        query.room_key()
    );

    let event = ServerEvent::receive_message(stored, session.username());
    for member in room.members().await {
        member.send(event.clone());
    }

    Ok(())
}
