//! Read-Receipt Handler
//!
//! Marks every unread message of a conversation as read by the requester.
//! The `read_by` add is the store's atomic set-union, so repeating the call
//! or racing it from another session of the same identity cannot duplicate
//! entries.

use uuid::Uuid;

use crate::backend::realtime::Session;
use crate::backend::server::state::AppState;
use crate::shared::{ChatError, ConversationQuery, ServerEvent};

pub async fn handle_mark_read(
    state: &AppState,
    session: &Session,
    chat_id: String,
    is_group: bool,
) -> Result<(), ChatError> {
    if chat_id.is_empty() {
        return Err(ChatError::validation("chatId is required"));
    }

    let user_id = session.user_id();
    let query = ConversationQuery::from_target(user_id, &chat_id, is_group);

    let unread = state.messages.find_unread(&query, user_id).await?;
    if unread.is_empty() {
        session.send(ServerEvent::messages_read_ack(chat_id, 0));
        return Ok(());
    }

    let ids: Vec<Uuid> = unread.iter().map(|m| m.id).collect();
    let affected = state.messages.add_to_read_by(&ids, user_id).await?;
    let count = unread.len() as u64;
    if affected < count {
        // a concurrent call for the same identity got there first
        tracing::debug!(
            "[Chat] {} of {} receipts already recorded for {}",
            count - affected,
            count,
            user_id
        );
    }

    // The whole room learns about the receipts, and the requester gets a
    // direct acknowledgment as well in case it left the room in between.
    let broadcast = ServerEvent::messages_read(chat_id.clone(), user_id, count);
    for member in state.registry.members_of(&query.room_key()).await {
        member.send(broadcast.clone());
    }
    session.send(ServerEvent::messages_read_ack(chat_id, count));

    Ok(())
}
