//! PostgreSQL message store
//!
//! Messages live in the `messages` table (see `migrations/`). `read_by` is a
//! `TEXT[]` column; the set-add is a single conditional `UPDATE`, so two
//! concurrent mark-read calls for the same reader cannot append twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::{ChatError, ChatMessage, ConversationQuery, Pagination};

use super::MessageStore;

const MESSAGE_COLUMNS: &str =
    "id, sender, content, chat_room, receiver, is_group, read_by, created_at";

/// Conversation filter shared by every query below. Parameters: `$1` room id
/// or first participant, `$2` second participant (room id again for groups),
/// `$3` the group discriminator.
const CONVERSATION_CLAUSE: &str = "(CASE WHEN $3 \
     THEN is_group AND chat_room = $1 \
     ELSE NOT is_group AND ((sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)) \
     END)";

fn conversation_params(query: &ConversationQuery) -> (&str, &str, bool) {
    match query {
        ConversationQuery::Group { chat_room } => (chat_room.as_str(), chat_room.as_str(), true),
        ConversationQuery::Direct { user_a, user_b } => (user_a.as_str(), user_b.as_str(), false),
    }
}

fn row_to_message(row: PgRow) -> ChatMessage {
    ChatMessage {
        id: row.get("id"),
        sender: row.get("sender"),
        content: row.get("content"),
        chat_room: row.get("chat_room"),
        receiver: row.get("receiver"),
        is_group: row.get("is_group"),
        read_by: row.get("read_by"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage, ChatError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender, content, chat_room, receiver, is_group, read_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(&message.sender)
        .bind(&message.content)
        .bind(&message.chat_room)
        .bind(&message.receiver)
        .bind(message.is_group)
        .bind(&message.read_by)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_unread(
        &self,
        query: &ConversationQuery,
        user_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let (first, second, is_group) = conversation_params(query);
        let sql = format!(
            "SELECT {} FROM messages WHERE {} AND NOT (read_by @> ARRAY[$4]) ORDER BY created_at ASC",
            MESSAGE_COLUMNS, CONVERSATION_CLAUSE
        );

        let rows = sqlx::query(&sql)
            .bind(first)
            .bind(second)
            .bind(is_group)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }

    async fn add_to_read_by(&self, ids: &[Uuid], user_id: &str) -> Result<u64, ChatError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_by = array_append(read_by, $2)
            WHERE id = ANY($1) AND NOT (read_by @> ARRAY[$2])
            "#,
        )
        .bind(ids)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, query: &ConversationQuery) -> Result<u64, ChatError> {
        let (first, second, is_group) = conversation_params(query);
        let sql = format!(
            "SELECT COUNT(*) AS total FROM messages WHERE {}",
            CONVERSATION_CLAUSE
        );

        let total: i64 = sqlx::query(&sql)
            .bind(first)
            .bind(second)
            .bind(is_group)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        Ok(total as u64)
    }

    async fn list(
        &self,
        query: &ConversationQuery,
        page: Pagination,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let (first, second, is_group) = conversation_params(query);
        let sql = format!(
            "SELECT {} FROM messages WHERE {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            MESSAGE_COLUMNS, CONVERSATION_CLAUSE
        );

        let rows = sqlx::query(&sql)
            .bind(first)
            .bind(second)
            .bind(is_group)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }
}
