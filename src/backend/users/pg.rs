//! PostgreSQL user directory
//!
//! Directory rows live in the `users` table owned by the REST surface; this
//! implementation only flips the online flag and answers searches.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::backend::auth::sessions;
use crate::shared::{ChatError, Identity, Pagination};

use super::{DirectoryUser, UserDirectory, UserPage, UserQuery};

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn verify_token(&self, token: &str) -> Result<Identity, ChatError> {
        let claims =
            sessions::verify_token(token).map_err(|e| ChatError::invalid_token(e.to_string()))?;
        Ok(claims.identity())
    }

    async fn set_online(&self, identity: &Identity, online: bool) -> Result<(), ChatError> {
        // A missing row means the user was never registered through the REST
        // surface; treated as zero-affected, not an error.
        sqlx::query(
            r#"
            UPDATE users
            SET online = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(&identity.id)
        .bind(online)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_username(
        &self,
        query: &UserQuery,
        page: Pagination,
    ) -> Result<UserPage, ChatError> {
        let pattern = format!("%{}%", query.search.as_deref().unwrap_or(""));

        let rows = sqlx::query(
            r#"
            SELECT id, username, online
            FROM users
            WHERE username ILIKE $1 AND (NOT $2 OR online)
            ORDER BY online DESC, username ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&pattern)
        .bind(query.online_only)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(|row| DirectoryUser {
                id: row.get("id"),
                username: row.get("username"),
                online: row.get("online"),
            })
            .collect();

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM users
            WHERE username ILIKE $1 AND (NOT $2 OR online)
            "#,
        )
        .bind(&pattern)
        .bind(query.online_only)
        .fetch_one(&self.pool)
        .await?
        .get("total");

        Ok(UserPage {
            users,
            total: total as u64,
        })
    }
}
