//! In-memory user directory
//!
//! Backs the server when no database is configured, and the tests. Token
//! verification is the same JWT path the Postgres directory uses; the
//! user table is a mutex-guarded map.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::auth::sessions;
use crate::shared::{ChatError, Identity, Pagination};

use super::{DirectoryUser, UserDirectory, UserPage, UserQuery};

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<HashMap<String, DirectoryUser>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user row, offline
    pub fn insert(&self, id: impl Into<String>, username: impl Into<String>) {
        let id = id.into();
        let user = DirectoryUser {
            id: id.clone(),
            username: username.into(),
            online: false,
        };
        self.users.lock().unwrap().insert(id, user);
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .map(|u| u.online)
            .unwrap_or(false)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn verify_token(&self, token: &str) -> Result<Identity, ChatError> {
        let claims =
            sessions::verify_token(token).map_err(|e| ChatError::invalid_token(e.to_string()))?;
        Ok(claims.identity())
    }

    async fn set_online(&self, identity: &Identity, online: bool) -> Result<(), ChatError> {
        let mut users = self.users.lock().unwrap();
        users
            .entry(identity.id.clone())
            .or_insert_with(|| DirectoryUser {
                id: identity.id.clone(),
                username: identity.username.clone(),
                online: false,
            })
            .online = online;
        Ok(())
    }

    async fn find_by_username(
        &self,
        query: &UserQuery,
        page: Pagination,
    ) -> Result<UserPage, ChatError> {
        let users = self.users.lock().unwrap();
        let needle = query.search.as_deref().unwrap_or("").to_lowercase();

        let mut matched: Vec<DirectoryUser> = users
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .filter(|u| !query.online_only || u.online)
            .cloned()
            .collect();

        // online first, then alphabetical
        matched.sort_by(|a, b| b.online.cmp(&a.online).then(a.username.cmp(&b.username)));

        let total = matched.len() as u64;
        let users = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(UserPage { users, total })
    }
}
