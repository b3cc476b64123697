//! User Directory Collaborator
//!
//! The user directory owns identities: it verifies handshake credentials,
//! records online status, and answers user searches. The engine consumes it
//! through the [`UserDirectory`] trait; registration and login live behind
//! the external REST surface and are not modeled here.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::{ChatError, Identity, Pagination};

pub use memory::MemoryUserDirectory;
pub use pg::PgUserDirectory;

/// A user as the directory reports it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    pub username: String,
    pub online: bool,
}

/// Filter for [`UserDirectory::find_by_username`]
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-insensitive substring match on the username
    pub search: Option<String>,
    /// Restrict to users with at least one live connection
    pub online_only: bool,
}

/// One page of a user search, online users first, then by username
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<DirectoryUser>,
    pub total: u64,
}

/// External user directory consumed by the gateway
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Verify a handshake credential and return the identity it carries
    async fn verify_token(&self, token: &str) -> Result<Identity, ChatError>;

    /// Record whether an identity currently has any live connection
    async fn set_online(&self, identity: &Identity, online: bool) -> Result<(), ChatError>;

    /// Search users by username
    async fn find_by_username(
        &self,
        query: &UserQuery,
        page: Pagination,
    ) -> Result<UserPage, ChatError>;
}
