//! Authenticated Identity
//!
//! The identity carried by every session. Owned by the user directory, the
//! engine only references it.

use serde::{Deserialize, Serialize};

/// A verified user identity, decoded from the handshake credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user id
    pub id: String,
    /// Display name
    pub username: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
