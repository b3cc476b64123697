//! Error Types
//!
//! This module defines the error taxonomy for the chat backend.
//!
//! # Error Categories
//!
//! - `Authentication` - missing credential at handshake, terminates the
//!   connection attempt
//! - `InvalidToken` - credential failed verification, terminates the
//!   connection attempt
//! - `Validation` - malformed event payload, reported to the requesting
//!   connection which stays open
//! - `Persistence` - store unavailable or a write failed
//! - `NotFound` - target conversation or user absent
//!
//! Failures inside an event handler never crash the connection: they are
//! caught at the handler boundary and converted into an `error` event for
//! the originating connection plus a log record.
use thiserror::Error;

/// Errors produced by the chat backend
#[derive(Debug, Error, Clone)]
pub enum ChatError {
    /// No credential was supplied at the handshake
    #[error("Authentication error")]
    Authentication,

    /// The supplied credential failed verification
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Why verification failed
        reason: String,
    },

    /// Malformed or incomplete event payload
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message
        message: String,
    },

    /// The message store was unavailable or a write failed
    #[error("Persistence error: {message}")]
    Persistence {
        /// Human-readable error message
        message: String,
    },

    /// Target conversation or user does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },
}

impl ChatError {
    /// Create a new invalid-token error
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Whether this error terminates the connection attempt
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication | Self::InvalidToken { .. })
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("row not found"),
            other => Self::persistence(other.to_string()),
        }
    }
}
