/**
 * JWT Tokens
 *
 * This module handles JWT token verification for connection handshakes,
 * plus generation for tests and tooling.
 */
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::Identity;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Display name
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.username.clone())
    }
}

/// Get JWT secret from environment
fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET ({}); using development fallback", err);
        "your-secret-key-change-in-production".to_string()
    })
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User ID
/// * `username` - Display name
///
/// # Returns
/// JWT token string
pub fn create_token(user_id: &str, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    // Token expires in 30 days
    let exp = now + (30 * 24 * 60 * 60);

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp,
        iat: now,
    };

    let secret = get_jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// # Arguments
/// * `token` - JWT token string
///
/// # Returns
/// Decoded claims or error
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = get_jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
