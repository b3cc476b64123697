//! Authentication
//!
//! JWT verification for the connection handshake. Token issuance belongs to
//! the REST login surface, which is not part of this crate; the signing
//! helper here exists for tests and tooling.

pub mod sessions;
