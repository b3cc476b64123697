//! Routes
//!
//! Router assembly for the HTTP surface.

pub mod router;
