//! Backend Server
//!
//! Server-side modules: the WebSocket gateway and chat handlers, the
//! in-memory realtime registries, the collaborator traits with their
//! implementations, and server wiring.

pub mod auth;
pub mod chat;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod store;
pub mod users;
