/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * Every field is designed for concurrent access from many connection
 * handlers: the registries lock per room / per identity internally, the
 * broadcast sender is thread-safe and cloneable, and the collaborators are
 * shared trait objects.
 */
use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::broadcast;

use crate::backend::realtime::{PresenceTracker, RoomRegistry, ServerEventBroadcast};
use crate::backend::store::MessageStore;
use crate::backend::users::UserDirectory;

/// Central state container for the chat backend
///
/// Owned by the process and handed to handlers by reference; nothing in the
/// engine mutates connection or room state through ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Room key → joined sessions; per-room locking
    pub registry: Arc<RoomRegistry>,

    /// Identity → live-session count
    pub presence: Arc<PresenceTracker>,

    /// Broadcast channel for events addressed to every connection
    /// (presence transitions)
    pub events: ServerEventBroadcast,

    /// External user directory (token verification, online flag, search)
    pub users: Arc<dyn UserDirectory>,

    /// External message store (persistence, read receipts, history)
    pub messages: Arc<dyn MessageStore>,
}

impl AppState {
    /// Build fresh state around the given collaborators.
    pub fn new(users: Arc<dyn UserDirectory>, messages: Arc<dyn MessageStore>) -> Self {
        // Capacity bounds how far a slow connection may lag behind global
        // events before it starts missing them.
        let (events, _) = broadcast::channel(1024);
        Self {
            registry: Arc::new(RoomRegistry::new()),
            presence: Arc::new(PresenceTracker::new()),
            events,
            users,
            messages,
        }
    }
}

impl FromRef<AppState> for Arc<RoomRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for Arc<PresenceTracker> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.presence.clone()
    }
}

impl FromRef<AppState> for ServerEventBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.events.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserDirectory> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MessageStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}
