/**
 * Server Initialization
 *
 * Builds the application: picks the collaborators (Postgres when
 * configured, in-memory otherwise), creates the shared state, and
 * assembles the router.
 */
use std::sync::Arc;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryMessageStore, MessageStore, PgMessageStore};
use crate::backend::users::{MemoryUserDirectory, PgUserDirectory, UserDirectory};

/// Create and configure the axum application.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing chatrelay backend server");

    let (users, messages): (Arc<dyn UserDirectory>, Arc<dyn MessageStore>) =
        match load_database().await {
            Some(pool) => (
                Arc::new(PgUserDirectory::new(pool.clone())),
                Arc::new(PgMessageStore::new(pool)),
            ),
            None => (
                Arc::new(MemoryUserDirectory::new()),
                Arc::new(MemoryMessageStore::new()),
            ),
        };

    let app_state = AppState::new(users, messages);

    // Rooms empty out as clients leave; sweep the registry so long-running
    // processes do not accumulate dead entries.
    let registry = app_state.registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            let dropped = registry.cleanup_empty().await;
            if dropped > 0 {
                tracing::debug!("Cleaned up {} empty rooms", dropped);
            }
        }
    });

    tracing::info!("Realtime state and collaborators initialized");

    create_router(app_state)
}
