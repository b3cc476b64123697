/**
 * Router Configuration
 *
 * Assembles the axum router. The realtime surface is a single WebSocket
 * endpoint; registration, login, and history retrieval belong to the
 * external REST surface and are not served here.
 */
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::backend::chat::socket::ws_handler;
use crate::backend::server::state::AppState;

/// Create the axum router with all routes configured.
///
/// - `GET /ws` - authenticated WebSocket upgrade (the chat gateway)
/// - `GET /` - liveness probe
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .fallback(|| async { "404 Not Found" })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Chat backend running" }))
}
