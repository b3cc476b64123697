/**
 * Connection Gateway
 *
 * The only place that mutates the connection set. Authenticates WebSocket
 * handshakes, creates sessions, wires events to the handlers, and runs the
 * unconditional disconnect cleanup.
 *
 * # Connection Lifecycle
 *
 * 1. Client upgrades `GET /ws?token=<jwt>`; a missing or invalid token
 *    rejects the upgrade with 401 before any session state exists
 * 2. A session is created and registered with the presence tracker;
 *    crossing 0→1 live sessions broadcasts `userOnline` to everyone
 * 3. A writer task drains the session's outbound channel and the global
 *    broadcast channel into the socket; the read loop dispatches client
 *    events to the handlers
 * 4. On disconnect the session leaves every joined room and the presence
 *    counter; crossing 1→0 broadcasts `userOffline`
 */
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use crate::backend::chat::handlers::handle_client_event;
use crate::backend::realtime::{broadcast_event, Session};
use crate::backend::server::state::AppState;
use crate::shared::{ChatError, ClientEvent, Identity, ServerEvent};

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: Option<String>,
}

/// Handle a WebSocket upgrade (GET /ws)
///
/// The bearer credential is taken from the `token` query parameter or an
/// `Authorization: Bearer` header. Verification failures reject the upgrade
/// before any session state is created.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    let token = params
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| {
            tracing::warn!("[Gateway] connection attempt without credential");
            StatusCode::UNAUTHORIZED
        })?;

    let identity = state.users.verify_token(&token).await.map_err(|e| {
        tracing::warn!("[Gateway] rejected connection: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, identity, socket)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Drive one authenticated connection until it closes.
async fn handle_connection(state: AppState, identity: Identity, socket: WebSocket) {
    let (session, outbound_rx) = open_session(&state, identity).await;
    tracing::info!(
        "[Gateway] user connected: {} - {} ({})",
        session.user_id(),
        session.username(),
        session.id
    );

    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_task(sink, outbound_rx, state.events.subscribe()));

    read_loop(&state, &session, stream).await;

    // Cleanup must run regardless of how the read loop ended; in-flight
    // handler fan-out to this connection is dropped by the closed channel.
    close_session(&state, &session).await;
    writer.abort();

    tracing::info!("[Gateway] user disconnected: {}", session.user_id());
}

/// Create a session and register it with the presence tracker.
///
/// Split out of the socket path so integration tests can run the full
/// lifecycle without a transport.
pub async fn open_session(
    state: &AppState,
    identity: Identity,
) -> (Session, mpsc::UnboundedReceiver<ServerEvent>) {
    let (session, outbound_rx) = Session::new(identity);

    if state.presence.connect(session.user_id()) {
        if let Err(e) = state.users.set_online(&session.identity, true).await {
            tracing::warn!("[Gateway] failed to record online status: {}", e);
        }
        broadcast_event(&state.events, ServerEvent::user_online(session.user_id()));
    }

    (session, outbound_rx)
}

/// Deregister a session from every room and the presence counter.
pub async fn close_session(state: &AppState, session: &Session) {
    state.registry.remove_from_all(session.id).await;

    if state.presence.disconnect(session.user_id()) {
        if let Err(e) = state.users.set_online(&session.identity, false).await {
            tracing::warn!("[Gateway] failed to record offline status: {}", e);
        }
        broadcast_event(&state.events, ServerEvent::user_offline(session.user_id()));
    }
}

/// Dispatch incoming frames until the client closes or the transport fails.
async fn read_loop(state: &AppState, session: &Session, mut stream: SplitStream<WebSocket>) {
    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("[Gateway] transport error for {}: {}", session.id, e);
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(state, session, event).await,
                Err(e) => {
                    let error = ChatError::validation(format!("malformed event: {}", e));
                    tracing::warn!("[Gateway] {} from {}", error, session.user_id());
                    session.send(ServerEvent::error(error.to_string()));
                }
            },
            Message::Close(_) => break,
            // ping/pong handled by axum, binary frames are not part of the
            // protocol
            _ => {}
        }
    }
}

/// Forward outbound and global events into the socket until it closes.
async fn write_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
    mut global: broadcast::Receiver<ServerEvent>,
) {
    loop {
        let event = tokio::select! {
            maybe = outbound.recv() => match maybe {
                Some(event) => event,
                None => break,
            },
            result = global.recv() => match result {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Gateway] writer lagged, skipped {} global events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("[Gateway] failed to serialize event: {:?}", e);
                continue;
            }
        };

        if sink.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }
}
