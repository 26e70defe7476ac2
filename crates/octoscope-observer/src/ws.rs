//! `WebSocket` handler for live graph streaming.
//!
//! Clients connect to `GET /ws/graph`, receive the graph currently on
//! display as the first frame, then one JSON-encoded [`PublishedGraph`]
//! per publish. Unchanged refreshes send nothing, so a connected canvas
//! is only redrawn when the graph actually changed.
//!
//! If a client falls behind, lagged graphs are skipped; the next frame is
//! a complete graph anyway.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use octoscope_core::store::StoreConnector;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, PublishedGraph};

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming published graphs.
///
/// # Route
///
/// `GET /ws/graph`
pub async fn ws_graph<C: StoreConnector>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<C>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

fn frame(graph: &PublishedGraph) -> Option<Message> {
    match serde_json::to_string(graph) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!(revision = graph.revision, "Failed to serialize published graph: {e}");
            None
        }
    }
}

async fn handle_ws<C: StoreConnector>(mut socket: WebSocket, state: Arc<AppState<C>>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the current graph so no publish falls in
    // between.
    let mut rx = state.subscribe();
    let current = state.current();
    let mut last_sent = current.revision;
    if let Some(msg) = frame(&current) {
        if socket.send(msg).await.is_err() {
            debug!("WebSocket client disconnected (send failed)");
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(graph) => {
                        if graph.revision <= last_sent {
                            continue;
                        }
                        last_sent = graph.revision;
                        let Some(msg) = frame(&graph) else {
                            continue;
                        };
                        if socket.send(msg).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
