//! Change-feed websocket.
//!
//! DESIGN
//! ======
//! Each connection subscribes to the broadcast channel in `AppState` and
//! forwards every `ChangeEvent` as a JSON text frame
//! (`{"eventType", "new", "old"}`). Inbound frames are ignored apart from
//! close. A subscriber that falls more than `FEED_CAPACITY` events behind
//! skips the missed events and keeps going.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use canvas::doc::ChangeEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;

/// `GET /api/notes/changes`: upgrade to the change feed.
pub async fn handle_feed(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_feed(socket, state))
}

async fn run_feed(mut socket: WebSocket, state: AppState) {
    let mut changes = state.changes.subscribe();
    info!(subscribers = state.changes.receiver_count(), "feed: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                if matches!(msg, Message::Close(_)) {
                    break;
                }
            }
            event = changes.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "feed: subscriber lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("feed: client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &ChangeEvent) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "feed: failed to encode change");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
