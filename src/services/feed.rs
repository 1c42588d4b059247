//! Change feed: relays `notes` table notifications to websocket subscribers.
//!
//! DESIGN
//! ======
//! A trigger on `notes` calls `pg_notify('notes_changes', ...)` with the
//! operation and row id. NOTIFY payloads are capped at 8000 bytes and drawing
//! notes carry whole PNG data URLs, so the payload never includes the row.
//! The listener resolves inserts and updates back to full notes before
//! broadcasting them.
//!
//! LIFECYCLE
//! =========
//! `spawn_listener` runs for the life of the process. A dropped listener
//! connection is logged and re-established after `RECONNECT_DELAY`.
//! Changes committed while disconnected are not replayed; clients reload
//! the full list when their own socket reconnects.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use std::time::Duration;

use canvas::doc::{ChangeEvent, ChangeKind, NoteId};
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tracing::{debug, info, warn};

use crate::services::notes::{self, NoteError};
use crate::state::AppState;

/// Postgres channel the notes trigger notifies on.
pub const CHANNEL: &str = "notes_changes";

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Payload raised by the notes trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub event_type: ChangeKind,
    pub id: NoteId,
}

/// Parse a trigger payload. Malformed payloads yield `None`.
#[must_use]
pub fn parse_notification(payload: &str) -> Option<Notification> {
    match serde_json::from_str(payload) {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(error = %e, payload, "ignoring malformed notes notification");
            None
        }
    }
}

/// Turn a notification into a change event.
///
/// Returns `Ok(None)` when an inserted or updated row is already gone; the
/// delete that removed it arrives as its own notification.
///
/// # Errors
///
/// Returns a database error if the row fetch fails.
pub async fn resolve(pool: &PgPool, notification: Notification) -> Result<Option<ChangeEvent>, NoteError> {
    let Notification { event_type, id } = notification;
    if event_type == ChangeKind::Delete {
        return Ok(Some(ChangeEvent::Delete(id)));
    }

    match notes::get_note(pool, id).await {
        Ok(note) if event_type == ChangeKind::Insert => Ok(Some(ChangeEvent::Insert(note))),
        Ok(note) => Ok(Some(ChangeEvent::Update(note))),
        Err(NoteError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolve one raw payload and broadcast it.
pub async fn relay(state: &AppState, payload: &str) {
    let Some(notification) = parse_notification(payload) else {
        return;
    };
    match resolve(&state.pool, notification).await {
        Ok(Some(event)) => {
            let receivers = state.publish(event);
            debug!(id = %notification.id, kind = ?notification.event_type, receivers, "change relayed");
        }
        Ok(None) => debug!(id = %notification.id, "changed note already deleted"),
        Err(e) => warn!(id = %notification.id, error = %e, "failed to resolve note change"),
    }
}

/// Spawn the background LISTEN task.
pub fn spawn_listener(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = listen(&state).await {
                warn!(error = %e, "notes listener disconnected; retrying");
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

async fn listen(state: &AppState) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(&state.pool).await?;
    listener.listen(CHANNEL).await?;
    info!(channel = CHANNEL, "listening for note changes");

    loop {
        let notification = listener.recv().await?;
        relay(state, notification.payload()).await;
    }
}
