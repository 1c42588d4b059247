//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool and the sending half of the change-feed broadcast
//! channel. The notify listener publishes; every websocket subscriber holds
//! its own receiver.

use canvas::doc::ChangeEvent;
use sqlx::PgPool;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
pub const FEED_CAPACITY: usize = 256;

/// Shared application state. Clone is required by Axum; both fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub changes: broadcast::Sender<ChangeEvent>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(FEED_CAPACITY);
        Self { pool, changes }
    }

    /// Send a change to every subscriber. Returns how many received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.changes.send(event).unwrap_or(0)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
