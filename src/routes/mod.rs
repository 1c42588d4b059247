//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The REST note API and the change-feed websocket live under `/api`. The
//! built canvas front-end is served as static files from everything else.

pub mod feed;
pub mod notes;

use std::path::Path;

use axum::Router;
use axum::routing::{get, patch};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// API routes without the static fallback.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/changes", get(feed::handle_feed))
        .route("/api/notes/{id}", patch(notes::update_note).delete(notes::delete_note))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application: API plus static front-end.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let assets = ServeDir::new(static_dir).append_index_html_on_directories(true);

    api_routes(state)
        .fallback_service(assets)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}
