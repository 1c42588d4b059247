//! Note REST routes.

#[cfg(test)]
#[path = "notes_test.rs"]
mod notes_test;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::doc::{Note, NoteDraft, NoteId, NotePatch};
use tracing::error;

use crate::services::notes::{self, NoteError};
use crate::state::AppState;

pub(crate) fn note_error_to_status(err: NoteError) -> StatusCode {
    match err {
        NoteError::NotFound(_) => StatusCode::NOT_FOUND,
        NoteError::Invalid(_) => StatusCode::BAD_REQUEST,
        NoteError::Database(e) => {
            error!(error = %e, "note query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/notes`: every note, oldest first.
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, StatusCode> {
    let notes = notes::list_notes(&state.pool).await.map_err(note_error_to_status)?;
    Ok(Json(notes))
}

/// `POST /api/notes`: create a note, returning it with its assigned id.
pub async fn create_note(
    State(state): State<AppState>,
    Json(draft): Json<NoteDraft>,
) -> Result<(StatusCode, Json<Note>), StatusCode> {
    let note = notes::create_note(&state.pool, draft).await.map_err(note_error_to_status)?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// `PATCH /api/notes/{id}`: apply a sparse update.
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<NoteId>,
    Json(patch): Json<NotePatch>,
) -> Result<Json<Note>, StatusCode> {
    let note = notes::update_note(&state.pool, id, patch).await.map_err(note_error_to_status)?;
    Ok(Json(note))
}

/// `DELETE /api/notes/{id}`
pub async fn delete_note(State(state): State<AppState>, Path(id): Path<NoteId>) -> Result<StatusCode, StatusCode> {
    notes::delete_note(&state.pool, id).await.map_err(note_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}
