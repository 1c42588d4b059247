//! Note service: CRUD over the `notes` table.
//!
//! DESIGN
//! ======
//! Rows are read as plain tuples and rebuilt into typed [`Note`] values via
//! the shared document model, so the server and the canvas agree on one
//! content encoding. Rows whose content no longer fits their `type` are
//! skipped on list and reported as invalid on direct fetch.
//!
//! Writes never publish change events themselves. The table trigger raises
//! a notification and `services::feed` relays it, so every write path
//! (including ones outside this process) reaches subscribers exactly once.

#[cfg(test)]
#[path = "notes_test.rs"]
mod notes_test;

use canvas::doc::{Note, NoteContent, NoteDraft, NoteId, NoteKind, NotePatch};
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("invalid note: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row shape returned by every note query.
pub(crate) type NoteRow = (NoteId, String, f64, f64, serde_json::Value, OffsetDateTime);

const NOTE_COLUMNS: &str = "id, \"type\", x_coord, y_coord, content, created_at";

// =============================================================================
// VALIDATION
// =============================================================================

fn validate_coord(name: &str, value: f64) -> Result<(), NoteError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(NoteError::Invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

/// Check a draft before insert.
///
/// # Errors
///
/// Returns [`NoteError::Invalid`] when a coordinate is outside `[0, 1]`.
pub fn validate_draft(draft: &NoteDraft) -> Result<(), NoteError> {
    validate_coord("x_coord", draft.x_coord)?;
    validate_coord("y_coord", draft.y_coord)
}

/// Check a patch before update.
///
/// # Errors
///
/// Returns [`NoteError::Invalid`] for an empty patch or an out-of-range coordinate.
pub fn validate_patch(patch: &NotePatch) -> Result<(), NoteError> {
    if patch.is_empty() {
        return Err(NoteError::Invalid("patch has no fields".into()));
    }
    if let Some(x) = patch.x_coord {
        validate_coord("x_coord", x)?;
    }
    if let Some(y) = patch.y_coord {
        validate_coord("y_coord", y)?;
    }
    Ok(())
}

pub(crate) fn note_from_row(row: NoteRow) -> Result<Note, NoteError> {
    let (id, kind, x_coord, y_coord, content, created_at) = row;
    let kind = NoteKind::from_name(&kind).ok_or_else(|| NoteError::Invalid(format!("unknown note type {kind:?}")))?;
    let content = NoteContent::from_parts(kind, content).map_err(NoteError::Invalid)?;
    let created_at = created_at.format(&Rfc3339).map_err(|e| NoteError::Invalid(e.to_string()))?;
    Ok(Note { id, x_coord, y_coord, content, created_at: Some(created_at) })
}

// =============================================================================
// CRUD
// =============================================================================

/// List every note, oldest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_notes(pool: &PgPool) -> Result<Vec<Note>, NoteError> {
    let rows = sqlx::query_as::<_, NoteRow>(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at ASC, id ASC"))
        .fetch_all(pool)
        .await?;

    let mut notes = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.0;
        match note_from_row(row) {
            Ok(note) => notes.push(note),
            Err(e) => warn!(%id, error = %e, "skipping unreadable note"),
        }
    }
    Ok(notes)
}

/// Fetch one note.
///
/// # Errors
///
/// Returns `NotFound` if the row does not exist.
pub async fn get_note(pool: &PgPool, id: NoteId) -> Result<Note, NoteError> {
    let row = sqlx::query_as::<_, NoteRow>(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(NoteError::NotFound(id))?;
    note_from_row(row)
}

/// Insert a note. The database assigns `id` and `created_at`.
///
/// # Errors
///
/// Returns `Invalid` for out-of-range coordinates, or a database error.
pub async fn create_note(pool: &PgPool, draft: NoteDraft) -> Result<Note, NoteError> {
    validate_draft(&draft)?;
    let (kind, content) = draft.content.to_parts();

    let row = sqlx::query_as::<_, NoteRow>(&format!(
        "INSERT INTO notes (\"type\", x_coord, y_coord, content)
         VALUES ($1, $2, $3, $4)
         RETURNING {NOTE_COLUMNS}"
    ))
    .bind(kind.as_str())
    .bind(draft.x_coord)
    .bind(draft.y_coord)
    .bind(content)
    .fetch_one(pool)
    .await?;

    note_from_row(row)
}

/// Apply the present fields of `patch` to a note.
///
/// # Errors
///
/// Returns `Invalid` for a bad patch, `NotFound` if the row does not exist.
pub async fn update_note(pool: &PgPool, id: NoteId, patch: NotePatch) -> Result<Note, NoteError> {
    validate_patch(&patch)?;
    let (kind, content) = match patch.content {
        Some(content) => {
            let (kind, value) = content.to_parts();
            (Some(kind.as_str()), Some(value))
        }
        None => (None, None),
    };

    let row = sqlx::query_as::<_, NoteRow>(&format!(
        "UPDATE notes
         SET x_coord = COALESCE($2, x_coord),
             y_coord = COALESCE($3, y_coord),
             \"type\" = COALESCE($4, \"type\"),
             content = COALESCE($5, content)
         WHERE id = $1
         RETURNING {NOTE_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.x_coord)
    .bind(patch.y_coord)
    .bind(kind)
    .bind(content)
    .fetch_optional(pool)
    .await?
    .ok_or(NoteError::NotFound(id))?;

    note_from_row(row)
}

/// Delete a note.
///
/// # Errors
///
/// Returns `NotFound` if no row was deleted.
pub async fn delete_note(pool: &PgPool, id: NoteId) -> Result<(), NoteError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(NoteError::NotFound(id));
    }
    Ok(())
}
