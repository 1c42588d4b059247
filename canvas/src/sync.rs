//! Note store: keeps the in-memory [`NoteList`] consistent with the database.
//!
//! Every CRUD operation goes to a [`NoteBackend`] first; the list is only
//! mutated after the backend reports success, so a failed call leaves local
//! state untouched. Inbound realtime events from a [`ChangeSource`] are applied
//! by id with last-write-wins semantics.
//!
//! ERROR HANDLING
//! ==============
//! Failures are logged here and handed back as `Err`/`false`. Nothing retries
//! and nothing is queued; the worst case is a stale list until the next load.

#[cfg(test)]
#[path = "sync_test.rs"]
pub(crate) mod sync_test;

use async_trait::async_trait;

use crate::doc::{ChangeEvent, Note, NoteDraft, NoteId, NoteList, NotePatch};

/// Errors surfaced by a note backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("note not found: {0}")]
    NotFound(NoteId),
}

/// The database collaborator: CRUD on the `notes` table plus a change feed.
#[async_trait(?Send)]
pub trait NoteBackend {
    type Feed: ChangeSource;

    /// All notes, oldest first.
    async fn load_all(&self) -> Result<Vec<Note>, StoreError>;

    /// Insert a note and return the stored record.
    async fn create(&self, draft: &NoteDraft) -> Result<Note, StoreError>;

    /// Apply a patch and return the stored record.
    async fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, StoreError>;

    async fn delete(&self, id: NoteId) -> Result<(), StoreError>;

    /// Open a realtime feed of changes made by any client.
    async fn subscribe(&self) -> Result<Self::Feed, StoreError>;
}

/// A stream of realtime changes.
#[async_trait(?Send)]
pub trait ChangeSource {
    /// The next well-formed change, or `None` once the feed has closed.
    /// Malformed messages are skipped.
    async fn next_change(&mut self) -> Option<ChangeEvent>;
}

/// Ordered notes plus the backend that persists them.
pub struct NoteStore<B> {
    backend: B,
    notes: NoteList,
}

impl<B: NoteBackend> NoteStore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend, notes: NoteList::new() }
    }

    #[must_use]
    pub fn notes(&self) -> &NoteList {
        &self.notes
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the list with everything in the database. On failure the
    /// current list is kept.
    pub async fn load_all(&mut self) -> &[Note] {
        match self.backend.load_all().await {
            Ok(notes) => {
                log::info!("loaded {} notes", notes.len());
                self.notes.load(notes);
            }
            Err(e) => log::error!("failed to load notes: {e}"),
        }
        self.notes.as_slice()
    }

    /// Persist a new note, then append it on top.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    pub async fn create(&mut self, draft: NoteDraft) -> Result<Note, StoreError> {
        match self.backend.create(&draft).await {
            Ok(note) => {
                self.notes.upsert(note.clone());
                Ok(note)
            }
            Err(e) => {
                log::error!("failed to create note: {e}");
                Err(e)
            }
        }
    }

    /// Persist a patch, then replace the local copy with the stored record.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    pub async fn update(&mut self, id: NoteId, patch: NotePatch) -> Result<Note, StoreError> {
        match self.backend.update(id, &patch).await {
            Ok(note) => {
                self.notes.replace(note.clone());
                Ok(note)
            }
            Err(e) => {
                log::error!("failed to update note {id}: {e}");
                Err(e)
            }
        }
    }

    /// Delete a note from the database, then from the list. Returns `false` on failure.
    pub async fn delete(&mut self, id: NoteId) -> bool {
        match self.backend.delete(id).await {
            Ok(()) => {
                self.notes.remove(&id);
                true
            }
            Err(e) => {
                log::error!("failed to delete note {id}: {e}");
                false
            }
        }
    }

    /// Open the realtime feed. Feed each event to [`NoteStore::apply_change`].
    ///
    /// # Errors
    ///
    /// Returns the backend error when the feed cannot be opened.
    pub async fn subscribe(&self) -> Result<B::Feed, StoreError> {
        self.backend.subscribe().await.inspect_err(|e| log::error!("failed to subscribe to changes: {e}"))
    }

    /// Apply an inbound change. Returns `true` if the list changed.
    pub fn apply_change(&mut self, event: ChangeEvent) -> bool {
        self.notes.apply_change(event)
    }
}

/// Pump a feed into `on_change` until it closes. Returns how many events were delivered.
/// Typically `on_change` hands each event to `EngineCore::apply_change`.
pub async fn run_feed<F: ChangeSource>(feed: &mut F, mut on_change: impl FnMut(ChangeEvent)) -> usize {
    let mut delivered = 0;
    while let Some(event) = feed.next_change().await {
        on_change(event);
        delivered += 1;
    }
    log::info!("change feed closed after {delivered} events");
    delivered
}
