#![allow(clippy::float_cmp)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::executor::block_on;
use uuid::Uuid;

use super::*;
use crate::doc::{DrawingContent, NoteContent, TextContent};

// =============================================================
// In-memory backend
// =============================================================

/// Backend that keeps rows in memory and can be told to fail.
#[derive(Default)]
pub(crate) struct MemoryBackend {
    pub rows: RefCell<Vec<Note>>,
    pub failing: Cell<bool>,
    pub feed: Rc<RefCell<VecDeque<ChangeEvent>>>,
    pub calls: Cell<usize>,
}

impl MemoryBackend {
    pub fn with_rows(rows: Vec<Note>) -> Self {
        Self { rows: RefCell::new(rows), ..Self::default() }
    }

    fn check(&self) -> Result<(), StoreError> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.get() { Err(StoreError::Transport("offline".into())) } else { Ok(()) }
    }
}

pub(crate) struct MemoryFeed {
    queue: Rc<RefCell<VecDeque<ChangeEvent>>>,
}

#[async_trait(?Send)]
impl ChangeSource for MemoryFeed {
    async fn next_change(&mut self) -> Option<ChangeEvent> {
        self.queue.borrow_mut().pop_front()
    }
}

#[async_trait(?Send)]
impl NoteBackend for MemoryBackend {
    type Feed = MemoryFeed;

    async fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        self.check()?;
        Ok(self.rows.borrow().clone())
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        self.check()?;
        let note = Note {
            id: Uuid::new_v4(),
            x_coord: draft.x_coord,
            y_coord: draft.y_coord,
            content: draft.content.clone(),
            created_at: Some(format!("2024-01-01T00:00:{:02}Z", self.rows.borrow().len())),
        };
        self.rows.borrow_mut().push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, StoreError> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        let row = rows.iter_mut().find(|n| n.id == id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(row);
        Ok(row.clone())
    }

    async fn delete(&self, id: NoteId) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|n| n.id != id);
        if rows.len() == before { Err(StoreError::NotFound(id)) } else { Ok(()) }
    }

    async fn subscribe(&self) -> Result<Self::Feed, StoreError> {
        self.check()?;
        Ok(MemoryFeed { queue: Rc::clone(&self.feed) })
    }
}

pub(crate) fn text_note(x: f64, y: f64, text: &str) -> Note {
    Note {
        id: Uuid::new_v4(),
        x_coord: x,
        y_coord: y,
        content: NoteContent::Text(TextContent { text: text.to_owned(), ..TextContent::default() }),
        created_at: None,
    }
}

fn text_draft(text: &str) -> NoteDraft {
    NoteDraft {
        x_coord: 0.1,
        y_coord: 0.2,
        content: NoteContent::Text(TextContent { text: text.to_owned(), ..TextContent::default() }),
    }
}

// =============================================================
// load_all
// =============================================================

#[test]
fn load_all_replaces_list() {
    let rows = vec![text_note(0.1, 0.1, "a"), text_note(0.2, 0.2, "b")];
    let mut store = NoteStore::new(MemoryBackend::with_rows(rows.clone()));
    let loaded = block_on(store.load_all());
    assert_eq!(loaded, rows.as_slice());
}

#[test]
fn load_all_failure_keeps_list() {
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![text_note(0.0, 0.0, "a")]));
    block_on(store.load_all());
    store.backend().failing.set(true);
    let loaded = block_on(store.load_all());
    assert_eq!(loaded.len(), 1);
}

// =============================================================
// create
// =============================================================

#[test]
fn create_appends_stored_note() {
    let mut store = NoteStore::new(MemoryBackend::default());
    let note = block_on(store.create(text_draft("hello"))).unwrap();
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.get(&note.id), Some(&note));
    assert!(note.created_at.is_some());
}

#[test]
fn create_appends_on_top() {
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![text_note(0.0, 0.0, "old")]));
    block_on(store.load_all());
    let note = block_on(store.create(text_draft("new"))).unwrap();
    assert_eq!(store.notes().as_slice().last().map(|n| n.id), Some(note.id));
}

#[test]
fn create_failure_leaves_list_unchanged() {
    let store_backend = MemoryBackend::default();
    store_backend.failing.set(true);
    let mut store = NoteStore::new(store_backend);
    let result = block_on(store.create(text_draft("lost")));
    assert!(matches!(result, Err(StoreError::Transport(_))));
    assert!(store.notes().is_empty());
}

#[test]
fn create_after_echoed_insert_does_not_duplicate() {
    let mut store = NoteStore::new(MemoryBackend::default());
    let note = block_on(store.create(text_draft("once"))).unwrap();
    store.apply_change(ChangeEvent::Insert(note));
    assert_eq!(store.notes().len(), 1);
}

// =============================================================
// update
// =============================================================

#[test]
fn update_replaces_local_copy() {
    let original = text_note(0.1, 0.1, "before");
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![original.clone()]));
    block_on(store.load_all());

    let patch = NotePatch {
        x_coord: Some(0.6),
        content: Some(NoteContent::Text(TextContent { text: "after".into(), ..TextContent::default() })),
        ..NotePatch::default()
    };
    let updated = block_on(store.update(original.id, patch)).unwrap();

    assert_eq!(updated.x_coord, 0.6);
    assert_eq!(store.get(&original.id), Some(&updated));
}

#[test]
fn update_failure_leaves_local_copy() {
    let original = text_note(0.1, 0.1, "before");
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![original.clone()]));
    block_on(store.load_all());
    store.backend().failing.set(true);

    let patch = NotePatch::content(NoteContent::Drawing(DrawingContent::with_image("data:x")));
    assert!(block_on(store.update(original.id, patch)).is_err());
    assert_eq!(store.get(&original.id), Some(&original));
}

#[test]
fn update_unknown_note_is_error() {
    let mut store = NoteStore::new(MemoryBackend::default());
    let id = Uuid::new_v4();
    let result = block_on(store.update(id, NotePatch { y_coord: Some(0.5), ..NotePatch::default() }));
    assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
}

// =============================================================
// delete
// =============================================================

#[test]
fn delete_removes_from_list() {
    let a = text_note(0.0, 0.0, "a");
    let b = text_note(0.0, 0.0, "b");
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![a.clone(), b.clone()]));
    block_on(store.load_all());
    assert!(block_on(store.delete(a.id)));
    assert_eq!(store.notes().len(), 1);
    assert!(store.get(&a.id).is_none());
    assert!(store.get(&b.id).is_some());
}

#[test]
fn delete_failure_keeps_note() {
    let a = text_note(0.0, 0.0, "a");
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![a.clone()]));
    block_on(store.load_all());
    store.backend().failing.set(true);
    assert!(!block_on(store.delete(a.id)));
    assert!(store.get(&a.id).is_some());
}

// =============================================================
// Realtime
// =============================================================

#[test]
fn subscribe_delivers_queued_changes() {
    let mut store = NoteStore::new(MemoryBackend::default());
    let remote = text_note(0.4, 0.4, "remote");
    store.backend().feed.borrow_mut().push_back(ChangeEvent::Insert(remote.clone()));
    store.backend().feed.borrow_mut().push_back(ChangeEvent::Delete(Uuid::new_v4()));

    let mut feed = block_on(store.subscribe()).unwrap();
    let mut applied = Vec::new();
    while let Some(event) = block_on(feed.next_change()) {
        applied.push(store.apply_change(event));
    }

    assert_eq!(applied, vec![true, false]);
    assert_eq!(store.get(&remote.id), Some(&remote));
}

#[test]
fn run_feed_forwards_every_change_until_close() {
    let mut store = NoteStore::new(MemoryBackend::default());
    let remote = text_note(0.4, 0.4, "remote");
    store.backend().feed.borrow_mut().push_back(ChangeEvent::Insert(remote.clone()));
    store.backend().feed.borrow_mut().push_back(ChangeEvent::Delete(remote.id));
    let mut feed = block_on(store.subscribe()).unwrap();

    let mut seen = Vec::new();
    let delivered = block_on(run_feed(&mut feed, |event| seen.push(event)));

    assert_eq!(delivered, 2);
    assert_eq!(seen, vec![ChangeEvent::Insert(remote.clone()), ChangeEvent::Delete(remote.id)]);
    for event in seen {
        store.apply_change(event);
    }
    assert!(store.notes().is_empty());
}

#[test]
fn run_feed_on_closed_feed_delivers_nothing() {
    let store = NoteStore::new(MemoryBackend::default());
    let mut feed = block_on(store.subscribe()).unwrap();
    assert_eq!(block_on(run_feed(&mut feed, |_| {})), 0);
}

#[test]
fn subscribe_failure_is_error() {
    let store = NoteStore::new(MemoryBackend::default());
    store.backend().failing.set(true);
    assert!(block_on(store.subscribe()).is_err());
}

#[test]
fn remote_delete_of_unknown_id_is_noop() {
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![text_note(0.0, 0.0, "a")]));
    block_on(store.load_all());
    assert!(!store.apply_change(ChangeEvent::Delete(Uuid::new_v4())));
    assert_eq!(store.notes().len(), 1);
}

#[test]
fn late_remote_update_overwrites_local_write() {
    let original = text_note(0.1, 0.1, "v1");
    let mut store = NoteStore::new(MemoryBackend::with_rows(vec![original.clone()]));
    block_on(store.load_all());
    block_on(store.update(original.id, NotePatch { x_coord: Some(0.9), ..NotePatch::default() })).unwrap();

    let mut stale = original.clone();
    stale.x_coord = 0.3;
    store.apply_change(ChangeEvent::Update(stale));
    assert_eq!(store.get(&original.id).map(|n| n.x_coord), Some(0.3));
}
