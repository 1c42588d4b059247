//! Document model: notes, their content, realtime change events, and the
//! in-memory ordered note list.
//!
//! Notes cross the wire as flat records (`{id, type, x_coord, y_coord, content,
//! created_at}`) where `content` is untyped JSON switched on `type`. In memory
//! that pair becomes the [`NoteContent`] enum. Conversion goes through
//! [`NoteRecord`] so a record with an unknown `type` or mismatched content is
//! rejected at deserialization instead of leaking into the store.
//!
//! `NoteList` keeps insertion order: later notes are drawn on top and win hit tests.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{DRAWING_NOTE_HEIGHT, NOTE_WIDTH, TEXT_NOTE_HEIGHT};

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// Default note font.
pub const DEFAULT_FONT: &str = "Quicksand";
/// Default note font weight.
pub const DEFAULT_WEIGHT: &str = "500";
/// Default note text color.
pub const DEFAULT_COLOR: &str = "#333333";

/// The `type` discriminator of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Text,
    Drawing,
}

impl NoteKind {
    /// Size of the note's box in canvas pixels.
    #[must_use]
    pub fn size(self) -> (f64, f64) {
        match self {
            Self::Text => (NOTE_WIDTH, TEXT_NOTE_HEIGHT),
            Self::Drawing => (NOTE_WIDTH, DRAWING_NOTE_HEIGHT),
        }
    }

    /// The `type` column value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Drawing => "drawing",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "drawing" => Some(Self::Drawing),
            _ => None,
        }
    }
}

/// Styled text shown on a text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_weight")]
    pub weight: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for TextContent {
    fn default() -> Self {
        Self { text: String::new(), font: default_font(), weight: default_weight(), color: default_color() }
    }
}

fn default_font() -> String {
    DEFAULT_FONT.to_owned()
}

fn default_weight() -> String {
    DEFAULT_WEIGHT.to_owned()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

/// Image carried by a drawing note: a PNG data URL, or nothing for a blank drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingContent {
    pub image: Option<String>,
}

impl DrawingContent {
    #[must_use]
    pub fn with_image(data_url: impl Into<String>) -> Self {
        Self { image: Some(data_url.into()) }
    }
}

/// Typed note payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteContent {
    Text(TextContent),
    Drawing(DrawingContent),
}

impl NoteContent {
    #[must_use]
    pub fn kind(&self) -> NoteKind {
        match self {
            Self::Text(_) => NoteKind::Text,
            Self::Drawing(_) => NoteKind::Drawing,
        }
    }

    /// Rebuild typed content from a wire `type` and its JSON payload.
    ///
    /// Drawing payloads are accepted as a bare data URL string, as
    /// `{"imageData": ...}`, or as `null`.
    ///
    /// # Errors
    ///
    /// Returns a message when the payload does not fit the kind.
    pub fn from_parts(kind: NoteKind, content: serde_json::Value) -> Result<Self, String> {
        match kind {
            NoteKind::Text => serde_json::from_value::<TextContent>(content)
                .map(Self::Text)
                .map_err(|e| format!("invalid text content: {e}")),
            NoteKind::Drawing => match content {
                serde_json::Value::Null => Ok(Self::Drawing(DrawingContent::default())),
                serde_json::Value::String(url) => Ok(Self::Drawing(DrawingContent::with_image(url))),
                serde_json::Value::Object(map) => match map.get("imageData") {
                    None | Some(serde_json::Value::Null) => Ok(Self::Drawing(DrawingContent::default())),
                    Some(serde_json::Value::String(url)) => Ok(Self::Drawing(DrawingContent::with_image(url.clone()))),
                    Some(other) => Err(format!("invalid imageData: {other}")),
                },
                other => Err(format!("invalid drawing content: {other}")),
            },
        }
    }

    /// Split into the wire `type` and JSON payload.
    #[must_use]
    pub fn to_parts(&self) -> (NoteKind, serde_json::Value) {
        match self {
            Self::Text(text) => (NoteKind::Text, serde_json::to_value(text).unwrap_or_default()),
            Self::Drawing(drawing) => (NoteKind::Drawing, serde_json::json!({ "imageData": drawing.image })),
        }
    }
}

/// Flat wire shape of a note, as stored in the `notes` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub x_coord: f64,
    pub y_coord: f64,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A note on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord", into = "NoteRecord")]
pub struct Note {
    pub id: NoteId,
    /// Horizontal position as a fraction of the canvas width.
    pub x_coord: f64,
    /// Vertical position as a fraction of the canvas height.
    pub y_coord: f64,
    pub content: NoteContent,
    /// Creation timestamp (RFC 3339), assigned by the database.
    pub created_at: Option<String>,
}

impl TryFrom<NoteRecord> for Note {
    type Error = String;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            x_coord: record.x_coord,
            y_coord: record.y_coord,
            content: NoteContent::from_parts(record.kind, record.content)?,
            created_at: record.created_at,
        })
    }
}

impl From<Note> for NoteRecord {
    fn from(note: Note) -> Self {
        let (kind, content) = note.content.to_parts();
        Self { id: note.id, kind, x_coord: note.x_coord, y_coord: note.y_coord, content, created_at: note.created_at }
    }
}

impl Note {
    #[must_use]
    pub fn kind(&self) -> NoteKind {
        self.content.kind()
    }

    /// Top-left corner of the note in canvas space.
    #[must_use]
    pub fn canvas_origin(&self) -> Point {
        crate::camera::Viewport::normalized_to_canvas(Point::new(self.x_coord, self.y_coord))
    }

    /// Whether a canvas-space point falls inside the note's box (edges inclusive).
    #[must_use]
    pub fn contains(&self, canvas_pt: Point) -> bool {
        let origin = self.canvas_origin();
        let (w, h) = self.kind().size();
        canvas_pt.x >= origin.x && canvas_pt.x <= origin.x + w && canvas_pt.y >= origin.y && canvas_pt.y <= origin.y + h
    }
}

/// A note that has not been persisted yet. The database assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DraftRecord", into = "DraftRecord")]
pub struct NoteDraft {
    pub x_coord: f64,
    pub y_coord: f64,
    pub content: NoteContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub x_coord: f64,
    pub y_coord: f64,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl TryFrom<DraftRecord> for NoteDraft {
    type Error = String;

    fn try_from(record: DraftRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            x_coord: record.x_coord,
            y_coord: record.y_coord,
            content: NoteContent::from_parts(record.kind, record.content)?,
        })
    }
}

impl From<NoteDraft> for DraftRecord {
    fn from(draft: NoteDraft) -> Self {
        let (kind, content) = draft.content.to_parts();
        Self { kind, x_coord: draft.x_coord, y_coord: draft.y_coord, content }
    }
}

/// Sparse update for a note. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatchRecord", into = "PatchRecord")]
pub struct NotePatch {
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub content: Option<NoteContent>,
}

impl NotePatch {
    #[must_use]
    pub fn content(content: NoteContent) -> Self {
        Self { content: Some(content), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_coord.is_none() && self.y_coord.is_none() && self.content.is_none()
    }

    /// Apply the present fields to `note`.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(x) = self.x_coord {
            note.x_coord = x;
        }
        if let Some(y) = self.y_coord {
            note.y_coord = y;
        }
        if let Some(ref content) = self.content {
            note.content = content.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_coord: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_coord: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NoteKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

impl TryFrom<PatchRecord> for NotePatch {
    type Error = String;

    fn try_from(record: PatchRecord) -> Result<Self, Self::Error> {
        let content = match (record.kind, record.content) {
            (Some(kind), content) => Some(NoteContent::from_parts(kind, content.unwrap_or_default())?),
            (None, Some(_)) => return Err("content requires a type".to_owned()),
            (None, None) => None,
        };
        Ok(Self { x_coord: record.x_coord, y_coord: record.y_coord, content })
    }
}

impl From<NotePatch> for PatchRecord {
    fn from(patch: NotePatch) -> Self {
        let (kind, content) = match patch.content {
            Some(content) => {
                let (kind, value) = content.to_parts();
                (Some(kind), Some(value))
            }
            None => (None, None),
        };
        Self { x_coord: patch.x_coord, y_coord: patch.y_coord, kind, content }
    }
}

// =============================================================
// Realtime change events
// =============================================================

/// Change-feed operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Identity of a deleted row, the `old` half of a DELETE event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldRecord {
    pub id: NoteId,
}

/// Wire shape of a change-feed message: `{eventType, new, old}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePayload {
    #[serde(rename = "eventType")]
    pub event_type: ChangeKind,
    #[serde(default)]
    pub new: Option<Note>,
    #[serde(default)]
    pub old: Option<OldRecord>,
}

/// A change made by any client, delivered through the realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChangePayload", into = "ChangePayload")]
pub enum ChangeEvent {
    Insert(Note),
    Update(Note),
    Delete(NoteId),
}

impl TryFrom<ChangePayload> for ChangeEvent {
    type Error = String;

    fn try_from(payload: ChangePayload) -> Result<Self, Self::Error> {
        match (payload.event_type, payload.new, payload.old) {
            (ChangeKind::Insert, Some(note), _) => Ok(Self::Insert(note)),
            (ChangeKind::Update, Some(note), _) => Ok(Self::Update(note)),
            (ChangeKind::Delete, _, Some(old)) => Ok(Self::Delete(old.id)),
            (kind, _, _) => Err(format!("{kind:?} event is missing its record")),
        }
    }
}

impl From<ChangeEvent> for ChangePayload {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::Insert(note) => Self { event_type: ChangeKind::Insert, new: Some(note), old: None },
            ChangeEvent::Update(note) => Self { event_type: ChangeKind::Update, new: Some(note), old: None },
            ChangeEvent::Delete(id) => Self { event_type: ChangeKind::Delete, new: None, old: Some(OldRecord { id }) },
        }
    }
}

impl ChangeEvent {
    /// Parse a feed message. Malformed messages yield `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("ignoring malformed change event: {e}");
                None
            }
        }
    }
}

// =============================================================
// NoteList
// =============================================================

/// In-memory notes in insertion order (bottom first).
#[derive(Debug, Clone, Default)]
pub struct NoteList {
    notes: Vec<Note>,
}

impl NoteList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every note with a freshly loaded list.
    pub fn load(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Append a note on top.
    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Replace the note with the same id, or append if absent.
    pub fn upsert(&mut self, note: Note) {
        match self.position(&note.id) {
            Some(index) => self.notes[index] = note,
            None => self.notes.push(note),
        }
    }

    /// Replace the note with the same id. Returns `false` if it is not present.
    pub fn replace(&mut self, note: Note) -> bool {
        let Some(index) = self.position(&note.id) else {
            return false;
        };
        self.notes[index] = note;
        true
    }

    /// Remove a note by id, returning it if it was present.
    pub fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.position(id)?;
        Some(self.notes.remove(index))
    }

    /// Apply a realtime change. Returns `true` if the list changed.
    pub fn apply_change(&mut self, event: ChangeEvent) -> bool {
        match event {
            ChangeEvent::Insert(note) => {
                self.upsert(note);
                true
            }
            ChangeEvent::Update(note) => self.replace(note),
            ChangeEvent::Delete(id) => self.remove(&id).is_some(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == *id)
    }

    /// Notes bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id == *id)
    }
}

impl<'a> IntoIterator for &'a NoteList {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}
