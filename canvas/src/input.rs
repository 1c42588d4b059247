//! Input model: mouse buttons, keys, context menus, and the text-edit session.
//!
//! Pan gesture state lives on the viewport ([`crate::camera::Motion`]); this
//! module covers everything else the interaction layer tracks between events:
//! which context menu is open and for what, and which note's text is being
//! edited along with its unsaved draft.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{NoteId, NoteKind, TextContent};

/// Fonts offered by the text editor.
pub const FONTS: [&str; 3] = ["Quicksand", "Open Sans", "Roboto"];

/// Font weights offered by the text editor, with their display labels.
pub const WEIGHTS: [(&str, &str); 3] = [("300", "Light"), ("500", "Medium"), ("700", "Bold")];

/// Text of a freshly created text note.
pub const NEW_NOTE_TEXT: &str = "New Note";

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// What a context menu was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    /// Empty canvas.
    Canvas,
    /// An existing note.
    Note { id: NoteId, kind: NoteKind },
}

/// An entry in a context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddTextNote,
    AddDrawingNote,
    EditNote,
    DeleteNote,
    Cancel,
}

/// An open context menu, anchored at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub at: Point,
    pub target: MenuTarget,
}

impl ContextMenu {
    /// Entries in display order.
    #[must_use]
    pub fn items(&self) -> &'static [MenuItem] {
        match self.target {
            MenuTarget::Canvas => &[MenuItem::AddTextNote, MenuItem::AddDrawingNote, MenuItem::Cancel],
            MenuTarget::Note { .. } => &[MenuItem::EditNote, MenuItem::DeleteNote, MenuItem::Cancel],
        }
    }

    /// Display label for an entry, worded for the target.
    #[must_use]
    pub fn label(&self, item: MenuItem) -> &'static str {
        let drawing = matches!(self.target, MenuTarget::Note { kind: NoteKind::Drawing, .. });
        match item {
            MenuItem::AddTextNote => "Text Note",
            MenuItem::AddDrawingNote => "Draw Note",
            MenuItem::EditNote if drawing => "Edit Drawing",
            MenuItem::EditNote => "Edit Note",
            MenuItem::DeleteNote if drawing => "Delete Drawing",
            MenuItem::DeleteNote => "Delete Note",
            MenuItem::Cancel => "Cancel",
        }
    }

    /// Whether an entry danger-styles (destructive).
    #[must_use]
    pub fn is_danger(item: MenuItem) -> bool {
        item == MenuItem::DeleteNote
    }
}

/// A text note being edited. The draft renders live but is only stored on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub id: NoteId,
    pub draft: TextContent,
}

/// Persistent UI state visible to the renderer and the host.
#[derive(Debug, Clone)]
pub struct UiState {
    pub menu: Option<ContextMenu>,
    pub editing: Option<EditSession>,
    /// Screen position of the last primary press or menu opening.
    pub last_click: Point,
    /// Style applied to newly created text notes; follows the editor's last choice.
    pub text_style: TextContent,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            menu: None,
            editing: None,
            last_click: Point::default(),
            text_style: TextContent { text: NEW_NOTE_TEXT.to_owned(), ..TextContent::default() },
        }
    }
}

impl UiState {
    /// Style for a new text note: the current style with the default caption.
    #[must_use]
    pub fn new_note_content(&self) -> TextContent {
        TextContent { text: NEW_NOTE_TEXT.to_owned(), ..self.text_style.clone() }
    }
}
