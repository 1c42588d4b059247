#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Viewport};
use crate::doc::{Note, NoteList};

/// Find the topmost note under a screen-space point.
///
/// Notes are checked from last to first, so a later note wins when boxes overlap.
#[must_use]
pub fn find_note_at<'a>(screen_pt: Point, notes: &'a NoteList, viewport: &Viewport) -> Option<&'a Note> {
    let canvas_pt = viewport.screen_to_canvas(screen_pt);
    notes.iter().rev().find(|note| note.contains(canvas_pt))
}
