//! Freehand drawing pad state: tool, color, brush size, and stroke tracking.
//!
//! The pad produces [`Segment`]s from pointer input; the host paints them onto
//! its own surface and hands back an image (data URL) on save. Whether a save
//! creates a note or updates one is decided by the [`PadTarget`] the pad was
//! opened with.

#[cfg(test)]
#[path = "drawing_test.rs"]
mod drawing_test;

use crate::camera::Point;
use crate::consts::{ERASER_COLOR, PALETTE};
use crate::doc::NoteId;

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawTool {
    #[default]
    Pen,
    Eraser,
}

/// A toolbar button. `Clear` is a command rather than a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolButton {
    Pen,
    Eraser,
    Clear,
}

/// Brush width choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Line width in pad pixels.
    #[must_use]
    pub fn px(self) -> f64 {
        match self {
            Self::Small => 2.0,
            Self::Medium => 5.0,
            Self::Large => 10.0,
        }
    }
}

/// One straight piece of a stroke, ready to be painted with round caps.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub color: String,
    pub width: f64,
}

/// What a save applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadTarget {
    /// Create a new drawing note at this screen position.
    New { at: Point },
    /// Replace the image of an existing drawing note.
    Existing(NoteId),
}

#[derive(Debug, Clone)]
pub struct DrawingPad {
    pub tool: DrawTool,
    pub color: String,
    pub size: BrushSize,
    target: Option<PadTarget>,
    /// Previous pointer position of the stroke in progress.
    last: Option<Point>,
}

impl Default for DrawingPad {
    fn default() -> Self {
        Self { tool: DrawTool::Pen, color: PALETTE[0].to_owned(), size: BrushSize::Small, target: None, last: None }
    }
}

impl DrawingPad {
    /// Open the pad for a target. Any stroke in progress is dropped.
    pub fn open(&mut self, target: PadTarget) {
        self.target = Some(target);
        self.last = None;
    }

    /// Close the pad, returning what it was open for.
    pub fn close(&mut self) -> Option<PadTarget> {
        self.last = None;
        self.target.take()
    }

    #[must_use]
    pub fn target(&self) -> Option<PadTarget> {
        self.target
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// Handle a toolbar button. Returns `true` when the surface must be wiped.
    pub fn press(&mut self, button: ToolButton) -> bool {
        match button {
            ToolButton::Pen => {
                self.tool = DrawTool::Pen;
                false
            }
            ToolButton::Eraser => {
                self.tool = DrawTool::Eraser;
                false
            }
            ToolButton::Clear => {
                self.tool = DrawTool::Pen;
                self.last = None;
                true
            }
        }
    }

    /// Pick a pen color. Colors outside the palette are ignored.
    pub fn select_color(&mut self, color: &str) -> bool {
        match PALETTE.iter().find(|c| c.eq_ignore_ascii_case(color)) {
            Some(c) => {
                (*c).clone_into(&mut self.color);
                true
            }
            None => false,
        }
    }

    pub fn select_size(&mut self, size: BrushSize) {
        self.size = size;
    }

    // --- Strokes ---

    /// Begin a stroke. Ignored while the pad is closed.
    pub fn pointer_down(&mut self, at: Point) {
        if self.is_open() {
            self.last = Some(at);
        }
    }

    /// Extend the stroke in progress, yielding the segment to paint.
    pub fn pointer_move(&mut self, at: Point) -> Option<Segment> {
        let from = self.last?;
        self.last = Some(at);
        Some(self.segment(from, at))
    }

    /// End the stroke (pointer up or left the pad).
    pub fn pointer_up(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    fn segment(&self, from: Point, to: Point) -> Segment {
        match self.tool {
            DrawTool::Pen => Segment { from, to, color: self.color.clone(), width: self.size.px() },
            DrawTool::Eraser => Segment { from, to, color: ERASER_COLOR.to_owned(), width: self.size.px() * 2.0 },
        }
    }
}
