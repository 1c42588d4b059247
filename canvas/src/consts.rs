//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Logical canvas width in canvas pixels. Normalized x coordinates are fractions of this.
pub const CANVAS_WIDTH: f64 = 2000.0;

/// Logical canvas height in canvas pixels. Normalized y coordinates are fractions of this.
pub const CANVAS_HEIGHT: f64 = 1500.0;

/// Spacing of the background grid in screen pixels.
pub const GRID_SIZE_PX: f64 = 50.0;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 2.0;

/// Multiplicative zoom step per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// How far the canvas may be dragged past its edge, in screen pixels.
pub const OVERSCROLL_PX: f64 = 100.0;

/// Fraction of the last pointer delta kept as release velocity.
pub const MOMENTUM_SAMPLE: f64 = 0.3;

/// Per-frame velocity decay factor while coasting.
pub const MOMENTUM_FACTOR: f64 = 0.95;

/// Velocity (px/frame) at or below which coasting stops.
pub const MOMENTUM_THRESHOLD: f64 = 0.1;

// ── Notes ───────────────────────────────────────────────────────

/// Width of every note box in canvas pixels.
pub const NOTE_WIDTH: f64 = 200.0;

/// Height of a text note box in canvas pixels.
pub const TEXT_NOTE_HEIGHT: f64 = 100.0;

/// Height of a drawing note box in canvas pixels.
pub const DRAWING_NOTE_HEIGHT: f64 = 150.0;

/// Inner padding of a note body.
pub const NOTE_PADDING: f64 = 15.0;

/// Extra top inset that leaves room for the pin.
pub const PIN_INSET: f64 = 5.0;

/// Line height of wrapped note text.
pub const LINE_HEIGHT: f64 = 20.0;

// ── Drawing pad ─────────────────────────────────────────────────

/// Pen colors offered by the drawing pad.
pub const PALETTE: [&str; 5] = ["#000000", "#FF0000", "#00FF00", "#0000FF", "#FFFF00"];

/// Stroke color the eraser paints with.
pub const ERASER_COLOR: &str = "#FFFFFF";

// ── Rendering ───────────────────────────────────────────────────

/// Minimap gizmo width in screen pixels.
pub const MINIMAP_WIDTH: f64 = 160.0;

/// Minimap gizmo height in screen pixels (same aspect as the canvas).
pub const MINIMAP_HEIGHT: f64 = 120.0;

/// Distance of the minimap from the bottom-right corner.
pub const MINIMAP_MARGIN: f64 = 16.0;

/// Pin radius in canvas pixels.
pub const PIN_RADIUS: f64 = 6.0;
