//! Viewport controller: pan offset, zoom scale, momentum, and boundary clamping.
//!
//! Screen space is CSS pixels relative to the board container. Canvas space is
//! the fixed `CANVAS_WIDTH` × `CANVAS_HEIGHT` board. Normalized space is canvas
//! space divided by those dimensions, which is how notes store their position.
//!
//! Every mutation of offset or scale ends with [`Viewport::apply_boundary_constraints`],
//! so the board can never be panned or zoomed fully out of view.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{
    CANVAS_HEIGHT, CANVAS_WIDTH, MAX_SCALE, MIN_SCALE, MOMENTUM_FACTOR, MOMENTUM_SAMPLE, MOMENTUM_THRESHOLD,
    OVERSCROLL_PX, ZOOM_STEP,
};

/// A point in screen, canvas, or normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which way a zoom step goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a wheel delta to a direction. Scrolling up zooms in; a zero delta is no zoom.
    #[must_use]
    pub fn from_wheel(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::In)
        } else if delta_y > 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Pan gesture state. Momentum only exists while `Decaying`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Motion {
    #[default]
    Idle,
    /// Pointer is held down on empty canvas.
    Dragging {
        /// Screen position of the previous pointer event.
        last: Point,
        /// Sampled velocity from the most recent move.
        velocity: Point,
    },
    /// Pointer released with enough velocity to coast.
    Decaying { velocity: Point },
}

/// Screen-space rectangle of the viewport indicator inside the minimap gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pan/zoom state for the board.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Width of the visible container in CSS pixels.
    pub width: f64,
    /// Height of the visible container in CSS pixels.
    pub height: f64,
    pub motion: Motion,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0, width: 0.0, height: 0.0, motion: Motion::Idle }
    }
}

impl Viewport {
    /// A viewport of the given size with the board centered at scale 1.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        let mut vp = Self {
            offset_x: (width - CANVAS_WIDTH) / 2.0,
            offset_y: (height - CANVAS_HEIGHT) / 2.0,
            width,
            height,
            ..Self::default()
        };
        vp.apply_boundary_constraints();
        vp
    }

    // --- Coordinate conversion ---

    /// Convert a screen-space point to canvas space.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.offset_x) / self.scale, y: (screen.y - self.offset_y) / self.scale }
    }

    /// Convert a canvas-space point to screen space.
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point { x: canvas.x * self.scale + self.offset_x, y: canvas.y * self.scale + self.offset_y }
    }

    /// Convert a screen-space point to normalized board coordinates, clamped to `[0, 1]`.
    #[must_use]
    pub fn screen_to_normalized(&self, screen: Point) -> Point {
        let canvas = self.screen_to_canvas(screen);
        Point { x: (canvas.x / CANVAS_WIDTH).clamp(0.0, 1.0), y: (canvas.y / CANVAS_HEIGHT).clamp(0.0, 1.0) }
    }

    /// Convert normalized board coordinates to canvas space.
    #[must_use]
    pub fn normalized_to_canvas(normalized: Point) -> Point {
        Point { x: normalized.x * CANVAS_WIDTH, y: normalized.y * CANVAS_HEIGHT }
    }

    // --- Zoom ---

    /// Zoom one step around `pointer`, keeping the canvas point under it fixed on screen.
    pub fn zoom(&mut self, pointer: Point, direction: ZoomDirection) {
        let anchor = self.screen_to_canvas(pointer);

        let next = match direction {
            ZoomDirection::In => self.scale * ZOOM_STEP,
            ZoomDirection::Out => self.scale / ZOOM_STEP,
        };
        self.scale = next.clamp(MIN_SCALE, MAX_SCALE);

        self.offset_x = pointer.x - anchor.x * self.scale;
        self.offset_y = pointer.y - anchor.y * self.scale;
        self.apply_boundary_constraints();
    }

    // --- Drag and momentum ---

    /// Start a pan gesture. Cancels any coasting in progress.
    pub fn begin_drag(&mut self, screen: Point) {
        self.motion = Motion::Dragging { last: screen, velocity: Point::default() };
    }

    /// Pan by the pointer delta since the previous event. Returns `false` when not dragging.
    pub fn drag_to(&mut self, screen: Point) -> bool {
        let Motion::Dragging { last, .. } = self.motion else {
            return false;
        };
        let dx = screen.x - last.x;
        let dy = screen.y - last.y;

        self.offset_x += dx;
        self.offset_y += dy;
        self.motion = Motion::Dragging {
            last: screen,
            velocity: Point::new(dx * MOMENTUM_SAMPLE, dy * MOMENTUM_SAMPLE),
        };
        self.apply_boundary_constraints();
        true
    }

    /// Finish a pan gesture. Returns `true` if the board starts coasting and
    /// the host should schedule frames for [`Viewport::step_momentum`].
    pub fn end_drag(&mut self) -> bool {
        let Motion::Dragging { velocity, .. } = self.motion else {
            return false;
        };
        if exceeds_threshold(velocity) {
            self.motion = Motion::Decaying { velocity };
            true
        } else {
            self.motion = Motion::Idle;
            false
        }
    }

    /// Advance coasting by one frame. Returns `true` while another frame is needed.
    pub fn step_momentum(&mut self) -> bool {
        let Motion::Decaying { velocity } = self.motion else {
            return false;
        };

        self.offset_x += velocity.x;
        self.offset_y += velocity.y;
        let decayed = Point::new(velocity.x * MOMENTUM_FACTOR, velocity.y * MOMENTUM_FACTOR);
        self.apply_boundary_constraints();

        if exceeds_threshold(decayed) {
            self.motion = Motion::Decaying { velocity: decayed };
            true
        } else {
            self.motion = Motion::Idle;
            false
        }
    }

    /// Current velocity: the sampled drag velocity or the coasting velocity.
    #[must_use]
    pub fn momentum(&self) -> Point {
        match self.motion {
            Motion::Idle => Point::default(),
            Motion::Dragging { velocity, .. } | Motion::Decaying { velocity } => velocity,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.motion, Motion::Dragging { .. })
    }

    #[must_use]
    pub fn is_coasting(&self) -> bool {
        matches!(self.motion, Motion::Decaying { .. })
    }

    // --- Bounds ---

    /// Update the container size (window resize) and re-clamp.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.apply_boundary_constraints();
    }

    /// Keep the board within reach: clamp to a 100px overscroll margin on axes
    /// where it is larger than the viewport, center it on axes where it is smaller.
    pub fn apply_boundary_constraints(&mut self) {
        self.offset_x = constrain_axis(self.offset_x, self.width, CANVAS_WIDTH * self.scale);
        self.offset_y = constrain_axis(self.offset_y, self.height, CANVAS_HEIGHT * self.scale);
    }

    /// Position of the visible region inside a minimap gizmo of the given size.
    #[must_use]
    pub fn indicator(&self, gizmo_w: f64, gizmo_h: f64) -> IndicatorRect {
        let view_w = self.width / self.scale;
        let view_h = self.height / self.scale;
        let view_x = -self.offset_x / self.scale;
        let view_y = -self.offset_y / self.scale;

        IndicatorRect {
            left: (view_x / CANVAS_WIDTH * gizmo_w).max(0.0),
            top: (view_y / CANVAS_HEIGHT * gizmo_h).max(0.0),
            width: (view_w / CANVAS_WIDTH * gizmo_w).min(gizmo_w),
            height: (view_h / CANVAS_HEIGHT * gizmo_h).min(gizmo_h),
        }
    }
}

fn exceeds_threshold(velocity: Point) -> bool {
    velocity.x.abs() > MOMENTUM_THRESHOLD || velocity.y.abs() > MOMENTUM_THRESHOLD
}

fn constrain_axis(offset: f64, container: f64, content: f64) -> f64 {
    if content > container {
        let min = container - content - OVERSCROLL_PX;
        offset.clamp(min, OVERSCROLL_PX)
    } else {
        (container - content) / 2.0
    }
}
