//! Rendering: draws the board scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the note list, viewport, and edit session and produces pixels; it
//! never mutates application state and advances no animation, so calling
//! [`draw`] twice in a row yields the same frame.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.
//!
//! LAYERS
//! ======
//! 1. Background fill and a fixed screen-space grid.
//! 2. Notes in list order under the viewport transform (later notes on top).
//! 3. Minimap gizmo with the viewport indicator, in screen space.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::Viewport;
use crate::consts::{
    GRID_SIZE_PX, LINE_HEIGHT, MINIMAP_HEIGHT, MINIMAP_MARGIN, MINIMAP_WIDTH, NOTE_PADDING, PIN_INSET, PIN_RADIUS,
};
use crate::doc::{DrawingContent, Note, NoteContent, NoteId, NoteList, TextContent};
use crate::drawing::Segment;
use crate::input::EditSession;

const BACKGROUND: &str = "#f6f6f6";
const GRID_LINE: &str = "#e0e0e0";
const PAPER: &str = "#fff8e1";
const PIN: &str = "#ff6b6b";
const PLACEHOLDER_FILL: &str = "#cccccc";
const PLACEHOLDER_TEXT: &str = "#555555";
const PAD_BACKGROUND: &str = "#FFFFFF";

/// A context with a save/restore stack.
pub(crate) trait StateStack {
    fn push_state(&self);
    fn pop_state(&self);
}

impl StateStack for CanvasRenderingContext2d {
    fn push_state(&self) {
        self.save();
    }

    fn pop_state(&self) {
        self.restore();
    }
}

/// Run `body` between a save and its restore. The restore happens even when `body` fails.
pub(crate) fn with_saved_state<S: StateStack, T, E>(stack: &S, body: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    stack.push_state();
    let out = body();
    stack.pop_state();
    out
}

/// Draw the full scene.
///
/// `viewport.width` / `viewport.height` are in CSS pixels; `dpr` is the device
/// pixel ratio of the backing store.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    notes: &NoteList,
    viewport: &Viewport,
    editing: Option<&EditSession>,
    images: &ImageCache,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    draw_background(ctx, viewport.width, viewport.height);

    with_saved_state(ctx, || draw_notes(ctx, notes, viewport, editing, images))?;

    draw_minimap(ctx, viewport);
    Ok(())
}

/// Notes in canvas space; runs inside a saved state.
fn draw_notes(
    ctx: &CanvasRenderingContext2d,
    notes: &NoteList,
    viewport: &Viewport,
    editing: Option<&EditSession>,
    images: &ImageCache,
) -> Result<(), JsValue> {
    ctx.translate(viewport.offset_x, viewport.offset_y)?;
    ctx.scale(viewport.scale, viewport.scale)?;
    for note in notes {
        let draft = editing.filter(|s| s.id == note.id).map(|s| &s.draft);
        draw_note(ctx, note, draft, images)?;
    }
    Ok(())
}

fn draw_background(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_stroke_style_str(GRID_LINE);
    ctx.set_line_width(1.0);
    let mut x = 0.0;
    while x < width {
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, height);
        ctx.stroke();
        x += GRID_SIZE_PX;
    }
    let mut y = 0.0;
    while y < height {
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(width, y);
        ctx.stroke();
        y += GRID_SIZE_PX;
    }
}

// =============================================================
// Notes
// =============================================================

/// Small per-note rotation in degrees, stable for a given id.
#[must_use]
pub fn tilt_degrees(id: &NoteId) -> f64 {
    let first = id.to_string().bytes().next().unwrap_or(b'0');
    f64::from(first % 10) * 0.5 - 2.5
}

fn draw_note(
    ctx: &CanvasRenderingContext2d,
    note: &Note,
    draft: Option<&TextContent>,
    images: &ImageCache,
) -> Result<(), JsValue> {
    with_saved_state(ctx, || draw_tilted_note(ctx, note, draft, images))
}

/// Body of [`draw_note`]; runs inside a saved state.
fn draw_tilted_note(
    ctx: &CanvasRenderingContext2d,
    note: &Note,
    draft: Option<&TextContent>,
    images: &ImageCache,
) -> Result<(), JsValue> {
    let origin = note.canvas_origin();
    let (w, h) = note.kind().size();
    let (cx, cy) = (origin.x + w / 2.0, origin.y + h / 2.0);

    ctx.translate(cx, cy)?;
    ctx.rotate(tilt_degrees(&note.id).to_radians())?;
    ctx.translate(-cx, -cy)?;

    ctx.set_fill_style_str(PAPER);
    ctx.set_shadow_color("rgba(0,0,0,0.1)");
    ctx.set_shadow_blur(5.0);
    ctx.set_shadow_offset_x(2.0);
    ctx.set_shadow_offset_y(2.0);
    ctx.fill_rect(origin.x, origin.y, w, h);

    ctx.begin_path();
    ctx.arc(cx, origin.y + PIN_INSET, PIN_RADIUS, 0.0, TAU)?;
    ctx.set_fill_style_str(PIN);
    ctx.fill();

    ctx.set_shadow_color("transparent");
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);

    match &note.content {
        NoteContent::Text(stored) => draw_text_body(ctx, draft.unwrap_or(stored), origin.x, origin.y, w, h),
        NoteContent::Drawing(drawing) => draw_drawing_body(ctx, note.id, drawing, images, origin.x, origin.y, w, h),
    }
}

fn draw_text_body(
    ctx: &CanvasRenderingContext2d,
    content: &TextContent,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> Result<(), JsValue> {
    ctx.set_fill_style_str(&content.color);
    ctx.set_font(&format!("{} 16px {}", content.weight, content.font));
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");

    let max_width = w - NOTE_PADDING * 2.0;
    let measure = |s: &str| ctx.measure_text(s).map_or(0.0, |m| m.width());
    let lines = wrap_lines(&content.text, max_width, line_capacity(h), measure);

    let mut line_y = y + NOTE_PADDING + PIN_INSET;
    for line in &lines {
        ctx.fill_text(line, x + NOTE_PADDING, line_y)?;
        line_y += LINE_HEIGHT;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_drawing_body(
    ctx: &CanvasRenderingContext2d,
    id: NoteId,
    drawing: &DrawingContent,
    images: &ImageCache,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) -> Result<(), JsValue> {
    let body = (x + NOTE_PADDING, y + NOTE_PADDING + PIN_INSET, w - NOTE_PADDING * 2.0, h - NOTE_PADDING * 2.0 - PIN_INSET);

    if drawing.image.is_none() {
        return draw_placeholder(ctx, "Empty Drawing", body, x + w / 2.0, y + h / 2.0);
    }
    match images.ready(&id) {
        Some(img) => ctx.draw_image_with_html_image_element_and_dw_and_dh(img, body.0, body.1, body.2, body.3),
        None => draw_placeholder(ctx, "Loading...", body, x + w / 2.0, y + h / 2.0),
    }
}

fn draw_placeholder(
    ctx: &CanvasRenderingContext2d,
    label: &str,
    (bx, by, bw, bh): (f64, f64, f64, f64),
    cx: f64,
    cy: f64,
) -> Result<(), JsValue> {
    ctx.set_fill_style_str(PLACEHOLDER_FILL);
    ctx.fill_rect(bx, by, bw, bh);
    ctx.set_fill_style_str(PLACEHOLDER_TEXT);
    ctx.set_font("12px Quicksand");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(label, cx, cy)
}

/// How many text lines fit in a note body of height `h`.
#[must_use]
pub fn line_capacity(h: f64) -> usize {
    let mut y = NOTE_PADDING + PIN_INSET;
    let mut lines = 0;
    while y <= h - NOTE_PADDING {
        lines += 1;
        y += LINE_HEIGHT;
    }
    lines
}

/// Greedy word wrap. Words are separated by single spaces; a line breaks before
/// the word that would push it past `max_width`. When more than `max_lines`
/// lines result, the last visible line becomes `...`.
pub fn wrap_lines(text: &str, max_width: f64, max_lines: usize, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for (n, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if n > 0 && measure(&candidate) > max_width {
            lines.push(line.trim_end().to_owned());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim_end().to_owned());

    if lines.len() > max_lines {
        lines.truncate(max_lines.saturating_sub(1));
        lines.push("...".to_owned());
    }
    lines
}

// =============================================================
// Minimap
// =============================================================

fn draw_minimap(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    let left = viewport.width - MINIMAP_WIDTH - MINIMAP_MARGIN;
    let top = viewport.height - MINIMAP_HEIGHT - MINIMAP_MARGIN;

    ctx.set_fill_style_str("rgba(255,255,255,0.8)");
    ctx.fill_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);
    ctx.set_stroke_style_str(PLACEHOLDER_FILL);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);

    let ind = viewport.indicator(MINIMAP_WIDTH, MINIMAP_HEIGHT);
    ctx.set_fill_style_str("rgba(255,107,107,0.2)");
    ctx.fill_rect(left + ind.left, top + ind.top, ind.width, ind.height);
    ctx.set_stroke_style_str(PIN);
    ctx.stroke_rect(left + ind.left, top + ind.top, ind.width, ind.height);
}

// =============================================================
// Drawing pad surface
// =============================================================

/// Wipe the pad surface to white.
pub fn clear_pad(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
    ctx.set_fill_style_str(PAD_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width, height);
}

/// Paint one stroke segment with round caps.
pub fn draw_segment(ctx: &CanvasRenderingContext2d, segment: &Segment) {
    ctx.begin_path();
    ctx.set_stroke_style_str(&segment.color);
    ctx.set_line_width(segment.width);
    ctx.set_line_cap("round");
    ctx.move_to(segment.from.x, segment.from.y);
    ctx.line_to(segment.to.x, segment.to.y);
    ctx.stroke();
}

/// Paint an existing drawing across the whole pad surface.
///
/// # Errors
///
/// Returns `Err` if the image cannot be drawn.
pub fn draw_pad_image(
    ctx: &CanvasRenderingContext2d,
    img: &HtmlImageElement,
    width: f64,
    height: f64,
) -> Result<(), JsValue> {
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, width, height)
}

// =============================================================
// Image cache
// =============================================================

struct CachedImage {
    src: String,
    element: HtmlImageElement,
}

/// Decoded drawing images keyed by note id.
///
/// Elements are created when a drawing's data URL first appears or changes and
/// dropped when the note goes away. Decoding happens in the browser; [`ImageCache::is_loading`]
/// tells the frame loop to keep redrawing until it finishes.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<NoteId, CachedImage>,
}

impl ImageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache in line with the drawings currently on the board.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an image element cannot be created.
    pub fn sync(&mut self, notes: &NoteList) -> Result<(), JsValue> {
        self.entries.retain(|id, cached| image_src(notes, id) == Some(cached.src.as_str()));

        for note in notes {
            let NoteContent::Drawing(DrawingContent { image: Some(src) }) = &note.content else {
                continue;
            };
            if self.entries.contains_key(&note.id) {
                continue;
            }
            let element = HtmlImageElement::new()?;
            element.set_src(src);
            self.entries.insert(note.id, CachedImage { src: src.clone(), element });
        }
        Ok(())
    }

    /// The image for a note, once it has finished decoding.
    #[must_use]
    pub fn ready(&self, id: &NoteId) -> Option<&HtmlImageElement> {
        self.entries
            .get(id)
            .map(|c| &c.element)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.entries.values().any(|c| !c.element.complete())
    }
}

fn image_src<'a>(notes: &'a NoteList, id: &NoteId) -> Option<&'a str> {
    match &notes.get(id)?.content {
        NoteContent::Drawing(DrawingContent { image: Some(src) }) => Some(src.as_str()),
        _ => None,
    }
}
