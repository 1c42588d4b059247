use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{IndicatorRect, Point, Viewport, ZoomDirection};
use crate::consts::{MINIMAP_HEIGHT, MINIMAP_WIDTH, NOTE_WIDTH};
use crate::doc::{
    ChangeEvent, DrawingContent, Note, NoteContent, NoteDraft, NoteId, NoteKind, NoteList, NotePatch, TextContent,
};
use crate::drawing::{DrawingPad, PadTarget, Segment, ToolButton};
use crate::hit;
use crate::input::{Button, ContextMenu, EditSession, FONTS, Key, MenuItem, MenuTarget, UiState, WEIGHTS, WheelDelta};
use crate::render::{self, ImageCache};
use crate::sync::{NoteBackend, NoteStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Gap between a note's right edge and the text editor, in screen pixels.
const EDITOR_GAP_PX: f64 = 12.0;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the board.
    RenderNeeded,
    /// Momentum started; call `tick` every animation frame until it returns `false`.
    ScheduleFrame,
    SetCursor(String),
    OpenContextMenu(ContextMenu),
    CloseContextMenu,
    /// Show the text editor for a note, seeded with `draft`, at a screen position.
    OpenTextEditor { id: NoteId, draft: TextContent, at: Point },
    CloseTextEditor,
    /// The open edit should be committed; the host awaits `commit_edit`.
    CommitEdit,
    OpenDrawingPad { target: PadTarget },
    ClearDrawingPad,
    CloseDrawingPad,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore<B> {
    pub store: NoteStore<B>,
    pub viewport: Viewport,
    pub ui: UiState,
    pub pad: DrawingPad,
    pub dpr: f64,
}

impl<B: NoteBackend> EngineCore<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            store: NoteStore::new(backend),
            viewport: Viewport::default(),
            ui: UiState::default(),
            pad: DrawingPad::default(),
            dpr: 1.0,
        }
    }

    // --- Data inputs ---

    /// Load every note from the backend. Returns how many are on the board.
    pub async fn load(&mut self) -> usize {
        self.store.load_all().await.len()
    }

    /// Apply a realtime change. Ends any edit of a note that was deleted remotely.
    pub fn apply_change(&mut self, event: ChangeEvent) -> Vec<Action> {
        let deleted = match &event {
            ChangeEvent::Delete(id) => Some(*id),
            _ => None,
        };
        if !self.store.apply_change(event) {
            return Vec::new();
        }
        let mut actions = deleted.map(|id| self.forget(id)).unwrap_or_default();
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio. The first call
    /// centers the board.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.dpr = dpr;
        if self.viewport.width <= 0.0 && self.viewport.height <= 0.0 {
            self.viewport = Viewport::centered(width_css, height_css);
        } else {
            self.viewport.set_viewport_size(width_css, height_css);
        }
        vec![Action::RenderNeeded]
    }

    /// Advance momentum by one frame. Returns `true` while more frames are needed.
    pub fn tick(&mut self) -> bool {
        self.viewport.step_momentum()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.pad.is_open() {
            return actions;
        }
        if self.ui.menu.take().is_some() {
            actions.push(Action::CloseContextMenu);
        }

        match button {
            Button::Primary => {
                if self.ui.editing.is_some() {
                    actions.push(Action::CommitEdit);
                    return actions;
                }
                self.ui.last_click = screen_pt;
                match self.note_at(screen_pt) {
                    Some((id, NoteKind::Text)) => actions.extend(self.open_editor(id)),
                    Some((id, NoteKind::Drawing)) => actions.extend(self.open_pad(PadTarget::Existing(id))),
                    None => {
                        self.viewport.begin_drag(screen_pt);
                        actions.push(Action::SetCursor("grabbing".into()));
                    }
                }
            }
            Button::Secondary => {
                self.ui.last_click = screen_pt;
                let target = match self.note_at(screen_pt) {
                    Some((id, kind)) => MenuTarget::Note { id, kind },
                    None => MenuTarget::Canvas,
                };
                let menu = ContextMenu { at: screen_pt, target };
                self.ui.menu = Some(menu);
                actions.push(Action::OpenContextMenu(menu));
            }
            Button::Middle => {}
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.viewport.drag_to(screen_pt) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Pointer released or left the board.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !self.viewport.is_dragging() {
            return Vec::new();
        }
        let mut actions = vec![Action::SetCursor("grab".into())];
        if self.viewport.end_drag() {
            actions.push(Action::ScheduleFrame);
        }
        actions
    }

    /// Zoom around the pointer. Ignored while the pad is open.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if self.pad.is_open() {
            return Vec::new();
        }
        let Some(direction) = ZoomDirection::from_wheel(delta.dy) else {
            return Vec::new();
        };
        self.viewport.zoom(screen_pt, direction);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        let mut actions = Vec::new();
        if !key.is_escape() {
            return actions;
        }
        if self.ui.menu.take().is_some() {
            actions.push(Action::CloseContextMenu);
        }
        if self.ui.editing.is_some() {
            actions.push(Action::CommitEdit);
        }
        actions
    }

    // --- Context menu ---

    /// Run a context-menu entry. Entries not offered by the open menu are ignored.
    pub async fn choose_menu_item(&mut self, item: MenuItem) -> Vec<Action> {
        let Some(menu) = self.ui.menu.take() else {
            return Vec::new();
        };
        let mut actions = vec![Action::CloseContextMenu];
        if !menu.items().contains(&item) {
            return actions;
        }

        match (item, menu.target) {
            (MenuItem::AddTextNote, MenuTarget::Canvas) => actions.extend(self.create_text_note(menu.at).await),
            (MenuItem::AddDrawingNote, MenuTarget::Canvas) => {
                actions.extend(self.open_pad(PadTarget::New { at: menu.at }));
            }
            (MenuItem::EditNote, MenuTarget::Note { id, kind: NoteKind::Text }) => actions.extend(self.open_editor(id)),
            (MenuItem::EditNote, MenuTarget::Note { id, kind: NoteKind::Drawing }) => {
                actions.extend(self.open_pad(PadTarget::Existing(id)));
            }
            (MenuItem::DeleteNote, MenuTarget::Note { id, .. }) => actions.extend(self.delete_note(id).await),
            _ => {}
        }
        actions
    }

    // --- Notes ---

    /// Create a text note at a screen position and open it for editing.
    /// Any edit in progress is committed first.
    pub async fn create_text_note(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions = self.commit_edit().await;
        let at = self.viewport.screen_to_normalized(screen_pt);
        let draft = NoteDraft { x_coord: at.x, y_coord: at.y, content: NoteContent::Text(self.ui.new_note_content()) };

        if let Ok(note) = self.store.create(draft).await {
            actions.push(Action::RenderNeeded);
            actions.extend(self.open_editor(note.id));
        }
        actions
    }

    /// Delete a note. On failure the board is unchanged and no actions are returned.
    pub async fn delete_note(&mut self, id: NoteId) -> Vec<Action> {
        if !self.store.delete(id).await {
            return Vec::new();
        }
        let mut actions = self.forget(id);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Text editor ---

    /// Start editing a text note. Drawings and unknown ids are ignored.
    pub fn open_editor(&mut self, id: NoteId) -> Vec<Action> {
        let Some(note) = self.store.get(&id) else {
            return Vec::new();
        };
        let NoteContent::Text(content) = &note.content else {
            return Vec::new();
        };
        let draft = content.clone();
        let at = self.editor_anchor(note);
        self.ui.editing = Some(EditSession { id, draft: draft.clone() });
        vec![Action::OpenTextEditor { id, draft, at }, Action::RenderNeeded]
    }

    pub fn set_draft_text(&mut self, text: String) -> Vec<Action> {
        self.edit_draft(|draft, _| draft.text = text)
    }

    /// Change the draft font. Fonts the editor doesn't offer are ignored.
    pub fn set_draft_font(&mut self, font: &str) -> Vec<Action> {
        if !FONTS.contains(&font) {
            return Vec::new();
        }
        self.edit_draft(|draft, style| {
            font.clone_into(&mut draft.font);
            font.clone_into(&mut style.font);
        })
    }

    /// Change the draft weight (`"300"`, `"500"`, or `"700"`).
    pub fn set_draft_weight(&mut self, weight: &str) -> Vec<Action> {
        if !WEIGHTS.iter().any(|(value, _)| *value == weight) {
            return Vec::new();
        }
        self.edit_draft(|draft, style| {
            weight.clone_into(&mut draft.weight);
            weight.clone_into(&mut style.weight);
        })
    }

    pub fn set_draft_color(&mut self, color: &str) -> Vec<Action> {
        self.edit_draft(|draft, style| {
            color.clone_into(&mut draft.color);
            color.clone_into(&mut style.color);
        })
    }

    /// Persist the draft and close the editor. A failed save leaves the stored note as it was.
    pub async fn commit_edit(&mut self) -> Vec<Action> {
        let Some(session) = self.ui.editing.take() else {
            return Vec::new();
        };
        let patch = NotePatch::content(NoteContent::Text(session.draft));
        if self.store.update(session.id, patch).await.is_err() {
            log::warn!("edit to note {} was not saved", session.id);
        }
        vec![Action::CloseTextEditor, Action::RenderNeeded]
    }

    /// Discard the draft and close the editor.
    pub fn cancel_edit(&mut self) -> Vec<Action> {
        if self.ui.editing.take().is_none() {
            return Vec::new();
        }
        vec![Action::CloseTextEditor, Action::RenderNeeded]
    }

    // --- Drawing pad ---

    pub fn open_pad(&mut self, target: PadTarget) -> Vec<Action> {
        if let PadTarget::Existing(id) = target {
            if self.store.get(&id).is_none_or(|n| n.kind() != NoteKind::Drawing) {
                return Vec::new();
            }
        }
        self.pad.open(target);
        vec![Action::OpenDrawingPad { target }]
    }

    pub fn on_pad_pointer_down(&mut self, pad_pt: Point) {
        self.pad.pointer_down(pad_pt);
    }

    /// Extend the stroke in progress; returns the segment to paint.
    pub fn on_pad_pointer_move(&mut self, pad_pt: Point) -> Option<Segment> {
        self.pad.pointer_move(pad_pt)
    }

    pub fn on_pad_pointer_up(&mut self) {
        self.pad.pointer_up();
    }

    pub fn press_pad_tool(&mut self, button: ToolButton) -> Vec<Action> {
        if self.pad.press(button) { vec![Action::ClearDrawingPad] } else { Vec::new() }
    }

    /// Save the pad image: create a drawing note at the menu position, or
    /// replace the target note's image. The pad closes either way.
    pub async fn save_drawing(&mut self, image: String) -> Vec<Action> {
        let Some(target) = self.pad.close() else {
            return Vec::new();
        };
        let mut actions = vec![Action::CloseDrawingPad];
        let content = NoteContent::Drawing(DrawingContent::with_image(image));

        let saved = match target {
            PadTarget::New { at } => {
                let at = self.viewport.screen_to_normalized(at);
                self.store.create(NoteDraft { x_coord: at.x, y_coord: at.y, content }).await.is_ok()
            }
            PadTarget::Existing(id) => self.store.update(id, NotePatch::content(content)).await.is_ok(),
        };
        if saved {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Close the pad without saving.
    pub fn close_pad(&mut self) -> Vec<Action> {
        if self.pad.close().is_none() {
            return Vec::new();
        }
        vec![Action::CloseDrawingPad]
    }

    // --- Queries ---

    #[must_use]
    pub fn notes(&self) -> &NoteList {
        self.store.notes()
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    /// Where the minimap indicator sits inside the gizmo.
    #[must_use]
    pub fn indicator(&self) -> IndicatorRect {
        self.viewport.indicator(MINIMAP_WIDTH, MINIMAP_HEIGHT)
    }

    // --- Internals ---

    fn note_at(&self, screen_pt: Point) -> Option<(NoteId, NoteKind)> {
        hit::find_note_at(screen_pt, self.store.notes(), &self.viewport).map(|n| (n.id, n.kind()))
    }

    fn editor_anchor(&self, note: &Note) -> Point {
        let origin = self.viewport.canvas_to_screen(note.canvas_origin());
        Point::new(origin.x + NOTE_WIDTH * self.viewport.scale + EDITOR_GAP_PX, origin.y)
    }

    fn edit_draft(&mut self, f: impl FnOnce(&mut TextContent, &mut TextContent)) -> Vec<Action> {
        let Some(session) = self.ui.editing.as_mut() else {
            return Vec::new();
        };
        f(&mut session.draft, &mut self.ui.text_style);
        vec![Action::RenderNeeded]
    }

    /// Drop UI state that refers to a note that no longer exists.
    fn forget(&mut self, id: NoteId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.editing.as_ref().is_some_and(|s| s.id == id) {
            self.ui.editing = None;
            actions.push(Action::CloseTextEditor);
        }
        if self.pad.target() == Some(PadTarget::Existing(id)) {
            self.pad.close();
            actions.push(Action::CloseDrawingPad);
        }
        actions
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas elements.
pub struct Engine<B> {
    ctx: CanvasRenderingContext2d,
    pad: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    images: ImageCache,
    pub core: EngineCore<B>,
}

impl<B: NoteBackend> Engine<B> {
    /// Create an engine bound to the board canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement, backend: B) -> Result<Self, JsValue> {
        Ok(Self { ctx: context_2d(canvas)?, pad: None, images: ImageCache::new(), core: EngineCore::new(backend) })
    }

    /// Bind the drawing pad surface.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn attach_pad(&mut self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let ctx = context_2d(&canvas)?;
        self.pad = Some((canvas, ctx));
        Ok(())
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.images.sync(self.core.notes())?;
        render::draw(
            &self.ctx,
            self.core.notes(),
            &self.core.viewport,
            self.core.ui.editing.as_ref(),
            &self.images,
            self.core.dpr,
        )
    }

    /// Per-frame callback: advance momentum and redraw. Returns `true` while
    /// the host should keep requesting frames (coasting or images decoding).
    ///
    /// # Errors
    ///
    /// Returns `Err` if rendering fails.
    pub fn tick(&mut self) -> Result<bool, JsValue> {
        let coasting = self.core.viewport.is_coasting();
        let more = self.core.tick();
        if coasting || self.images.is_loading() {
            self.render()?;
        }
        Ok(more || self.images.is_loading())
    }

    /// Handle the canvas-side effects of actions (redraws, pad surface), then
    /// hand them back for the host's DOM work.
    ///
    /// # Errors
    ///
    /// Returns `Err` if drawing fails.
    pub fn process(&mut self, actions: Vec<Action>) -> Result<Vec<Action>, JsValue> {
        for action in &actions {
            match action {
                Action::RenderNeeded => self.render()?,
                Action::ClearDrawingPad => self.clear_pad(),
                Action::OpenDrawingPad { target } => self.prepare_pad(*target)?,
                _ => {}
            }
        }
        Ok(actions)
    }

    // --- Pad strokes ---

    pub fn on_pad_pointer_down(&mut self, pad_pt: Point) {
        self.core.on_pad_pointer_down(pad_pt);
    }

    pub fn on_pad_pointer_move(&mut self, pad_pt: Point) {
        let Some(segment) = self.core.on_pad_pointer_move(pad_pt) else {
            return;
        };
        if let Some((_, ctx)) = &self.pad {
            render::draw_segment(ctx, &segment);
        }
    }

    pub fn on_pad_pointer_up(&mut self) {
        self.core.on_pad_pointer_up();
    }

    /// Save the pad surface as a PNG data URL.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no pad is attached or the surface cannot be exported.
    pub async fn save_drawing(&mut self) -> Result<Vec<Action>, JsValue> {
        let Some((canvas, _)) = &self.pad else {
            return Err(JsValue::from_str("drawing pad not attached"));
        };
        let image = canvas.to_data_url()?;
        let actions = self.core.save_drawing(image).await;
        self.process(actions)
    }

    fn clear_pad(&self) {
        if let Some((canvas, ctx)) = &self.pad {
            render::clear_pad(ctx, f64::from(canvas.width()), f64::from(canvas.height()));
        }
    }

    fn prepare_pad(&self, target: PadTarget) -> Result<(), JsValue> {
        self.clear_pad();
        let (Some((canvas, ctx)), PadTarget::Existing(id)) = (&self.pad, target) else {
            return Ok(());
        };
        match self.images.ready(&id) {
            Some(img) => render::draw_pad_image(ctx, img, f64::from(canvas.width()), f64::from(canvas.height())),
            None => Ok(()),
        }
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}
