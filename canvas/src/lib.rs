//! Board engine for the collaborative bulletin board.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! viewport (pan, zoom, momentum, boundary clamping), renders the board and its
//! sticky notes to a 2D canvas, keeps the note list in sync with the database
//! through a [`sync::NoteBackend`], and turns raw DOM input into viewport changes
//! and note commands. The host page wires DOM events to the engine and builds
//! the menus and editors described by the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`camera`] | Viewport: pan/zoom, momentum, clamping, coordinate conversions |
//! | [`doc`] | Note types, wire records, change events, the ordered note list |
//! | [`sync`] | Note store over a backend, plus the realtime feed trait |
//! | [`input`] | Input event types, context menus, and the text-edit session |
//! | [`drawing`] | Drawing pad tools and stroke tracking |
//! | [`hit`] | Hit-testing notes under a screen point |
//! | [`render`] | Scene rendering and the drawing image cache |
//! | `net` | `gloo-net` HTTP/websocket backend (wasm32 only) |
//! | [`consts`] | Shared numeric constants (canvas size, zoom limits, note sizes, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod drawing;
pub mod engine;
pub mod hit;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod net;
pub mod render;
pub mod sync;
