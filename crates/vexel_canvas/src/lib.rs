//! Vexel canvas state machine
//!
//! A [`Canvas`] wraps a renderer backend behind a drawing-property stack:
//!
//! - Property setters touch only the top property frame and mark one dirty
//!   flag each; nothing reaches the backend until a drawing operation needs
//!   it.
//! - [`Canvas::apply_changes`] reconciles dirty properties into the backend
//!   in a fixed order immediately before fill/stroke/image/text operations.
//! - `save`/`restore` and `begin_layer`/`end_layer` push and pop frames;
//!   popping invalidates every flag because the backend's state after its
//!   own restore is unknown.
//!
//! The rasterizing backend, image resources and font shaping are external
//! collaborators consumed through the [`RenderBackend`], `ImageSource` and
//! [`FontService`] traits.

pub mod backend;
pub mod canvas;
pub mod state;
pub mod text;

pub use backend::{BackendPaint, GlowParams, GroupEffects, OverlayParams, RenderBackend, ShadowParams};
pub use canvas::{Canvas, CanvasError};
pub use state::{DirtyFlags, ImageFilter, PropertyFrame};
pub use text::{
    Font, FontService, FontWeight, TextAlign, TextDrawMode, TextError, TextMetrics, TextVAlign,
};
