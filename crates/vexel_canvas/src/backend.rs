//! Renderer-backend interface
//!
//! The canvas never rasterizes anything itself; it narrates state changes and
//! primitive drawing into a [`RenderBackend`]. Paints cross this boundary in
//! materialized form ([`BackendPaint`]): patterns carry a pre-sampled pixel
//! frame, gradients a flattened stop ramp.

use crate::state::ImageFilter;
use vexel_core::{
    AffineTransform, BlendMode, Color, FillRule, LineCap, LineJoin, LockedFrame, Point, Rect,
};
use vexel_paint::{GlowSource, GradientFunction};
use vexel_path::Path;

/// A paint in the form the backend consumes
#[derive(Clone, Debug)]
pub enum BackendPaint {
    Solid(Color),
    /// Tiled image, pre-sampled at the density the device transform implies
    Pattern {
        frame: LockedFrame,
        /// Image space to user space; already compensated for the frame's
        /// actual density
        transform: AffineTransform,
        filter: ImageFilter,
    },
    /// Stop ramp flattened to parallel arrays
    Gradient {
        function: GradientFunction,
        colors: Vec<Color>,
        offsets: Vec<f32>,
        from: Point,
        to: Point,
        via: Point,
        mirror: bool,
        wrap: bool,
        repeat_count: f32,
        filter: bool,
    },
}

/// Shadow parameters for a compositing group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowParams {
    pub color: Color,
    pub blend_mode: BlendMode,
    pub offset: Point,
    /// Normalized blur amount, 0.0 to 1.0
    pub blur: f32,
    /// Normalized spread amount, 0.0 to 1.0
    pub spread: f32,
    pub inner: bool,
    pub knockout: bool,
}

/// Glow parameters for a compositing group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowParams {
    pub color: Color,
    pub blend_mode: BlendMode,
    /// Normalized blur amount, 0.0 to 1.0
    pub blur: f32,
    /// Normalized spread amount, 0.0 to 1.0
    pub spread: f32,
    pub inner: bool,
    pub source: GlowSource,
}

/// Color overlay parameters for a compositing group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayParams {
    pub color: Color,
    pub blend_mode: BlendMode,
}

/// Effect set attached to a compositing group
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroupEffects {
    pub shadow: Option<ShadowParams>,
    pub glow: Option<GlowParams>,
    pub overlay: Option<OverlayParams>,
}

/// The rasterizing/compositing surface a canvas draws into
///
/// Implementations own the actual device state: current path, current
/// transform, clip, and one value per settable property. The canvas
/// guarantees it pushes properties before any operation that reads them.
pub trait RenderBackend {
    // Property state
    fn set_fill_paint(&mut self, paint: &BackendPaint);
    fn set_stroke_paint(&mut self, paint: &BackendPaint);
    fn set_fill_rule(&mut self, rule: FillRule);
    fn set_should_antialias(&mut self, antialias: bool);
    fn set_opacity(&mut self, opacity: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_stroke_width(&mut self, width: f32);
    fn set_join_style(&mut self, join: LineJoin);
    fn set_cap_style(&mut self, cap: LineCap);
    fn set_miter_limit(&mut self, limit: f32);
    fn set_dashes(&mut self, lengths: &[f32], phase: f32);

    // Device state stack
    fn save(&mut self);
    fn restore(&mut self);

    // Compositing groups
    fn begin_group(&mut self, isolated: bool);
    fn begin_group_with_effects(&mut self, clip: Rect, effects: &GroupEffects);
    fn end_group(&mut self);

    // Current path construction
    fn add_path(&mut self, path: &Path);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quadratic_to(&mut self, control: Point, end: Point);
    fn cubic_to(&mut self, control1: Point, control2: Point, end: Point);
    fn close_subpath(&mut self);

    // Drawing; both consume the current path
    fn fill(&mut self);
    fn stroke(&mut self);

    // Clipping
    fn clip_to_rect(&mut self, rect: Rect);
    fn clip_to_path(&mut self, path: &Path, rule: FillRule);

    // Transform
    fn concat_transform(&mut self, transform: &AffineTransform);
    fn device_transform(&self) -> AffineTransform;

    fn clip_bounds(&self) -> Rect;
}
