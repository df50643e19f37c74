//! The canvas state machine

use crate::backend::{
    BackendPaint, GlowParams, GroupEffects, OverlayParams, RenderBackend, ShadowParams,
};
use crate::state::{DirtyFlags, ImageFilter, PropertyFrame};
use crate::text::{aligned_origin, Font, FontService, TextAlign, TextDrawMode, TextMetrics, TextVAlign};
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;
use vexel_core::{
    AffineTransform, BlendMode, FillRule, ImageError, ImageSource, LineCap, LineJoin, Point, Rect,
};
use vexel_paint::{Effect, EffectKind, Gradient, Paint, Pattern};
use vexel_path::Path;

/// Divisor mapping effect size/spread in user units onto the backend's
/// normalized [0, 1] blur range
const EFFECT_UNIT: f32 = 64.0;

/// Canvas usage and propagation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    #[error("restore without matching save: property stack would underflow")]
    StackUnderflow,

    #[error("end_layer without matching begin_layer")]
    LayerMismatch,

    #[error("dash lengths must be finite and non-negative")]
    InvalidDashPattern,

    #[error("source rectangle has zero extent")]
    InvalidSourceRect,

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Text(#[from] crate::text::TextError),
}

/// What a pushed frame was pushed by, so pops stay paired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Save,
    Layer,
}

/// A drawing surface bound to a renderer backend
///
/// Single-threaded by design: one canvas per render pass, used from one
/// thread. The property stack always holds at least one frame.
pub struct Canvas<B: RenderBackend> {
    backend: B,
    fonts: Box<dyn FontService>,
    frames: Vec<PropertyFrame>,
    kinds: Vec<FrameKind>,
    dirty: DirtyFlags,
}

impl<B: RenderBackend> Canvas<B> {
    /// Bind a canvas to a backend surface and a font collaborator
    pub fn new(backend: B, fonts: Box<dyn FontService>) -> Self {
        Self {
            backend,
            fonts,
            frames: vec![PropertyFrame::default()],
            kinds: Vec::new(),
            // the backend has seen nothing yet
            dirty: DirtyFlags::all_set(),
        }
    }

    /// The active property frame
    pub fn properties(&self) -> &PropertyFrame {
        self.frames.last().expect("stack depth >= 1")
    }

    fn frame_mut(&mut self) -> &mut PropertyFrame {
        self.frames.last_mut().expect("stack depth >= 1")
    }

    pub fn stack_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Release the canvas, handing the backend back
    pub fn into_backend(self) -> B {
        self.backend
    }

    // ─────────────────────────────────────────────────────────────────────
    // Property setters: one frame field, one dirty flag, no backend traffic
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_paint(&mut self, paint: impl Into<Paint>) {
        self.frame_mut().paint = paint.into();
        self.dirty.paint = true;
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.frame_mut().fill_rule = rule;
        self.dirty.fill_rule = true;
    }

    pub fn set_antialiased(&mut self, antialiased: bool) {
        self.frame_mut().antialiased = antialiased;
        self.dirty.antialias = true;
    }

    /// Opacity is clamped into [0, 1]
    pub fn set_opacity(&mut self, opacity: f32) {
        self.frame_mut().opacity = opacity.clamp(0.0, 1.0);
        self.dirty.opacity = true;
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.frame_mut().blend_mode = mode;
        self.dirty.blend_mode = true;
    }

    /// Stippling renders strokes with a built-in on/off dash
    pub fn set_stippled(&mut self, stippled: bool) {
        self.frame_mut().stippled = stippled;
        self.dirty.dashes = true;
    }

    /// Pattern sampling quality; folded into the materialized paint
    pub fn set_image_filter(&mut self, filter: ImageFilter) {
        self.frame_mut().image_filter = filter;
        self.dirty.paint = true;
    }

    pub fn set_font(&mut self, font: Font) {
        self.frame_mut().font = font;
        self.dirty.font = true;
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.frame_mut().stroke_width = width;
        self.dirty.stroke_width = true;
    }

    pub fn set_join_style(&mut self, join: LineJoin) {
        self.frame_mut().join_style = join;
        self.dirty.join_style = true;
    }

    pub fn set_cap_style(&mut self, cap: LineCap) {
        self.frame_mut().cap_style = cap;
        self.dirty.cap_style = true;
    }

    pub fn set_miter_limit(&mut self, limit: f32) {
        self.frame_mut().miter_limit = limit;
        self.dirty.miter_limit = true;
    }

    /// Set the dash pattern; rejects malformed length lists atomically
    pub fn set_dash(&mut self, lengths: &[f32], phase: f32) -> Result<(), CanvasError> {
        if lengths.iter().any(|l| !l.is_finite() || *l < 0.0)
            || (!lengths.is_empty() && lengths.iter().all(|l| *l == 0.0))
        {
            tracing::warn!(?lengths, "rejecting dash pattern");
            return Err(CanvasError::InvalidDashPattern);
        }
        let frame = self.frame_mut();
        frame.dash_lengths = SmallVec::from_slice(lengths);
        frame.dash_phase = phase;
        self.dirty.dashes = true;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stack and layers
    // ─────────────────────────────────────────────────────────────────────

    /// Push a copy of the active frame
    pub fn save(&mut self) {
        let top = self.properties().clone();
        self.frames.push(top);
        self.kinds.push(FrameKind::Save);
        self.backend.save();
    }

    /// Pop the active frame
    ///
    /// Fails at depth one, and on a frame pushed by `begin_layer` (which
    /// must be closed by [`end_layer`](Self::end_layer)). After a pop every
    /// property is dirty: the backend restored state the canvas no longer
    /// knows.
    pub fn restore(&mut self) -> Result<(), CanvasError> {
        match self.kinds.last() {
            None => {
                tracing::warn!("restore on an empty property stack");
                return Err(CanvasError::StackUnderflow);
            }
            Some(FrameKind::Layer) => return Err(CanvasError::LayerMismatch),
            Some(FrameKind::Save) => {}
        }
        self.frames.pop();
        self.kinds.pop();
        self.backend.restore();
        self.dirty.set_all();
        Ok(())
    }

    /// Open an isolated compositing group
    pub fn begin_layer(&mut self) -> Result<(), CanvasError> {
        self.begin_layer_impl(None)
    }

    /// Open a compositing group with a bitmap effect applied on close
    pub fn begin_layer_with_effect(&mut self, effect: &Effect) -> Result<(), CanvasError> {
        self.begin_layer_impl(Some(effect))
    }

    fn begin_layer_impl(&mut self, effect: Option<&Effect>) -> Result<(), CanvasError> {
        // The group must open against fully synced state
        self.apply_changes()?;
        let top = self.properties().clone();
        self.frames.push(top);
        self.kinds.push(FrameKind::Layer);
        self.backend.save();
        match effect {
            None => self.backend.begin_group(true),
            Some(effect) => {
                let clip = self.backend.clip_bounds();
                let effects = group_effects(effect);
                self.backend.begin_group_with_effects(clip, &effects);
            }
        }
        Ok(())
    }

    /// Close the innermost layer and composite it
    pub fn end_layer(&mut self) -> Result<(), CanvasError> {
        match self.kinds.last() {
            None => {
                tracing::warn!("end_layer on an empty property stack");
                return Err(CanvasError::StackUnderflow);
            }
            Some(FrameKind::Save) => return Err(CanvasError::LayerMismatch),
            Some(FrameKind::Layer) => {}
        }
        self.backend.end_group();
        self.backend.restore();
        self.frames.pop();
        self.kinds.pop();
        self.dirty.set_all();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dirty-flag reconciliation
    // ─────────────────────────────────────────────────────────────────────

    /// Push every dirty property to the backend, in fixed order
    ///
    /// Runs automatically before fill, stroke, image and text operations and
    /// before opening a layer. Each push clears its flag; a failed paint
    /// materialization leaves the paint flag set and the backend untouched
    /// by it.
    pub fn apply_changes(&mut self) -> Result<(), CanvasError> {
        if !self.dirty.any() {
            return Ok(());
        }
        tracing::trace!(dirty = ?self.dirty, "applying property changes");

        if self.dirty.paint {
            let paint = self.materialize_paint()?;
            self.backend.set_fill_paint(&paint);
            self.backend.set_stroke_paint(&paint);
            self.dirty.paint = false;
        }
        if self.dirty.fill_rule {
            self.backend.set_fill_rule(self.properties().fill_rule);
            self.dirty.fill_rule = false;
        }
        if self.dirty.antialias {
            self.backend
                .set_should_antialias(self.properties().antialiased);
            self.dirty.antialias = false;
        }
        if self.dirty.opacity {
            self.backend.set_opacity(self.properties().opacity);
            self.dirty.opacity = false;
        }
        if self.dirty.blend_mode {
            self.backend.set_blend_mode(self.properties().blend_mode);
            self.dirty.blend_mode = false;
        }
        if self.dirty.font {
            // fonts travel with each text draw; nothing to push
            self.dirty.font = false;
        }
        if self.dirty.stroke_width {
            self.backend.set_stroke_width(self.properties().stroke_width);
            self.dirty.stroke_width = false;
        }
        if self.dirty.join_style {
            self.backend.set_join_style(self.properties().join_style);
            self.dirty.join_style = false;
        }
        if self.dirty.cap_style {
            self.backend.set_cap_style(self.properties().cap_style);
            self.dirty.cap_style = false;
        }
        if self.dirty.miter_limit {
            self.backend.set_miter_limit(self.properties().miter_limit);
            self.dirty.miter_limit = false;
        }
        if self.dirty.dashes {
            let lengths = effective_dashes(self.properties());
            let phase = self.properties().dash_phase;
            self.backend.set_dashes(&lengths, phase);
            self.dirty.dashes = false;
        }
        Ok(())
    }

    /// Lower the frame's paint into backend form
    fn materialize_paint(&self) -> Result<BackendPaint, CanvasError> {
        let frame = self.properties();
        match &frame.paint {
            Paint::Solid(color) => Ok(BackendPaint::Solid(*color)),
            Paint::Gradient(gradient) => Ok(materialize_gradient(gradient)),
            Paint::Pattern(pattern) => {
                self.materialize_pattern(pattern, frame.image_filter)
            }
        }
    }

    /// Sample the pattern image at the density the combined pattern and
    /// device transforms imply
    fn materialize_pattern(
        &self,
        pattern: &Pattern,
        filter: ImageFilter,
    ) -> Result<BackendPaint, CanvasError> {
        let device = self.backend.device_transform();
        let combined = device.concat(&pattern.transform);
        let density = transform_density(&combined);
        let frame = pattern.image.lock_frame(density)?;
        // The frame may come back at a different density than asked for;
        // fold the correction into the tiling transform
        let transform = pattern
            .transform
            .scaled(1.0 / frame.scale, 1.0 / frame.scale);
        Ok(BackendPaint::Pattern {
            frame,
            transform,
            filter,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Path construction in the backend
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_path(&mut self, path: &Path) {
        self.backend.add_path(path);
    }

    pub fn move_to(&mut self, p: Point) {
        self.backend.move_to(p);
    }

    pub fn line_to(&mut self, p: Point) {
        self.backend.line_to(p);
    }

    pub fn quad_to(&mut self, control: Point, end: Point) {
        self.backend.quadratic_to(control, end);
    }

    pub fn cubic_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.backend.cubic_to(control1, control2, end);
    }

    pub fn close_path(&mut self) {
        self.backend.close_subpath();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Drawing operations
    // ─────────────────────────────────────────────────────────────────────

    /// Fill the backend's current path
    pub fn fill(&mut self) -> Result<(), CanvasError> {
        self.apply_changes()?;
        self.backend.fill();
        Ok(())
    }

    /// Stroke the backend's current path
    pub fn stroke(&mut self) -> Result<(), CanvasError> {
        self.apply_changes()?;
        self.backend.stroke();
        Ok(())
    }

    pub fn clip_to_rect(&mut self, rect: Rect) {
        self.backend.clip_to_rect(rect);
    }

    /// Clip to a path under the active fill rule
    pub fn clip_to_path(&mut self, path: &Path) {
        let rule = self.properties().fill_rule;
        self.backend.clip_to_path(path, rule);
    }

    /// Draw the `src` portion of an image into `dst`
    ///
    /// Expressed through the paint pipeline: clip to `dst`, map image space
    /// onto it, and fill with the image as a pattern sampled at device
    /// density. Backend state is saved around the detour so the synced
    /// property set survives.
    pub fn draw_image(
        &mut self,
        image: &Arc<dyn ImageSource>,
        src: Rect,
        dst: Rect,
    ) -> Result<(), CanvasError> {
        if src.width == 0.0 || src.height == 0.0 {
            return Err(CanvasError::InvalidSourceRect);
        }
        self.apply_changes()?;

        let density = transform_density(&self.backend.device_transform());
        let frame = image.lock_frame(density)?;
        let filter = self.properties().image_filter;

        self.backend.save();
        self.backend.clip_to_rect(dst);
        // src -> dst mapping in user space
        let mapping = AffineTransform::translation(dst.x, dst.y)
            .scaled(dst.width / src.width, dst.height / src.height)
            .translated(-src.x, -src.y);
        self.backend.concat_transform(&mapping);
        let scale = frame.scale;
        self.backend.set_fill_paint(&BackendPaint::Pattern {
            frame,
            transform: AffineTransform::scaling(1.0 / scale, 1.0 / scale),
            filter,
        });
        self.backend.add_path(&Path::rect(src));
        self.backend.fill();
        self.backend.restore();
        Ok(())
    }

    /// Measure text with the active font under the device transform
    pub fn measure_text(&self, text: &str) -> Result<TextMetrics, CanvasError> {
        let metrics = self.fonts.measure(
            text,
            &self.properties().font,
            &self.backend.device_transform(),
        )?;
        Ok(metrics)
    }

    /// Fill text with its baseline origin at `origin`
    pub fn fill_text(&mut self, text: &str, origin: Point) -> Result<(), CanvasError> {
        self.draw_text(text, origin, TextDrawMode::Fill)
    }

    /// Stroke text with its baseline origin at `origin`
    pub fn stroke_text(&mut self, text: &str, origin: Point) -> Result<(), CanvasError> {
        self.draw_text(text, origin, TextDrawMode::Stroke)
    }

    /// Fill text aligned inside `rect`
    pub fn fill_text_in_rect(
        &mut self,
        text: &str,
        rect: Rect,
        align: TextAlign,
        valign: TextVAlign,
    ) -> Result<(), CanvasError> {
        let origin = self.text_origin(text, &rect, align, valign)?;
        self.draw_text(text, origin, TextDrawMode::Fill)
    }

    /// Stroke text aligned inside `rect`
    pub fn stroke_text_in_rect(
        &mut self,
        text: &str,
        rect: Rect,
        align: TextAlign,
        valign: TextVAlign,
    ) -> Result<(), CanvasError> {
        let origin = self.text_origin(text, &rect, align, valign)?;
        self.draw_text(text, origin, TextDrawMode::Stroke)
    }

    fn text_origin(
        &self,
        text: &str,
        rect: &Rect,
        align: TextAlign,
        valign: TextVAlign,
    ) -> Result<Point, CanvasError> {
        let metrics = self.measure_text(text)?;
        Ok(aligned_origin(&metrics, rect, align, valign))
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        mode: TextDrawMode,
    ) -> Result<(), CanvasError> {
        self.apply_changes()?;
        let font = self.properties().font.clone();
        self.fonts
            .draw(&mut self.backend, text, origin, &font, mode)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transforms
    // ─────────────────────────────────────────────────────────────────────

    /// Concatenate onto the backend's current transform
    ///
    /// Pattern paints sample at device density, so an active pattern goes
    /// dirty here.
    pub fn transform(&mut self, transform: &AffineTransform) {
        self.backend.concat_transform(transform);
        if self.properties().paint.is_device_dependent() {
            self.dirty.paint = true;
        }
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.transform(&AffineTransform::translation(tx, ty));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform(&AffineTransform::scaling(sx, sy));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform(&AffineTransform::rotation(angle));
    }
}

/// Dash list actually pushed: explicit dashes win, stippling synthesizes a
/// one-stroke-width on/off pattern
fn effective_dashes(frame: &PropertyFrame) -> SmallVec<[f32; 4]> {
    if !frame.dash_lengths.is_empty() {
        frame.dash_lengths.clone()
    } else if frame.stippled {
        let unit = frame.stroke_width.max(1.0);
        SmallVec::from_slice(&[unit, unit])
    } else {
        SmallVec::new()
    }
}

/// Largest axis scale factor of a transform, used as sampling density
fn transform_density(t: &AffineTransform) -> f32 {
    let sx = (t.a * t.a + t.b * t.b).sqrt();
    let sy = (t.c * t.c + t.d * t.d).sqrt();
    sx.max(sy).max(f32::MIN_POSITIVE)
}

/// Flatten a gradient's ramp and geometry into backend form
fn materialize_gradient(gradient: &Gradient) -> BackendPaint {
    let colors = gradient.stops().iter().map(|s| s.color).collect();
    let offsets = gradient.stops().iter().map(|s| s.offset).collect();
    BackendPaint::Gradient {
        function: gradient.function(),
        colors,
        offsets,
        from: gradient.from(),
        to: gradient.to(),
        via: gradient.via(),
        mirror: gradient.mirror,
        wrap: gradient.wrap,
        repeat_count: gradient.repeat_count,
        filter: gradient.filter,
    }
}

/// Normalize an effect size into the backend's [0, 1] range
fn normalized(amount: f32) -> f32 {
    (amount / EFFECT_UNIT).clamp(0.0, 1.0)
}

/// Map an effect descriptor onto backend compositing-group parameters
fn group_effects(effect: &Effect) -> GroupEffects {
    let mut effects = GroupEffects::default();
    match effect.kind() {
        EffectKind::ColorOverlay => {
            effects.overlay = Some(OverlayParams {
                color: effect.color,
                blend_mode: effect.blend_mode,
            });
        }
        EffectKind::InnerShadow | EffectKind::OuterShadow => {
            let outer = effect.kind() == EffectKind::OuterShadow;
            let distance = effect.distance().expect("shadow kinds carry distance");
            let angle = effect.angle().expect("shadow kinds carry angle").to_radians();
            effects.shadow = Some(ShadowParams {
                color: effect.color,
                blend_mode: effect.blend_mode,
                offset: Point::new(angle.cos() * distance, angle.sin() * distance),
                blur: normalized(effect.size().expect("shadow kinds carry size")),
                spread: normalized(effect.spread().expect("shadow kinds carry spread")),
                inner: !outer,
                knockout: outer && effect.knockout().expect("outer shadow carries knockout"),
            });
        }
        EffectKind::InnerGlow | EffectKind::OuterGlow => {
            let inner = effect.kind() == EffectKind::InnerGlow;
            effects.glow = Some(GlowParams {
                color: effect.color,
                blend_mode: effect.blend_mode,
                blur: normalized(effect.size().expect("glow kinds carry size")),
                spread: normalized(effect.spread().expect("glow kinds carry spread")),
                inner,
                source: if inner {
                    effect.source().expect("inner glow carries source")
                } else {
                    Default::default()
                },
            });
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexel_core::Color;

    #[test]
    fn test_effective_dashes_prefers_explicit_pattern() {
        let mut frame = PropertyFrame::default();
        frame.stippled = true;
        frame.dash_lengths = SmallVec::from_slice(&[4.0, 2.0]);
        assert_eq!(effective_dashes(&frame).as_slice(), &[4.0, 2.0]);
    }

    #[test]
    fn test_effective_dashes_stipple_uses_stroke_width() {
        let mut frame = PropertyFrame::default();
        frame.stippled = true;
        frame.stroke_width = 3.0;
        assert_eq!(effective_dashes(&frame).as_slice(), &[3.0, 3.0]);
    }

    #[test]
    fn test_transform_density_takes_larger_axis() {
        let t = AffineTransform::scaling(2.0, 0.5);
        assert!((transform_density(&t) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_group_effects_outer_shadow() {
        let mut effect = Effect::new(EffectKind::OuterShadow);
        effect.set_size(128.0).unwrap();
        effect.set_distance(10.0).unwrap();
        effect.set_angle(0.0).unwrap();
        let effects = group_effects(&effect);
        let shadow = effects.shadow.unwrap();
        // 128 / 64 clamps to 1.0
        assert_eq!(shadow.blur, 1.0);
        assert!((shadow.offset.x - 10.0).abs() < 1e-4);
        assert!(shadow.offset.y.abs() < 1e-4);
        assert!(!shadow.inner);
        assert!(shadow.knockout);
        assert!(effects.glow.is_none());
    }

    #[test]
    fn test_group_effects_overlay() {
        let mut effect = Effect::new(EffectKind::ColorOverlay);
        effect.color = Color::RED;
        let effects = group_effects(&effect);
        assert_eq!(effects.overlay.unwrap().color, Color::RED);
        assert!(effects.shadow.is_none());
    }
}
