//! Canvas state-machine behavior against counting mock collaborators:
//! dirty-flag batching, stack discipline, layer pairing, and paint
//! materialization.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use vexel_canvas::{
    BackendPaint, Canvas, CanvasError, Font, FontService, GroupEffects, RenderBackend, TextAlign,
    TextDrawMode, TextError, TextMetrics, TextVAlign,
};
use vexel_core::{
    AffineTransform, BlendMode, Color, FillRule, ImageError, ImageSource, LineCap, LineJoin,
    LockedFrame, Point, Rect,
};
use vexel_paint::{Effect, EffectKind, Gradient, GradientFunction, GradientStop, Pattern};
use vexel_path::Path;

/// Compact record of a pushed paint
#[derive(Clone, Debug, PartialEq)]
enum PaintRecord {
    Solid(Color),
    Pattern { density: f32 },
    Gradient { stops: usize },
}

impl From<&BackendPaint> for PaintRecord {
    fn from(paint: &BackendPaint) -> Self {
        match paint {
            BackendPaint::Solid(c) => PaintRecord::Solid(*c),
            BackendPaint::Pattern { frame, .. } => PaintRecord::Pattern {
                density: frame.scale,
            },
            BackendPaint::Gradient { colors, .. } => PaintRecord::Gradient {
                stops: colors.len(),
            },
        }
    }
}

/// Backend double that records every call in order
#[derive(Default)]
struct MockBackend {
    events: Vec<String>,
    fill_paints: Vec<PaintRecord>,
    stroke_widths: Vec<f32>,
    dash_patterns: Vec<(Vec<f32>, f32)>,
    group_effects: Vec<Option<GroupEffects>>,
    clip_rects: Vec<Rect>,
    fills: usize,
    saves: usize,
    restores: usize,
    device: AffineTransform,
}

impl MockBackend {
    fn log(&mut self, event: &str) {
        self.events.push(event.to_string());
    }

    fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl RenderBackend for MockBackend {
    fn set_fill_paint(&mut self, paint: &BackendPaint) {
        self.fill_paints.push(paint.into());
        self.log("set_fill_paint");
    }

    fn set_stroke_paint(&mut self, _paint: &BackendPaint) {
        self.log("set_stroke_paint");
    }

    fn set_fill_rule(&mut self, _rule: FillRule) {
        self.log("set_fill_rule");
    }

    fn set_should_antialias(&mut self, _antialias: bool) {
        self.log("set_should_antialias");
    }

    fn set_opacity(&mut self, _opacity: f32) {
        self.log("set_opacity");
    }

    fn set_blend_mode(&mut self, _mode: BlendMode) {
        self.log("set_blend_mode");
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.stroke_widths.push(width);
        self.log("set_stroke_width");
    }

    fn set_join_style(&mut self, _join: LineJoin) {
        self.log("set_join_style");
    }

    fn set_cap_style(&mut self, _cap: LineCap) {
        self.log("set_cap_style");
    }

    fn set_miter_limit(&mut self, _limit: f32) {
        self.log("set_miter_limit");
    }

    fn set_dashes(&mut self, lengths: &[f32], phase: f32) {
        self.dash_patterns.push((lengths.to_vec(), phase));
        self.log("set_dashes");
    }

    fn save(&mut self) {
        self.saves += 1;
        self.log("save");
    }

    fn restore(&mut self) {
        self.restores += 1;
        self.log("restore");
    }

    fn begin_group(&mut self, _isolated: bool) {
        self.group_effects.push(None);
        self.log("begin_group");
    }

    fn begin_group_with_effects(&mut self, _clip: Rect, effects: &GroupEffects) {
        self.group_effects.push(Some(*effects));
        self.log("begin_group");
    }

    fn end_group(&mut self) {
        self.log("end_group");
    }

    fn add_path(&mut self, _path: &Path) {
        self.log("add_path");
    }

    fn move_to(&mut self, _p: Point) {
        self.log("move_to");
    }

    fn line_to(&mut self, _p: Point) {
        self.log("line_to");
    }

    fn quadratic_to(&mut self, _control: Point, _end: Point) {
        self.log("quadratic_to");
    }

    fn cubic_to(&mut self, _control1: Point, _control2: Point, _end: Point) {
        self.log("cubic_to");
    }

    fn close_subpath(&mut self) {
        self.log("close_subpath");
    }

    fn fill(&mut self) {
        self.fills += 1;
        self.log("fill");
    }

    fn stroke(&mut self) {
        self.log("stroke");
    }

    fn clip_to_rect(&mut self, rect: Rect) {
        self.clip_rects.push(rect);
        self.log("clip_to_rect");
    }

    fn clip_to_path(&mut self, _path: &Path, _rule: FillRule) {
        self.log("clip_to_path");
    }

    fn concat_transform(&mut self, transform: &AffineTransform) {
        self.device = self.device.concat(transform);
        self.log("concat_transform");
    }

    fn device_transform(&self) -> AffineTransform {
        self.device
    }

    fn clip_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }
}

/// Font double with fixed metrics: 10 units per byte, ascent 8, descent 2
struct MockFonts {
    draws: Rc<RefCell<Vec<(String, Point, TextDrawMode)>>>,
}

impl MockFonts {
    fn new() -> (Self, Rc<RefCell<Vec<(String, Point, TextDrawMode)>>>) {
        let draws = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                draws: Rc::clone(&draws),
            },
            draws,
        )
    }
}

impl FontService for MockFonts {
    fn measure(
        &self,
        text: &str,
        _font: &Font,
        _device_transform: &AffineTransform,
    ) -> Result<TextMetrics, TextError> {
        let width = text.len() as f32 * 10.0;
        Ok(TextMetrics {
            typographic_bounds: Rect::new(0.0, -8.0, width, 10.0),
            ink_bounds: Rect::new(0.0, -8.0, width, 10.0),
            ascent: 8.0,
            descent: 2.0,
        })
    }

    fn draw(
        &mut self,
        _backend: &mut dyn RenderBackend,
        text: &str,
        origin: Point,
        _font: &Font,
        mode: TextDrawMode,
    ) -> Result<(), TextError> {
        self.draws.borrow_mut().push((text.to_string(), origin, mode));
        Ok(())
    }
}

/// Image double that produces whatever density is asked of it
struct MockImage {
    width: f32,
    height: f32,
}

impl ImageSource for MockImage {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn lock_frame(&self, scale: f32) -> Result<LockedFrame, ImageError> {
        let pw = (self.width * scale) as u32;
        let ph = (self.height * scale) as u32;
        Ok(LockedFrame {
            pixels: Arc::from(vec![0u8; (pw * ph * 4) as usize]),
            pixel_width: pw,
            pixel_height: ph,
            scale,
        })
    }
}

fn new_canvas() -> Canvas<MockBackend> {
    let (fonts, _) = MockFonts::new();
    Canvas::new(MockBackend::default(), Box::new(fonts))
}

fn two_stop_gradient() -> Gradient {
    Gradient::new(
        GradientFunction::Linear,
        vec![
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(1.0, Color::BLACK),
        ],
    )
    .unwrap()
}

#[test]
fn test_first_draw_pushes_complete_state() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();
    let b = canvas.backend();
    assert_eq!(b.count("set_fill_paint"), 1);
    assert_eq!(b.count("set_stroke_width"), 1);
    assert_eq!(b.count("set_dashes"), 1);
    assert_eq!(b.fills, 1);
}

#[test]
fn test_setters_batch_into_one_push() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();

    canvas.set_stroke_width(3.0);
    canvas.set_stroke_width(5.0);
    canvas.set_stroke_width(7.0);
    canvas.fill().unwrap();

    // initial sync plus exactly one batched push with the final value
    assert_eq!(canvas.backend().stroke_widths, vec![1.0, 7.0]);
}

#[test]
fn test_clean_draw_pushes_nothing() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();
    let before = canvas.backend().events.len();
    canvas.fill().unwrap();
    // only the fill itself
    assert_eq!(canvas.backend().events.len(), before + 1);
}

#[test]
fn test_save_restore_round_trips_frame() {
    let mut canvas = new_canvas();
    canvas.set_stroke_width(5.0);
    canvas.set_opacity(0.5);
    let snapshot = canvas.properties().clone();

    canvas.save();
    canvas.set_stroke_width(9.0);
    canvas.set_paint(Color::RED);
    canvas.restore().unwrap();

    assert_eq!(canvas.properties(), &snapshot);
    assert_eq!(canvas.stack_depth(), 1);
    assert_eq!(canvas.backend().saves, 1);
    assert_eq!(canvas.backend().restores, 1);
}

#[test]
fn test_restore_forces_full_resync() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();
    canvas.save();
    canvas.restore().unwrap();
    let widths_before = canvas.backend().stroke_widths.len();
    canvas.fill().unwrap();
    // everything re-pushed even though no setter ran
    assert_eq!(canvas.backend().stroke_widths.len(), widths_before + 1);
    assert_eq!(canvas.backend().count("set_opacity"), 2);
}

#[test]
fn test_restore_underflow_fails_without_side_effects() {
    let mut canvas = new_canvas();
    let snapshot = canvas.properties().clone();
    assert_eq!(canvas.restore(), Err(CanvasError::StackUnderflow));
    assert_eq!(canvas.properties(), &snapshot);
    assert_eq!(canvas.stack_depth(), 1);
    assert_eq!(canvas.backend().restores, 0);
}

#[test]
fn test_layer_pairing_is_enforced() {
    let mut canvas = new_canvas();
    canvas.save();
    assert_eq!(canvas.end_layer(), Err(CanvasError::LayerMismatch));
    canvas.begin_layer().unwrap();
    assert_eq!(canvas.restore(), Err(CanvasError::LayerMismatch));
    canvas.end_layer().unwrap();
    canvas.restore().unwrap();
    assert_eq!(canvas.stack_depth(), 1);
}

#[test]
fn test_begin_layer_flushes_pending_state_first() {
    let mut canvas = new_canvas();
    canvas.set_stroke_width(4.0);
    canvas.begin_layer().unwrap();

    let events = &canvas.backend().events;
    let width_at = events.iter().position(|e| e == "set_stroke_width").unwrap();
    let group_at = events.iter().position(|e| e == "begin_group").unwrap();
    assert!(width_at < group_at, "stroke width must land before the group opens");
}

#[test]
fn test_end_layer_closes_group_and_resyncs() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();
    canvas.begin_layer().unwrap();
    canvas.end_layer().unwrap();
    assert_eq!(canvas.backend().count("end_group"), 1);
    let paints_before = canvas.backend().count("set_fill_paint");
    canvas.fill().unwrap();
    assert_eq!(canvas.backend().count("set_fill_paint"), paints_before + 1);
}

#[test]
fn test_layer_effect_maps_shadow_parameters() {
    let mut canvas = new_canvas();
    let mut effect = Effect::new(EffectKind::OuterShadow);
    effect.set_size(32.0).unwrap();
    effect.set_distance(10.0).unwrap();
    effect.set_angle(90.0).unwrap();
    canvas.begin_layer_with_effect(&effect).unwrap();

    let effects = canvas.backend().group_effects[0].unwrap();
    let shadow = effects.shadow.unwrap();
    assert!((shadow.blur - 0.5).abs() < 1e-6);
    assert!(shadow.offset.x.abs() < 1e-4);
    assert!((shadow.offset.y - 10.0).abs() < 1e-4);
    assert!(shadow.knockout);
}

#[test]
fn test_gradient_paint_flattens_ramp() {
    let mut canvas = new_canvas();
    canvas.set_paint(two_stop_gradient());
    canvas.fill().unwrap();
    assert_eq!(
        canvas.backend().fill_paints.last(),
        Some(&PaintRecord::Gradient { stops: 2 })
    );
}

#[test]
fn test_pattern_resamples_when_device_transform_changes() {
    let image: Arc<dyn ImageSource> = Arc::new(MockImage {
        width: 100.0,
        height: 50.0,
    });
    let mut canvas = new_canvas();
    canvas.set_paint(Pattern::new(image));
    canvas.fill().unwrap();
    assert_eq!(
        canvas.backend().fill_paints.last(),
        Some(&PaintRecord::Pattern { density: 1.0 })
    );

    canvas.scale(2.0, 2.0);
    canvas.fill().unwrap();
    // device transform doubled, so the pattern re-materialized denser
    assert_eq!(
        canvas.backend().fill_paints.last(),
        Some(&PaintRecord::Pattern { density: 2.0 })
    );
}

#[test]
fn test_solid_paint_ignores_transform_changes() {
    let mut canvas = new_canvas();
    canvas.fill().unwrap();
    canvas.scale(2.0, 2.0);
    canvas.fill().unwrap();
    assert_eq!(canvas.backend().count("set_fill_paint"), 1);
}

#[test]
fn test_invalid_dash_pattern_rejected_atomically() {
    let mut canvas = new_canvas();
    canvas.set_dash(&[4.0, 2.0], 1.0).unwrap();
    assert_eq!(
        canvas.set_dash(&[4.0, -2.0], 0.0),
        Err(CanvasError::InvalidDashPattern)
    );
    assert_eq!(canvas.properties().dash_lengths.as_slice(), &[4.0, 2.0]);
    assert_eq!(canvas.properties().dash_phase, 1.0);
    assert_eq!(
        canvas.set_dash(&[0.0, 0.0], 0.0),
        Err(CanvasError::InvalidDashPattern)
    );
}

#[test]
fn test_stipple_synthesizes_dash_pattern() {
    let mut canvas = new_canvas();
    canvas.set_stroke_width(3.0);
    canvas.set_stippled(true);
    canvas.stroke().unwrap();
    let (lengths, _) = canvas.backend().dash_patterns.last().unwrap().clone();
    assert_eq!(lengths, vec![3.0, 3.0]);
}

#[test]
fn test_draw_image_goes_through_pattern_paint() {
    let image: Arc<dyn ImageSource> = Arc::new(MockImage {
        width: 100.0,
        height: 50.0,
    });
    let mut canvas = new_canvas();
    canvas
        .draw_image(
            &image,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(10.0, 10.0, 50.0, 25.0),
        )
        .unwrap();
    let b = canvas.backend();
    assert_eq!(b.clip_rects.last(), Some(&Rect::new(10.0, 10.0, 50.0, 25.0)));
    assert_eq!(b.fills, 1);
    // the image detour leaves backend state balanced
    assert_eq!(b.saves, b.restores);
    assert!(matches!(
        b.fill_paints.last(),
        Some(PaintRecord::Pattern { .. })
    ));
}

#[test]
fn test_draw_image_rejects_empty_source() {
    let image: Arc<dyn ImageSource> = Arc::new(MockImage {
        width: 100.0,
        height: 50.0,
    });
    let mut canvas = new_canvas();
    assert_eq!(
        canvas.draw_image(&image, Rect::ZERO, Rect::new(0.0, 0.0, 10.0, 10.0)),
        Err(CanvasError::InvalidSourceRect)
    );
}

#[test]
fn test_text_alignment_in_rect() {
    let (fonts, draws) = MockFonts::new();
    let mut canvas = Canvas::new(MockBackend::default(), Box::new(fonts));
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);

    // "abcd" measures 40 wide, ascent 8, descent 2
    canvas
        .fill_text_in_rect("abcd", rect, TextAlign::Center, TextVAlign::Middle)
        .unwrap();
    canvas
        .stroke_text_in_rect("abcd", rect, TextAlign::End, TextVAlign::Bottom)
        .unwrap();

    let draws = draws.borrow();
    assert_eq!(draws[0].1, Point::new(30.0, 28.0));
    assert_eq!(draws[0].2, TextDrawMode::Fill);
    assert_eq!(draws[1].1, Point::new(60.0, 48.0));
    assert_eq!(draws[1].2, TextDrawMode::Stroke);
}

#[test]
fn test_fill_text_applies_changes_first() {
    let (fonts, draws) = MockFonts::new();
    let mut canvas = Canvas::new(MockBackend::default(), Box::new(fonts));
    canvas.set_paint(Color::BLUE);
    canvas.fill_text("hi", Point::new(5.0, 5.0)).unwrap();
    assert_eq!(
        canvas.backend().fill_paints.last(),
        Some(&PaintRecord::Solid(Color::BLUE))
    );
    assert_eq!(draws.borrow().len(), 1);
}
