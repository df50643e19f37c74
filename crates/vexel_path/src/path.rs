//! Path representation and building

use smallvec::SmallVec;
use std::f32::consts::PI;
use vexel_core::{AffineTransform, Point, Rect};

/// Path command over absolute coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    Close,
}

/// An immutable 2D path composed of commands
///
/// Paths are values: two paths are equal when their command streams are.
/// Mutation happens on a [`PathBuilder`], which freezes into a new `Path`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Reopen the path for further building
    pub fn into_builder(self) -> PathBuilder {
        let mut builder = PathBuilder::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => builder.push_move(p),
                PathCommand::LineTo(p) => builder.push_line(p),
                PathCommand::QuadTo { control, end } => builder.push_quad(control, end),
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => builder.push_cubic(control1, control2, end),
                PathCommand::Close => builder.push_close(),
            }
        }
        builder
    }

    /// Map every coordinate through `transform`, producing a new path
    pub fn transform(&self, transform: &AffineTransform) -> Path {
        let commands = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(transform.apply(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(transform.apply(p)),
                PathCommand::QuadTo { control, end } => PathCommand::QuadTo {
                    control: transform.apply(control),
                    end: transform.apply(end),
                },
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => PathCommand::CubicTo {
                    control1: transform.apply(control1),
                    control2: transform.apply(control2),
                    end: transform.apply(end),
                },
                PathCommand::Close => PathCommand::Close,
            })
            .collect();
        Path { commands }
    }

    /// Axis-aligned bounding rectangle over anchor and control points
    ///
    /// Control points of curves are included, so the box is conservative for
    /// curved segments. Empty paths report a zero rect.
    pub fn bounds(&self) -> Rect {
        if self.commands.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        let mut include = |p: Point| {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        };

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => include(p),
                PathCommand::QuadTo { control, end } => {
                    include(control);
                    include(end);
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    include(control1);
                    include(control2);
                    include(end);
                }
                PathCommand::Close => {}
            }
        }

        if min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite() {
            Rect::from_edges(min_x, min_y, max_x, max_y)
        } else {
            Rect::ZERO
        }
    }
}

impl FromIterator<PathCommand> for Path {
    fn from_iter<I: IntoIterator<Item = PathCommand>>(iter: I) -> Self {
        Path {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Builder for constructing paths
///
/// Tracks the current point and the start of the open subpath so curve and
/// close commands can resolve against them. `build()` freezes the recorded
/// commands into an immutable [`Path`].
pub struct PathBuilder {
    commands: SmallVec<[PathCommand; 16]>,
    current: Point,
    subpath_start: Point,
    has_subpath: bool,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            commands: SmallVec::new(),
            current: Point::ZERO,
            subpath_start: Point::ZERO,
            has_subpath: false,
        }
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.push_move(Point::new(x, y));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.push_line(Point::new(x, y));
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.push_quad(Point::new(cx, cy), Point::new(x, y));
        self
    }

    pub fn cubic_to(mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> Self {
        self.push_cubic(Point::new(c1x, c1y), Point::new(c2x, c2y), Point::new(x, y));
        self
    }

    pub fn close(mut self) -> Self {
        self.push_close();
        self
    }

    /// Append an elliptical arc around `center`, sweeping `sweep_angle`
    /// radians from `start_angle`
    ///
    /// The arc start becomes a `move_to` when the path has no open subpath,
    /// otherwise a `line_to`. The sweep is lowered to cubic runs of at most a
    /// quarter turn.
    pub fn arc(
        mut self,
        center: Point,
        radii: Point,
        start_angle: f32,
        sweep_angle: f32,
    ) -> Self {
        let start = Point::new(
            center.x + radii.x * start_angle.cos(),
            center.y + radii.y * start_angle.sin(),
        );
        if self.has_subpath {
            self.push_line(start);
        } else {
            self.push_move(start);
        }
        self.push_arc_segments(center, radii, start_angle, sweep_angle, 0.0);
        self
    }

    /// Append an SVG-style endpoint arc from the current point
    ///
    /// Radii and rotation describe the ellipse; `large_arc` and `sweep` pick
    /// one of the four candidate arcs. Degenerate radii or a zero-length
    /// chord degrade to a straight line, per the SVG arc implementation
    /// notes.
    pub fn arc_to(
        mut self,
        radii: Point,
        x_rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    ) -> Self {
        let from = self.current;
        let to = Point::new(x, y);

        let mut rx = radii.x.abs();
        let mut ry = radii.y.abs();
        if rx == 0.0 || ry == 0.0 || from == to {
            self.push_line(to);
            return self;
        }

        let sin_phi = x_rotation.sin();
        let cos_phi = x_rotation.cos();

        // Center parameterization (SVG 1.1 appendix F.6.5)
        let dx2 = (from.x - to.x) / 2.0;
        let dy2 = (from.y - to.y) / 2.0;
        let x1p = cos_phi * dx2 + sin_phi * dy2;
        let y1p = -sin_phi * dx2 + cos_phi * dy2;

        // Scale radii up when the chord cannot fit (F.6.6)
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let x1p2 = x1p * x1p;
        let y1p2 = y1p * y1p;
        let num = rx2 * ry2 - rx2 * y1p2 - ry2 * x1p2;
        let den = rx2 * y1p2 + ry2 * x1p2;
        let mut coef = 0.0;
        if den != 0.0 {
            let sign = if large_arc == sweep { -1.0 } else { 1.0 };
            coef = sign * (num / den).max(0.0).sqrt();
        }
        let cxp = coef * (rx * y1p / ry);
        let cyp = coef * (-ry * x1p / rx);

        let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
        let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

        fn angle(ux: f32, uy: f32, vx: f32, vy: f32) -> f32 {
            let dot = ux * vx + uy * vy;
            let det = ux * vy - uy * vx;
            det.atan2(dot)
        }

        let ux = (x1p - cxp) / rx;
        let uy = (y1p - cyp) / ry;
        let vx = (-x1p - cxp) / rx;
        let vy = (-y1p - cyp) / ry;

        let theta1 = angle(1.0, 0.0, ux, uy);
        let mut dtheta = angle(ux, uy, vx, vy);
        if !sweep && dtheta > 0.0 {
            dtheta -= 2.0 * PI;
        } else if sweep && dtheta < 0.0 {
            dtheta += 2.0 * PI;
        }

        self.push_arc_segments(
            Point::new(cx, cy),
            Point::new(rx, ry),
            theta1,
            dtheta,
            x_rotation,
        );
        // Snap the endpoint exactly onto the requested point
        if let Some(PathCommand::CubicTo { end, .. }) = self.commands.last_mut() {
            *end = to;
        }
        self.current = to;
        self
    }

    pub fn build(self) -> Path {
        Path {
            commands: self.commands,
        }
    }

    // Internal command plumbing shared with `Path::into_builder`

    pub(crate) fn push_move(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
        self.current = p;
        self.subpath_start = p;
        self.has_subpath = true;
    }

    pub(crate) fn push_line(&mut self, p: Point) {
        self.commands.push(PathCommand::LineTo(p));
        self.current = p;
    }

    pub(crate) fn push_quad(&mut self, control: Point, end: Point) {
        self.commands.push(PathCommand::QuadTo { control, end });
        self.current = end;
    }

    pub(crate) fn push_cubic(&mut self, control1: Point, control2: Point, end: Point) {
        self.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            end,
        });
        self.current = end;
    }

    pub(crate) fn push_close(&mut self) {
        self.commands.push(PathCommand::Close);
        self.current = self.subpath_start;
    }

    /// Lower an ellipse sweep into cubic segments of at most a quarter turn
    ///
    /// Control distance is the classic `4/3 * tan(dt/4)`; `phi` rotates the
    /// ellipse axes. Assumes the current point already sits on the arc start.
    fn push_arc_segments(
        &mut self,
        center: Point,
        radii: Point,
        start_angle: f32,
        sweep_angle: f32,
        phi: f32,
    ) {
        if sweep_angle == 0.0 {
            return;
        }
        let segments = (sweep_angle.abs() / (PI / 2.0)).ceil().max(1.0) as usize;
        let delta = sweep_angle / segments as f32;
        let k = (4.0 / 3.0) * (delta / 4.0).tan();
        let (sin_phi, cos_phi) = (phi.sin(), phi.cos());

        let map = |x: f32, y: f32| {
            let x = radii.x * x;
            let y = radii.y * y;
            Point::new(
                center.x + cos_phi * x - sin_phi * y,
                center.y + sin_phi * x + cos_phi * y,
            )
        };

        let mut t1 = start_angle;
        for _ in 0..segments {
            let t2 = t1 + delta;
            let (s1, c1) = t1.sin_cos();
            let (s2, c2) = t2.sin_cos();
            let control1 = map(c1 - k * s1, s1 + k * c1);
            let control2 = map(c2 + k * s2, s2 - k * c2);
            let end = map(c2, s2);
            self.push_cubic(control1, control2, end);
            t1 = t2;
        }
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_commands() {
        let path = PathBuilder::new()
            .move_to(10.0, 10.0)
            .line_to(20.0, 20.0)
            .quad_to(25.0, 10.0, 30.0, 20.0)
            .close()
            .build();
        assert_eq!(path.commands().len(), 4);
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::new(10.0, 10.0)));
        assert_eq!(path.commands()[3], PathCommand::Close);
    }

    #[test]
    fn test_close_returns_to_subpath_start() {
        let builder = PathBuilder::new()
            .move_to(5.0, 5.0)
            .line_to(50.0, 5.0)
            .close();
        assert_eq!(builder.current(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_bounds() {
        let path = PathBuilder::new()
            .move_to(10.0, 10.0)
            .line_to(20.0, 20.0)
            .line_to(30.0, 10.0)
            .close()
            .build();
        assert_eq!(path.bounds(), Rect::from_edges(10.0, 10.0, 30.0, 20.0));
    }

    #[test]
    fn test_transform_maps_all_points() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .cubic_to(1.0, 0.0, 2.0, 1.0, 3.0, 1.0)
            .build();
        let moved = path.transform(&AffineTransform::translation(10.0, 5.0));
        assert_eq!(
            moved.commands()[1],
            PathCommand::CubicTo {
                control1: Point::new(11.0, 5.0),
                control2: Point::new(12.0, 6.0),
                end: Point::new(13.0, 6.0),
            }
        );
    }

    #[test]
    fn test_arc_quarter_turn_is_single_cubic() {
        let path = PathBuilder::new()
            .arc(Point::ZERO, Point::new(10.0, 10.0), 0.0, PI / 2.0)
            .build();
        // move to start plus one cubic
        assert_eq!(path.commands().len(), 2);
        let end = match path.commands()[1] {
            PathCommand::CubicTo { end, .. } => end,
            other => panic!("expected cubic, got {other:?}"),
        };
        assert!((end.x - 0.0).abs() < 1e-4);
        assert!((end.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_arc_to_degenerate_radii_is_line() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(Point::new(0.0, 5.0), 0.0, false, true, 10.0, 0.0)
            .build();
        assert_eq!(path.commands()[1], PathCommand::LineTo(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_arc_to_lands_on_endpoint() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .arc_to(Point::new(10.0, 10.0), 0.0, false, true, 20.0, 0.0)
            .build();
        let last = match path.commands().last() {
            Some(PathCommand::CubicTo { end, .. }) => *end,
            other => panic!("expected cubic, got {other:?}"),
        };
        assert_eq!(last, Point::new(20.0, 0.0));
    }
}
