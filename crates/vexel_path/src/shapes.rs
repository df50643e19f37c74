//! High-level shape constructors
//!
//! Each constructor records commands into a [`PathBuilder`] and freezes the
//! result. The arc, sector and segment constructors share one arc core;
//! sector closes through the center, segment closes across the chord.

use crate::path::{Path, PathBuilder};
use serde::{Deserialize, Serialize};
use vexel_core::{Point, Rect, ValueError};

/// Magic number for cubic Bezier circle approximation
const KAPPA: f32 = 0.552_284_75;

/// Per-corner radii for rounded rectangles
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const ZERO: CornerRadius = CornerRadius {
        top_left: 0.0,
        top_right: 0.0,
        bottom_right: 0.0,
        bottom_left: 0.0,
    };

    pub const fn uniform(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Create from a host-supplied radii list: one uniform value or four
    /// per-corner values
    pub fn from_slice(values: &[f32]) -> Result<Self, ValueError> {
        match values {
            [r] => Ok(Self::uniform(*r)),
            [tl, tr, br, bl] => Ok(Self::new(*tl, *tr, *br, *bl)),
            _ => Err(ValueError::WrongArity {
                expected: 4,
                got: values.len(),
            }),
        }
    }
}

impl From<f32> for CornerRadius {
    fn from(radius: f32) -> Self {
        Self::uniform(radius)
    }
}

impl Path {
    /// Axis-aligned rectangle outline
    pub fn rect(rect: Rect) -> Path {
        PathBuilder::new()
            .move_to(rect.x, rect.y)
            .line_to(rect.right(), rect.y)
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.x, rect.bottom())
            .close()
            .build()
    }

    /// Rounded rectangle with independent per-corner radii
    ///
    /// Radii are clamped to half the smaller rect dimension so opposite
    /// corners never overlap.
    pub fn rounded_rect(rect: Rect, corner_radius: impl Into<CornerRadius>) -> Path {
        let r = corner_radius.into();
        let x = rect.x;
        let y = rect.y;
        let w = rect.width;
        let h = rect.height;

        let max_r = (w.min(h) / 2.0).max(0.0);
        let tl = r.top_left.clamp(0.0, max_r);
        let tr = r.top_right.clamp(0.0, max_r);
        let br = r.bottom_right.clamp(0.0, max_r);
        let bl = r.bottom_left.clamp(0.0, max_r);

        let mut path = PathBuilder::new().move_to(x + tl, y);

        // Top edge
        path = path.line_to(x + w - tr, y);
        if tr > 0.0 {
            path = path.cubic_to(
                x + w - tr * (1.0 - KAPPA),
                y,
                x + w,
                y + tr * (1.0 - KAPPA),
                x + w,
                y + tr,
            );
        }

        // Right edge
        path = path.line_to(x + w, y + h - br);
        if br > 0.0 {
            path = path.cubic_to(
                x + w,
                y + h - br * (1.0 - KAPPA),
                x + w - br * (1.0 - KAPPA),
                y + h,
                x + w - br,
                y + h,
            );
        }

        // Bottom edge
        path = path.line_to(x + bl, y + h);
        if bl > 0.0 {
            path = path.cubic_to(
                x + bl * (1.0 - KAPPA),
                y + h,
                x,
                y + h - bl * (1.0 - KAPPA),
                x,
                y + h - bl,
            );
        }

        // Left edge
        path = path.line_to(x, y + tl);
        if tl > 0.0 {
            path = path.cubic_to(
                x,
                y + tl * (1.0 - KAPPA),
                x + tl * (1.0 - KAPPA),
                y,
                x + tl,
                y,
            );
        }

        path.close().build()
    }

    /// Ellipse inscribed in its bounding box, as four cubic segments
    pub fn ellipse(center: Point, radii: Point) -> Path {
        let (cx, cy) = (center.x, center.y);
        let (rx, ry) = (radii.x, radii.y);
        let (ox, oy) = (rx * KAPPA, ry * KAPPA);

        PathBuilder::new()
            .move_to(cx + rx, cy)
            .cubic_to(cx + rx, cy + oy, cx + ox, cy + ry, cx, cy + ry)
            .cubic_to(cx - ox, cy + ry, cx - rx, cy + oy, cx - rx, cy)
            .cubic_to(cx - rx, cy - oy, cx - ox, cy - ry, cx, cy - ry)
            .cubic_to(cx + ox, cy - ry, cx + rx, cy - oy, cx + rx, cy)
            .close()
            .build()
    }

    pub fn circle(center: Point, radius: f32) -> Path {
        Self::ellipse(center, Point::new(radius, radius))
    }

    /// Single line segment
    pub fn line(from: Point, to: Point) -> Path {
        PathBuilder::new()
            .move_to(from.x, from.y)
            .line_to(to.x, to.y)
            .build()
    }

    /// Connected line segments through `points`, optionally closed
    ///
    /// Fewer than two points is a malformed point list.
    pub fn from_points(points: &[Point], close: bool) -> Result<Path, ValueError> {
        if points.len() < 2 {
            return Err(ValueError::WrongArity {
                expected: 2,
                got: points.len(),
            });
        }
        let mut builder = PathBuilder::new().move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            builder = builder.line_to(p.x, p.y);
        }
        if close {
            builder = builder.close();
        }
        Ok(builder.build())
    }

    pub fn polyline(points: &[Point]) -> Result<Path, ValueError> {
        Self::from_points(points, false)
    }

    pub fn polygon(points: &[Point]) -> Result<Path, ValueError> {
        Self::from_points(points, true)
    }

    /// Open elliptical arc around `center`
    pub fn arc(center: Point, radii: Point, start_angle: f32, sweep_angle: f32) -> Path {
        PathBuilder::new()
            .arc(center, radii, start_angle, sweep_angle)
            .build()
    }

    /// Pie slice: the arc plus both radius edges
    pub fn sector(center: Point, radii: Point, start_angle: f32, sweep_angle: f32) -> Path {
        PathBuilder::new()
            .arc(center, radii, start_angle, sweep_angle)
            .line_to(center.x, center.y)
            .close()
            .build()
    }

    /// Circular segment: the arc closed across its chord
    pub fn segment(center: Point, radii: Point, start_angle: f32, sweep_angle: f32) -> Path {
        PathBuilder::new()
            .arc(center, radii, start_angle, sweep_angle)
            .close()
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCommand;
    use std::f32::consts::PI;

    #[test]
    fn test_rect_is_closed_quad() {
        let p = Path::rect(Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(p.commands().len(), 5);
        assert_eq!(p.bounds(), Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(p.commands()[4], PathCommand::Close);
    }

    #[test]
    fn test_rounded_rect_zero_radii_matches_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        let p = Path::rounded_rect(r, CornerRadius::ZERO);
        // no cubics when all radii are zero
        assert!(p
            .commands()
            .iter()
            .all(|c| !matches!(c, PathCommand::CubicTo { .. })));
        assert_eq!(p.bounds(), r);
    }

    #[test]
    fn test_rounded_rect_clamps_radii() {
        let p = Path::rounded_rect(Rect::new(0.0, 0.0, 10.0, 10.0), CornerRadius::uniform(50.0));
        let b = p.bounds();
        assert!(b.left() >= -1e-4 && b.right() <= 10.0 + 1e-4);
    }

    #[test]
    fn test_circle_bounds() {
        let p = Path::circle(Point::new(5.0, 5.0), 5.0);
        // control hull overshoots the circle slightly but stays in the box
        let b = p.bounds();
        assert!((b.left() - 0.0).abs() < 1e-4);
        assert!((b.right() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_polygon_closes() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.0),
        ];
        let p = Path::polygon(&pts).unwrap();
        assert_eq!(p.commands().last(), Some(&PathCommand::Close));
    }

    #[test]
    fn test_polyline_requires_two_points() {
        assert!(Path::polyline(&[Point::ZERO]).is_err());
    }

    #[test]
    fn test_sector_passes_through_center() {
        let p = Path::sector(Point::new(10.0, 10.0), Point::new(5.0, 5.0), 0.0, PI / 2.0);
        assert!(p
            .commands()
            .iter()
            .any(|c| *c == PathCommand::LineTo(Point::new(10.0, 10.0))));
        assert_eq!(p.commands().last(), Some(&PathCommand::Close));
    }

    #[test]
    fn test_segment_closes_chord() {
        let p = Path::segment(Point::ZERO, Point::new(5.0, 5.0), 0.0, PI);
        assert_eq!(p.commands().last(), Some(&PathCommand::Close));
        assert!(!p
            .commands()
            .iter()
            .any(|c| *c == PathCommand::LineTo(Point::ZERO)));
    }
}
