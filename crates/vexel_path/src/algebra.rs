//! Shape algebra
//!
//! A [`Shape`] is a typed expression tree over primitive shapes and
//! combinators. Introspection tooling hands these around as nested key/value
//! records; the serde derive turns such a record straight into the typed
//! tree, so field lookups and tag dispatch are checked at the boundary
//! instead of scattered through the evaluator.
//!
//! Evaluation recursively lowers children to concrete [`Path`] geometry and
//! then applies the node's own operator. Boolean combination, dashing and
//! stroke-to-fill conversion are the geometry collaborator's business and go
//! through [`GeometryOps`].

use crate::codec::PathParseError;
use crate::path::Path;
use crate::shapes::CornerRadius;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vexel_core::{AffineTransform, FillRule, LineCap, LineJoin, Point, Rect};

/// Shape evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error(transparent)]
    Path(#[from] PathParseError),

    #[error("invalid shape parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("geometry backend failed: {0}")]
    Backend(String),
}

/// Pairwise path combination operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombineOp {
    Union,
    Intersect,
    Difference,
    Xor,
    /// Concatenate command streams, keeping subpaths separate
    Append,
    /// Splice the right path onto the left's open subpath
    Extend,
}

/// Path-combination collaborator
///
/// The canvas engine does not scan-convert geometry; whatever library does
/// is wrapped behind this trait and handed to [`Shape::evaluate`].
pub trait GeometryOps {
    /// Combine two paths with a boolean or concatenation operator
    fn combine(&self, op: CombineOp, left: &Path, right: &Path) -> Result<Path, ShapeError>;

    /// Convert a stroked outline into fill geometry
    fn thicken(
        &self,
        path: &Path,
        width: f32,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f32,
    ) -> Result<Path, ShapeError>;

    /// Replace a path with its dashed rendition
    fn dash(&self, path: &Path, lengths: &[f32], phase: f32) -> Result<Path, ShapeError>;
}

/// A shape expression node
///
/// The serde representation is internally tagged on `"shape"`, so a record
/// like `{"shape": "rect", "x": 0, ...}` deserializes directly; an unknown
/// tag or a missing field fails before evaluation begins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radii: CornerRadius,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Polyline {
        points: Vec<[f32; 2]>,
    },
    Polygon {
        points: Vec<[f32; 2]>,
    },
    /// A path given as an instruction string
    Path {
        data: String,
    },
    Transform {
        #[serde(rename = "child")]
        shape: Box<Shape>,
        matrix: [f32; 6],
    },
    Fill {
        #[serde(rename = "child")]
        shape: Box<Shape>,
        rule: FillRule,
    },
    Dash {
        #[serde(rename = "child")]
        shape: Box<Shape>,
        lengths: Vec<f32>,
        phase: f32,
    },
    Thicken {
        #[serde(rename = "child")]
        shape: Box<Shape>,
        width: f32,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f32,
    },
    Union {
        left: Box<Shape>,
        right: Box<Shape>,
    },
    Intersect {
        left: Box<Shape>,
        right: Box<Shape>,
    },
    Difference {
        left: Box<Shape>,
        right: Box<Shape>,
    },
    Xor {
        left: Box<Shape>,
        right: Box<Shape>,
    },
    Append {
        left: Box<Shape>,
        right: Box<Shape>,
    },
    Extend {
        left: Box<Shape>,
        right: Box<Shape>,
    },
}

/// Concrete geometry produced by evaluating a [`Shape`]
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedShape {
    pub path: Path,
    pub fill_rule: FillRule,
}

fn points_from_records(records: &[[f32; 2]]) -> Vec<Point> {
    records.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}

impl Shape {
    /// Parse a shape record from its JSON key/value form
    pub fn from_record(json: &str) -> Result<Shape, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Lower the expression tree to concrete path geometry
    ///
    /// Fails without partial effect: either the whole tree lowers or an
    /// error propagates out of the recursion.
    pub fn evaluate(&self, geometry: &dyn GeometryOps) -> Result<ResolvedShape, ShapeError> {
        let path = self.lower(geometry)?;
        Ok(ResolvedShape {
            path,
            fill_rule: self.fill_rule(),
        })
    }

    /// The fill rule requested by the outermost `Fill` node, if any
    fn fill_rule(&self) -> FillRule {
        match self {
            Shape::Fill { rule, .. } => *rule,
            _ => FillRule::default(),
        }
    }

    fn lower(&self, geometry: &dyn GeometryOps) -> Result<Path, ShapeError> {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Ok(Path::rect(Rect::new(*x, *y, *width, *height))),
            Shape::RoundedRect {
                x,
                y,
                width,
                height,
                radii,
            } => Ok(Path::rounded_rect(
                Rect::new(*x, *y, *width, *height),
                *radii,
            )),
            Shape::Ellipse { cx, cy, rx, ry } => {
                Ok(Path::ellipse(Point::new(*cx, *cy), Point::new(*rx, *ry)))
            }
            Shape::Line { x1, y1, x2, y2 } => {
                Ok(Path::line(Point::new(*x1, *y1), Point::new(*x2, *y2)))
            }
            Shape::Polyline { points } => Path::polyline(&points_from_records(points))
                .map_err(|_| ShapeError::InvalidParameter("polyline requires at least two points")),
            Shape::Polygon { points } => Path::polygon(&points_from_records(points))
                .map_err(|_| ShapeError::InvalidParameter("polygon requires at least two points")),
            Shape::Path { data } => Ok(Path::from_instructions(data)?),
            Shape::Transform { shape, matrix } => {
                let [a, b, c, d, tx, ty] = *matrix;
                let path = shape.lower(geometry)?;
                Ok(path.transform(&AffineTransform::new(a, b, c, d, tx, ty)))
            }
            Shape::Fill { shape, .. } => shape.lower(geometry),
            Shape::Dash {
                shape,
                lengths,
                phase,
            } => {
                if lengths.iter().any(|l| !l.is_finite() || *l < 0.0) {
                    return Err(ShapeError::InvalidParameter(
                        "dash lengths must be finite and non-negative",
                    ));
                }
                let path = shape.lower(geometry)?;
                geometry.dash(&path, lengths, *phase)
            }
            Shape::Thicken {
                shape,
                width,
                cap,
                join,
                miter_limit,
            } => {
                if !width.is_finite() || *width <= 0.0 {
                    return Err(ShapeError::InvalidParameter(
                        "thicken width must be positive",
                    ));
                }
                let path = shape.lower(geometry)?;
                geometry.thicken(&path, *width, *cap, *join, *miter_limit)
            }
            Shape::Union { left, right } => self.combine(geometry, CombineOp::Union, left, right),
            Shape::Intersect { left, right } => {
                self.combine(geometry, CombineOp::Intersect, left, right)
            }
            Shape::Difference { left, right } => {
                self.combine(geometry, CombineOp::Difference, left, right)
            }
            Shape::Xor { left, right } => self.combine(geometry, CombineOp::Xor, left, right),
            Shape::Append { left, right } => self.combine(geometry, CombineOp::Append, left, right),
            Shape::Extend { left, right } => self.combine(geometry, CombineOp::Extend, left, right),
        }
    }

    fn combine(
        &self,
        geometry: &dyn GeometryOps,
        op: CombineOp,
        left: &Shape,
        right: &Shape,
    ) -> Result<Path, ShapeError> {
        let left = left.lower(geometry)?;
        let right = right.lower(geometry)?;
        geometry.combine(op, &left, &right)
    }
}
