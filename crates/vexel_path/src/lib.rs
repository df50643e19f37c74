//! Vexel path engine
//!
//! Paths are immutable sequences of absolute drawing commands (move, line,
//! quadratic, cubic, close) describing zero or more subpaths. This crate
//! provides:
//!
//! - [`Path`] / [`PathBuilder`] - the value type and its mutable builder
//! - Shape constructors (rect, rounded rect, ellipse, arc family, polygons)
//! - The path-instruction codec: an SVG-subset text form with exact
//!   round-trip semantics ([`Path::from_instructions`] /
//!   [`Path::to_instructions`])
//! - The shape algebra: a typed expression tree over primitive shapes and
//!   combinators, lowered to concrete paths by a geometry collaborator

pub mod algebra;
pub mod codec;
pub mod path;
pub mod shapes;

pub use algebra::{CombineOp, GeometryOps, ResolvedShape, Shape, ShapeError};
pub use codec::PathParseError;
pub use path::{Path, PathBuilder, PathCommand};
pub use shapes::CornerRadius;
