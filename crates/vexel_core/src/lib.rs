//! Vexel core value types
//!
//! Foundational value types shared by every Vexel crate:
//!
//! - Geometry (points, rectangles)
//! - Colors
//! - 2D affine transforms with decompose/recompose
//! - Drawing enums (fill rule, blend mode, line cap/join)
//! - The image-resource collaborator interface
//!
//! All value types here are immutable, structurally compared, and hashable,
//! so they can be shared freely across threads and used as cache keys.

pub mod color;
pub mod geometry;
pub mod image;
pub mod style;
pub mod transform;

pub use color::Color;
pub use geometry::{Point, Rect};
pub use image::{ImageError, ImageSource, LockedFrame};
pub use style::{BlendMode, FillRule, LineCap, LineJoin};
pub use transform::{AffineTransform, Decomposition, TransformError};

use thiserror::Error;

/// Errors raised when constructing value types from host-supplied data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected {expected} values, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("unknown name: {0}")]
    UnknownName(String),
}
