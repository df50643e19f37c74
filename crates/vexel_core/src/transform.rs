//! 2D affine transforms
//!
//! An [`AffineTransform`] maps `(x, y)` to `(a·x + c·y + tx, b·x + d·y + ty)`:
//!
//! ```text
//! | a  c  tx |   | x |
//! | b  d  ty | * | y |
//! | 0  0   1 |   | 1 |
//! ```
//!
//! Composition follows function-application order: `t2.concat(&t1)` is the
//! transform that applies `t1` first, then `t2`.

use crate::geometry::Point;
use crate::ValueError;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Transform errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    #[error("transform is singular and cannot be inverted")]
    Singular,

    #[error("transform cannot be decomposed: zero scale after un-rotation")]
    Decompose,
}

/// A 2D affine transform
#[derive(Clone, Copy, Debug)]
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable)]
pub struct AffineTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartialEq for AffineTransform {
    fn eq(&self, other: &Self) -> bool {
        self.a.to_bits() == other.a.to_bits()
            && self.b.to_bits() == other.b.to_bits()
            && self.c.to_bits() == other.c.to_bits()
            && self.d.to_bits() == other.d.to_bits()
            && self.tx.to_bits() == other.tx.to_bits()
            && self.ty.to_bits() == other.ty.to_bits()
    }
}

impl Eq for AffineTransform {}

impl Hash for AffineTransform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in [self.a, self.b, self.c, self.d, self.tx, self.ty] {
            v.to_bits().hash(state);
        }
    }
}

/// Result of [`AffineTransform::decompose`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposition {
    pub translation: Point,
    /// Rotation in radians
    pub rotation: f32,
    pub scale: Point,
    /// Skew factors (x skew, y skew)
    pub skew: Point,
}

impl Decomposition {
    /// Rebuild the transform as `Translate · Rotate · Skew · Scale`
    pub fn recompose(&self) -> AffineTransform {
        AffineTransform::translation(self.translation.x, self.translation.y)
            .concat(&AffineTransform::rotation(self.rotation))
            .concat(&AffineTransform::skewing(self.skew.x, self.skew.y))
            .concat(&AffineTransform::scaling(self.scale.x, self.scale.y))
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians, counter-clockwise in y-up coordinates
    pub fn rotation(angle: f32) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Shear: `kx` tilts x by y, `ky` tilts y by x
    pub const fn skewing(kx: f32, ky: f32) -> Self {
        Self::new(1.0, ky, kx, 1.0, 0.0, 0.0)
    }

    /// Create from a host-supplied matrix list: `[a, b, c, d, tx, ty]`
    pub fn from_slice(values: &[f32]) -> Result<Self, ValueError> {
        match values {
            [a, b, c, d, tx, ty] => Ok(Self::new(*a, *b, *c, *d, *tx, *ty)),
            _ => Err(ValueError::WrongArity {
                expected: 6,
                got: values.len(),
            }),
        }
    }

    /// Compose with another transform: the result applies `other` first,
    /// then `self`
    pub fn concat(&self, other: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// `self` with a translation applied before it
    pub fn translated(&self, tx: f32, ty: f32) -> AffineTransform {
        self.concat(&Self::translation(tx, ty))
    }

    /// `self` with a scale applied before it
    pub fn scaled(&self, sx: f32, sy: f32) -> AffineTransform {
        self.concat(&Self::scaling(sx, sy))
    }

    /// `self` with a rotation applied before it
    pub fn rotated(&self, angle: f32) -> AffineTransform {
        self.concat(&Self::rotation(angle))
    }

    /// `self` with a skew applied before it
    pub fn skewed(&self, kx: f32, ky: f32) -> AffineTransform {
        self.concat(&Self::skewing(kx, ky))
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    pub fn invert(&self) -> Result<AffineTransform, TransformError> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(TransformError::Singular);
        }
        let inv = 1.0 / det;
        Ok(AffineTransform {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.c * self.ty - self.d * self.tx) * inv,
            ty: (self.b * self.tx - self.a * self.ty) * inv,
        })
    }

    /// Map a point through the transform
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Map a direction vector (translation ignored)
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Split the transform into translation, rotation, skew, and scale
    ///
    /// The rotation is the angle of the transformed unit x-vector; scale and
    /// skew come from the matrix with that rotation removed. Fails when the
    /// un-rotated matrix has a zero on the diagonal (the transform collapses
    /// an axis and carries no usable scale).
    pub fn decompose(&self) -> Result<Decomposition, TransformError> {
        let translation = Point::new(self.tx, self.ty);
        let lin = AffineTransform {
            tx: 0.0,
            ty: 0.0,
            ..*self
        };

        // Angle of the image of (1, 0)
        let rotation = lin.b.atan2(lin.a);

        let unrotated = AffineTransform::rotation(-rotation).concat(&lin);
        if unrotated.a == 0.0 || unrotated.d == 0.0 {
            return Err(TransformError::Decompose);
        }

        Ok(Decomposition {
            translation,
            rotation,
            scale: Point::new(unrotated.a, unrotated.d),
            skew: Point::new(unrotated.c / unrotated.d, unrotated.b / unrotated.a),
        })
    }
}
