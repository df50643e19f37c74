//! Paint variants

use crate::gradient::Gradient;
use std::fmt;
use std::sync::Arc;
use vexel_core::{AffineTransform, Color, ImageSource};

/// A tiled image fill
///
/// The transform maps image space into user space before painting; scaling it
/// changes the tile density, which is why pattern paints must be re-pushed to
/// the backend whenever the device transform changes.
#[derive(Clone)]
pub struct Pattern {
    pub image: Arc<dyn ImageSource>,
    pub transform: AffineTransform,
}

impl Pattern {
    pub fn new(image: Arc<dyn ImageSource>) -> Self {
        Self {
            image,
            transform: AffineTransform::IDENTITY,
        }
    }

    pub fn with_transform(image: Arc<dyn ImageSource>, transform: AffineTransform) -> Self {
        Self { image, transform }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("image", &format_args!("{}x{}", self.image.width(), self.image.height()))
            .field("transform", &self.transform)
            .finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        // Image identity, not pixel content
        Arc::ptr_eq(&self.image, &other.image) && self.transform == other.transform
    }
}

/// How filled and stroked regions get their color
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    Pattern(Pattern),
    Gradient(Gradient),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<Pattern> for Paint {
    fn from(pattern: Pattern) -> Self {
        Paint::Pattern(pattern)
    }
}

impl From<Gradient> for Paint {
    fn from(gradient: Gradient) -> Self {
        Paint::Gradient(gradient)
    }
}

impl Paint {
    /// Whether pushing this paint to a backend depends on the device transform
    pub fn is_device_dependent(&self) -> bool {
        matches!(self, Paint::Pattern(_))
    }
}
