//! Image-resource collaborator interface
//!
//! Image decoding and caching live outside the canvas engine. The engine only
//! needs intrinsic dimensions and the ability to lock a rendered frame at a
//! requested density, so that is all this trait exposes.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Image resource errors, propagated from the image collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("failed to create image: {0}")]
    Creation(String),

    #[error("failed to lock image frame: {0}")]
    Lock(String),
}

/// A frame of RGBA pixels locked at a concrete density
///
/// `scale` reports the density the collaborator actually produced, which may
/// differ from the requested one (e.g. a bitmap-only source that cannot
/// upsample).
#[derive(Clone)]
pub struct LockedFrame {
    pub pixels: Arc<[u8]>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub scale: f32,
}

impl fmt::Debug for LockedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedFrame")
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("scale", &self.scale)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// An image resource resolved by the external image collaborator
///
/// Implementations are shared behind `Arc`; the engine retains them for at
/// least the lifetime of any paint that references them.
pub trait ImageSource {
    /// Intrinsic width in user-space units
    fn width(&self) -> f32;

    /// Intrinsic height in user-space units
    fn height(&self) -> f32;

    /// Render and lock a frame at (approximately) the given density scale
    fn lock_frame(&self, scale: f32) -> Result<LockedFrame, ImageError>;
}

impl fmt::Debug for dyn ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({}x{})", self.width(), self.height())
    }
}
