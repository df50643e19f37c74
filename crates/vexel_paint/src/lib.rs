//! Vexel paint model
//!
//! A paint describes how filled or stroked regions get their color:
//!
//! - [`Paint::Solid`] - a single color
//! - [`Paint::Pattern`] - a tiled image with a tiling transform
//! - [`Paint::Gradient`] - a stop ramp swept along linear/radial/sweep geometry
//!
//! Bitmap effect descriptors ([`Effect`]) also live here: overlay, glow and
//! shadow parameter sets with type-gated properties.
//!
//! Everything in this crate is a value: construction and mutation either
//! succeed completely or fail leaving the previous value untouched.

pub mod effect;
pub mod gradient;
pub mod paint;

pub use effect::{Effect, EffectError, EffectKind, GlowSource};
pub use gradient::{Gradient, GradientError, GradientFunction, GradientStop};
pub use paint::{Paint, Pattern};
