//! Bitmap effect descriptors
//!
//! An [`Effect`] is a pure parameter set for an overlay, glow, or shadow
//! applied when a layer is composited. Which properties exist depends on the
//! effect kind; reading or writing a foreign property fails without touching
//! the value.
//!
//! | property | ColorOverlay | InnerShadow | OuterShadow | InnerGlow | OuterGlow |
//! |----------|--------------|-------------|-------------|-----------|-----------|
//! | size     |              | x           | x           | x         | x         |
//! | spread   |              | x           | x           | x         | x         |
//! | distance |              | x           | x           |           |           |
//! | angle    |              | x           | x           |           |           |
//! | knockout |              |             | x           |           |           |
//! | source   |              |             |             | x         |           |

use thiserror::Error;
use vexel_core::{BlendMode, Color, ValueError};

/// Effect property errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectError {
    #[error("effect property not available: {property} does not apply to {kind:?}")]
    PropertyNotAvailable {
        property: &'static str,
        kind: EffectKind,
    },

    #[error("invalid value for effect property {property}")]
    InvalidValue { property: &'static str },
}

/// The kind of bitmap effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    ColorOverlay,
    InnerShadow,
    OuterShadow,
    InnerGlow,
    OuterGlow,
}

impl EffectKind {
    fn has_blur(self) -> bool {
        !matches!(self, EffectKind::ColorOverlay)
    }

    fn is_shadow(self) -> bool {
        matches!(self, EffectKind::InnerShadow | EffectKind::OuterShadow)
    }
}

impl std::str::FromStr for EffectKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coloroverlay" => Ok(EffectKind::ColorOverlay),
            "innershadow" => Ok(EffectKind::InnerShadow),
            "outershadow" => Ok(EffectKind::OuterShadow),
            "innerglow" => Ok(EffectKind::InnerGlow),
            "outerglow" => Ok(EffectKind::OuterGlow),
            _ => Err(ValueError::UnknownName(s.to_string())),
        }
    }
}

/// Where an inner glow emanates from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlowSource {
    #[default]
    Edge,
    Center,
}

/// A bitmap effect parameter set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    pub color: Color,
    pub blend_mode: BlendMode,
    size: f32,
    spread: f32,
    distance: f32,
    angle: f32,
    knockout: bool,
    source: GlowSource,
}

impl Effect {
    /// Create an effect with kind-appropriate defaults
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            color: Color::BLACK,
            blend_mode: BlendMode::Normal,
            size: 5.0,
            spread: 0.0,
            distance: 5.0,
            // Degrees, measured like a clock from 3 o'clock counter-clockwise
            angle: 60.0,
            knockout: true,
            source: GlowSource::Edge,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    fn gate(&self, available: bool, property: &'static str) -> Result<(), EffectError> {
        if available {
            Ok(())
        } else {
            Err(EffectError::PropertyNotAvailable {
                property,
                kind: self.kind,
            })
        }
    }

    /// Blur extent; shadows and glows only
    pub fn size(&self) -> Result<f32, EffectError> {
        self.gate(self.kind.has_blur(), "size")?;
        Ok(self.size)
    }

    pub fn set_size(&mut self, size: f32) -> Result<(), EffectError> {
        self.gate(self.kind.has_blur(), "size")?;
        if !size.is_finite() || size < 0.0 {
            return Err(EffectError::InvalidValue { property: "size" });
        }
        self.size = size;
        Ok(())
    }

    /// Pre-blur expansion; shadows and glows only
    pub fn spread(&self) -> Result<f32, EffectError> {
        self.gate(self.kind.has_blur(), "spread")?;
        Ok(self.spread)
    }

    pub fn set_spread(&mut self, spread: f32) -> Result<(), EffectError> {
        self.gate(self.kind.has_blur(), "spread")?;
        if !spread.is_finite() || spread < 0.0 {
            return Err(EffectError::InvalidValue { property: "spread" });
        }
        self.spread = spread;
        Ok(())
    }

    /// Offset length; shadows only
    pub fn distance(&self) -> Result<f32, EffectError> {
        self.gate(self.kind.is_shadow(), "distance")?;
        Ok(self.distance)
    }

    pub fn set_distance(&mut self, distance: f32) -> Result<(), EffectError> {
        self.gate(self.kind.is_shadow(), "distance")?;
        if !distance.is_finite() {
            return Err(EffectError::InvalidValue {
                property: "distance",
            });
        }
        self.distance = distance;
        Ok(())
    }

    /// Offset direction in degrees; shadows only
    pub fn angle(&self) -> Result<f32, EffectError> {
        self.gate(self.kind.is_shadow(), "angle")?;
        Ok(self.angle)
    }

    pub fn set_angle(&mut self, angle: f32) -> Result<(), EffectError> {
        self.gate(self.kind.is_shadow(), "angle")?;
        if !angle.is_finite() {
            return Err(EffectError::InvalidValue { property: "angle" });
        }
        self.angle = angle;
        Ok(())
    }

    /// Whether the shadow punches out the source; outer shadow only
    pub fn knockout(&self) -> Result<bool, EffectError> {
        self.gate(self.kind == EffectKind::OuterShadow, "knockout")?;
        Ok(self.knockout)
    }

    pub fn set_knockout(&mut self, knockout: bool) -> Result<(), EffectError> {
        self.gate(self.kind == EffectKind::OuterShadow, "knockout")?;
        self.knockout = knockout;
        Ok(())
    }

    /// Glow origin; inner glow only
    pub fn source(&self) -> Result<GlowSource, EffectError> {
        self.gate(self.kind == EffectKind::InnerGlow, "source")?;
        Ok(self.source)
    }

    pub fn set_source(&mut self, source: GlowSource) -> Result<(), EffectError> {
        self.gate(self.kind == EffectKind::InnerGlow, "source")?;
        self.source = source;
        Ok(())
    }
}
