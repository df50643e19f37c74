//! Font-service interface and text alignment
//!
//! Shaping, metrics and glyph drawing belong to the external font
//! collaborator. The canvas only computes where text goes: alignment inside a
//! rectangle works from the measured width plus the font's ascent/descent.

use crate::backend::RenderBackend;
use thiserror::Error;
use vexel_core::{AffineTransform, Point, Rect};

/// Text collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("failed to measure text: {0}")]
    Measure(String),

    #[error("failed to draw text: {0}")]
    Draw(String),
}

/// Font weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Bold,
    Black,
}

/// A font selection value
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    /// Size in user-space units
    pub size: f32,
    pub weight: FontWeight,
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "system-ui".to_string(),
            size: 14.0,
            weight: FontWeight::Regular,
            italic: false,
        }
    }
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Measured extents of a text run
///
/// `typographic_bounds` is advance-based layout geometry; `ink_bounds` is the
/// tight box around what actually gets painted. Both are relative to the
/// baseline origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    pub typographic_bounds: Rect,
    pub ink_bounds: Rect,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn width(&self) -> f32 {
        self.typographic_bounds.width
    }
}

/// Whether text paints with the fill or stroke pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDrawMode {
    Fill,
    Stroke,
}

/// The font collaborator: measures and draws text
pub trait FontService {
    /// Measure a run under the given device transform
    fn measure(
        &self,
        text: &str,
        font: &Font,
        device_transform: &AffineTransform,
    ) -> Result<TextMetrics, TextError>;

    /// Draw a run with its baseline origin at `origin`
    fn draw(
        &mut self,
        backend: &mut dyn RenderBackend,
        text: &str,
        origin: Point,
        font: &Font,
        mode: TextDrawMode,
    ) -> Result<(), TextError>;
}

/// Horizontal placement of text in a rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

/// Vertical placement of text in a rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextVAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Baseline origin for a measured run aligned inside `rect`
pub(crate) fn aligned_origin(
    metrics: &TextMetrics,
    rect: &Rect,
    align: TextAlign,
    valign: TextVAlign,
) -> Point {
    let x = match align {
        TextAlign::Start => rect.x,
        TextAlign::Center => rect.x + (rect.width - metrics.width()) / 2.0,
        TextAlign::End => rect.right() - metrics.width(),
    };
    let line_height = metrics.ascent + metrics.descent;
    let y = match valign {
        TextVAlign::Top => rect.y + metrics.ascent,
        TextVAlign::Middle => rect.y + (rect.height - line_height) / 2.0 + metrics.ascent,
        TextVAlign::Bottom => rect.bottom() - metrics.descent,
    };
    Point::new(x, y)
}
