//! Property frames and dirty flags

use crate::text::Font;
use smallvec::SmallVec;
use vexel_core::{BlendMode, FillRule, LineCap, LineJoin, ValueError};
use vexel_paint::Paint;

/// Image resampling quality used for patterns and image draws
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageFilter {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
}

impl std::str::FromStr for ImageFilter {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(ImageFilter::Nearest),
            "bilinear" => Ok(ImageFilter::Bilinear),
            "bicubic" => Ok(ImageFilter::Bicubic),
            _ => Err(ValueError::UnknownName(s.to_string())),
        }
    }
}

/// One snapshot of every canvas drawing property
///
/// Frames are plain values: `save` clones the top frame, `restore` drops it.
/// Shared sub-values (pattern images, gradient ramps) stay shared across the
/// clone.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFrame {
    pub paint: Paint,
    pub fill_rule: FillRule,
    pub antialiased: bool,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub stippled: bool,
    pub image_filter: ImageFilter,
    pub font: Font,
    pub stroke_width: f32,
    pub join_style: LineJoin,
    pub cap_style: LineCap,
    pub miter_limit: f32,
    pub dash_lengths: SmallVec<[f32; 4]>,
    pub dash_phase: f32,
}

impl Default for PropertyFrame {
    fn default() -> Self {
        Self {
            paint: Paint::default(),
            fill_rule: FillRule::default(),
            antialiased: true,
            opacity: 1.0,
            blend_mode: BlendMode::default(),
            stippled: false,
            image_filter: ImageFilter::default(),
            font: Font::default(),
            stroke_width: 1.0,
            join_style: LineJoin::default(),
            cap_style: LineCap::default(),
            miter_limit: 4.0,
            dash_lengths: SmallVec::new(),
            dash_phase: 0.0,
        }
    }
}

/// One bool per backend-synced property group
///
/// A set flag means the frame value has diverged from what the backend last
/// saw. Freshly created canvases start all-dirty so the first draw pushes a
/// complete state; so does every frame pop, because the backend's post-pop
/// state is unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub paint: bool,
    pub fill_rule: bool,
    pub antialias: bool,
    pub opacity: bool,
    pub blend_mode: bool,
    pub font: bool,
    pub stroke_width: bool,
    pub join_style: bool,
    pub cap_style: bool,
    pub miter_limit: bool,
    pub dashes: bool,
}

impl DirtyFlags {
    pub fn all_set() -> Self {
        Self {
            paint: true,
            fill_rule: true,
            antialias: true,
            opacity: true,
            blend_mode: true,
            font: true,
            stroke_width: true,
            join_style: true,
            cap_style: true,
            miter_limit: true,
            dashes: true,
        }
    }

    pub fn set_all(&mut self) {
        *self = Self::all_set();
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}
