//! Gradient fills
//!
//! A gradient is a validated stop ramp plus a transform that places its
//! geometry in user space. The transform's image of the unit basis doubles as
//! the gradient's control points: `from` is the image of (0,0), `to` of
//! (1,0), and `via` of (0,1).

use thiserror::Error;
use vexel_core::{AffineTransform, Color, Point, ValueError};

/// Gradient validation errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GradientError {
    #[error("invalid ramp: gradient requires at least one stop")]
    EmptyRamp,

    #[error("gradient stop offset {0} is outside 0..=1")]
    StopRange(f32),

    #[error("gradient stops are not in non-decreasing offset order")]
    StopOrder,
}

/// The curve family a gradient ramp is swept along
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GradientFunction {
    #[default]
    Linear,
    Radial,
    Sweep,
}

impl std::str::FromStr for GradientFunction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(GradientFunction::Linear),
            "radial" => Ok(GradientFunction::Radial),
            "sweep" => Ok(GradientFunction::Sweep),
            _ => Err(ValueError::UnknownName(s.to_string())),
        }
    }
}

/// A single offset/color stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the ramp, 0.0 to 1.0
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A gradient paint
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    function: GradientFunction,
    stops: Vec<GradientStop>,
    transform: AffineTransform,
    /// Reflect every other repetition
    pub mirror: bool,
    /// Continue the ramp beyond its ends
    pub wrap: bool,
    /// Number of ramp repetitions across the geometry
    pub repeat_count: f32,
    /// Interpolate the ramp smoothly instead of sampling nearest
    pub filter: bool,
}

fn check_ramp(stops: &[GradientStop]) -> Result<(), GradientError> {
    if stops.is_empty() {
        return Err(GradientError::EmptyRamp);
    }
    let mut prev = f32::NEG_INFINITY;
    for stop in stops {
        if !(0.0..=1.0).contains(&stop.offset) {
            return Err(GradientError::StopRange(stop.offset));
        }
        if stop.offset < prev {
            return Err(GradientError::StopOrder);
        }
        prev = stop.offset;
    }
    Ok(())
}

impl Gradient {
    /// Create a gradient from a validated stop ramp
    pub fn new(
        function: GradientFunction,
        stops: Vec<GradientStop>,
    ) -> Result<Self, GradientError> {
        check_ramp(&stops)?;
        Ok(Self {
            function,
            stops,
            transform: AffineTransform::IDENTITY,
            mirror: false,
            wrap: false,
            repeat_count: 1.0,
            filter: true,
        })
    }

    /// Linear gradient running from `from` to `to`
    pub fn linear(
        from: Point,
        to: Point,
        stops: Vec<GradientStop>,
    ) -> Result<Self, GradientError> {
        let mut g = Self::new(GradientFunction::Linear, stops)?;
        let axis = to - from;
        g.set_control_points(from, to, from + Point::new(-axis.y, axis.x));
        Ok(g)
    }

    /// Radial gradient centered on `center` with the given radius
    pub fn radial(
        center: Point,
        radius: f32,
        stops: Vec<GradientStop>,
    ) -> Result<Self, GradientError> {
        let mut g = Self::new(GradientFunction::Radial, stops)?;
        g.set_control_points(
            center,
            center + Point::new(radius, 0.0),
            center + Point::new(0.0, radius),
        );
        Ok(g)
    }

    pub fn function(&self) -> GradientFunction {
        self.function
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Replace the whole ramp; the gradient is unchanged on failure
    pub fn set_stops(&mut self, stops: Vec<GradientStop>) -> Result<(), GradientError> {
        check_ramp(&stops)?;
        self.stops = stops;
        Ok(())
    }

    /// Insert a stop keeping the ramp ordered
    ///
    /// The stop lands before the first existing stop whose offset is not less
    /// than its own; out-of-range offsets are rejected before any mutation.
    pub fn add_stop(&mut self, stop: GradientStop) -> Result<(), GradientError> {
        if !(0.0..=1.0).contains(&stop.offset) {
            return Err(GradientError::StopRange(stop.offset));
        }
        let at = self
            .stops
            .iter()
            .position(|s| s.offset >= stop.offset)
            .unwrap_or(self.stops.len());
        self.stops.insert(at, stop);
        Ok(())
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: AffineTransform) {
        self.transform = transform;
    }

    /// Image of (0, 0): the gradient's start point
    pub fn from(&self) -> Point {
        self.transform.apply(Point::ZERO)
    }

    /// Image of (1, 0): the gradient's end point
    pub fn to(&self) -> Point {
        self.transform.apply(Point::new(1.0, 0.0))
    }

    /// Image of (0, 1): the gradient's secondary axis point
    pub fn via(&self) -> Point {
        self.transform.apply(Point::new(0.0, 1.0))
    }

    pub fn set_from(&mut self, from: Point) {
        let (to, via) = (self.to(), self.via());
        self.set_control_points(from, to, via);
    }

    pub fn set_to(&mut self, to: Point) {
        let (from, via) = (self.from(), self.via());
        self.set_control_points(from, to, via);
    }

    pub fn set_via(&mut self, via: Point) {
        let (from, to) = (self.from(), self.to());
        self.set_control_points(from, to, via);
    }

    /// Rebuild the transform so the unit basis maps onto the three points
    pub fn set_control_points(&mut self, from: Point, to: Point, via: Point) {
        self.transform = AffineTransform::new(
            to.x - from.x,
            to.y - from.y,
            via.x - from.x,
            via.y - from.y,
            from.x,
            from.y,
        );
    }
}
