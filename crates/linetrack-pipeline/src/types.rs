//! Shared types for the linetrack geometry pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hold the rendered
/// ground texture without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in canvas coordinates.
///
/// The canvas origin is the bottom-left corner with `y` pointing up; the
/// rasterizer flips rows when producing the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: f64,
    /// Vertical position (pixels from the bottom edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Midpoint between this point and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Move the point by `scale` times `direction`.
    #[must_use]
    pub fn offset(self, direction: Vector, scale: f64) -> Self {
        Self::new(
            direction.x.mul_add(scale, self.x),
            direction.y.mul_add(scale, self.y),
        )
    }
}

/// A 2D direction or derivative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vector {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `from` to `to`.
    #[must_use]
    pub fn between(from: Point, to: Point) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The vector rotated by +90 degrees: `(-y, x)`.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }
}

/// A sequence of connected points forming a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Returns `true` if the polyline has at least two points and its
    /// last point repeats the first one exactly.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.len() >= 2 && self.0.first() == self.0.last()
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Square dimensions, the usual shape of a ground texture.
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const ORANGE: Self = Self::rgb(255, 165, 0);

    /// Create a color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Colors used by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Canvas background.
    pub background: Color,
    /// Track line, and start/stop line outside of debug mode.
    pub line: Color,
    /// Seed point dots (debug mode only).
    pub seed_point: Color,
    /// Start/stop line in debug mode.
    pub debug_marker: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            line: Color::BLACK,
            seed_point: Color::RED,
            debug_marker: Color::ORANGE,
        }
    }
}

/// Configuration for one track image build.
///
/// Physical sizes are given in meters and converted to pixels with
/// `pixels_per_meter`; the line width is already in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Output image size.
    pub dimensions: Dimensions,

    /// Conversion factor from arena meters to image pixels.
    pub pixels_per_meter: f64,

    /// Track line stroke width in pixels. Must be positive.
    pub line_width: f64,

    /// Gap between the track center line and each half of the
    /// start/stop line, in meters.
    pub start_stop_distance: f64,

    /// Length of each half of the start/stop line, in meters.
    pub start_stop_length: f64,

    /// Rasterizer colors.
    pub style: RenderStyle,

    /// Draw seed points and highlight the start/stop line.
    pub debug: bool,
}

impl TrackConfig {
    pub const DEFAULT_IMAGE_SIZE: u32 = 1024;
    pub const DEFAULT_ARENA_SIZE: f64 = 1.0;
    pub const DEFAULT_LINE_WIDTH: f64 = 0.015;
    pub const DEFAULT_START_STOP_DISTANCE: f64 = 0.025;
    pub const DEFAULT_START_STOP_LENGTH: f64 = 0.05;

    /// Configuration for a square arena of `arena_size` meters rendered
    /// into a square image of `image_size` pixels.
    ///
    /// The pixel line width is truncated to whole pixels.
    #[must_use]
    pub fn for_arena(image_size: u32, arena_size: f64, line_width: f64, debug: bool) -> Self {
        let pixels_per_meter = f64::from(image_size) / arena_size;
        Self {
            dimensions: Dimensions::square(image_size),
            pixels_per_meter,
            line_width: (f64::from(image_size) * line_width / arena_size).floor(),
            start_stop_distance: Self::DEFAULT_START_STOP_DISTANCE,
            start_stop_length: Self::DEFAULT_START_STOP_LENGTH,
            style: RenderStyle::default(),
            debug,
        }
    }

    /// Start/stop line gap in pixels.
    #[must_use]
    pub fn start_stop_distance_px(&self) -> f64 {
        self.start_stop_distance * self.pixels_per_meter
    }

    /// Start/stop line half length in pixels.
    #[must_use]
    pub fn start_stop_length_px(&self) -> f64 {
        self.start_stop_length * self.pixels_per_meter
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] for empty dimensions, a
    /// non-positive scale or line width, or negative start/stop sizes.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(TrackError::InvalidConfig(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.dimensions.width, self.dimensions.height
            )));
        }
        if !(self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "pixels per meter must be positive, got {}",
                self.pixels_per_meter
            )));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if self.start_stop_distance < 0.0 || self.start_stop_length < 0.0 {
            return Err(TrackError::InvalidConfig(
                "start/stop line sizes must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self::for_arena(
            Self::DEFAULT_IMAGE_SIZE,
            Self::DEFAULT_ARENA_SIZE,
            Self::DEFAULT_LINE_WIDTH,
            false,
        )
    }
}

/// Errors that abort a track build.
///
/// Point counts below a shape's minimum are not errors; they are raised
/// to the minimum before generation.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// Configuration is invalid.
    #[error("invalid track configuration: {0}")]
    InvalidConfig(String),

    /// A closed curve was requested for a sequence whose last point does
    /// not repeat its first point.
    #[error("point sequence is not closed")]
    NotClosed,

    /// Not enough points to fit a curve.
    #[error("at least {required} points are required, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    /// Two consecutive points coincide, leaving a zero-length chord.
    #[error("point {index} repeats its predecessor")]
    DuplicatePoint { index: usize },

    /// All points lie on one line; a closed curve through them would
    /// fold back on itself.
    #[error("points are collinear")]
    Collinear,

    /// The curve has no direction at the requested parameter.
    #[error("curve is stationary at u={u}")]
    StationaryCurve { u: f64 },

    /// The grid definition has too few waypoints.
    #[error("min. number of grid points is {required}, got {actual}")]
    TooFewWaypoints { required: usize, actual: usize },

    /// The grid definition could not be parsed.
    #[error("invalid grid definition: {0}")]
    GridFormat(#[from] serde_json::Error),
}
