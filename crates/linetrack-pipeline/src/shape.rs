//! Seed point placement for the jittered track shapes.
//!
//! Every shape is laid out inside a usable area that leaves a 10% margin
//! on each side of the canvas. Points along a side keep their nominal
//! coordinate on the walking axis and are jittered on the perpendicular
//! axis by up to 10% of the usable extent, so consecutive runs of the
//! same seed differ only through the injected random source.

use rand::Rng;

use crate::types::{Dimensions, Point, Polyline, TrackError};

/// Fewest distinct points a rectangle track is built from.
pub const RECTANGLE_MIN_POINTS: usize = 20;

/// Curve parameter of the rectangle's start/stop line.
pub const RECTANGLE_START_STOP_LOCATION: f64 = 0.125;

const MARGIN_FRACTION: f64 = 0.1;
const JITTER_FRACTION: f64 = 0.1;

/// A letter-like glyph outline with `prongs` horizontal arms, such as
/// `E` (three arms) or `C` (two arms).
///
/// The glyph is built from three long sides (bottom, top and the
/// vertical spine), `2·(prongs−1)` short sides forming the gaps between
/// the arms, and `2·prongs−1` small vertical sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterShape {
    /// Display name used in log output.
    pub name: &'static str,
    /// Number of horizontal arms. At least 2.
    pub prongs: usize,
    /// Length of a short side relative to the glyph width, in `(0, 1)`.
    pub short_ratio: f64,
    /// Fewest distinct points the glyph is built from.
    pub min_points: usize,
    /// Curve parameter of the start/stop line.
    pub start_stop_location: f64,
}

impl LetterShape {
    pub const E: Self = Self {
        name: "E",
        prongs: 3,
        short_ratio: 2.0 / 3.0,
        min_points: 30,
        start_stop_location: 0.05,
    };

    pub const C: Self = Self {
        name: "C",
        prongs: 2,
        short_ratio: 2.0 / 3.0,
        min_points: 14,
        start_stop_location: 0.05,
    };

    const fn short_count(&self) -> usize {
        2 * (self.prongs - 1)
    }

    const fn small_count(&self) -> usize {
        2 * self.prongs - 1
    }

    #[allow(clippy::cast_precision_loss)]
    fn small_ratio(&self) -> f64 {
        1.0 / self.small_count() as f64
    }

    fn validate(&self) -> Result<(), TrackError> {
        if self.prongs < 2 {
            return Err(TrackError::InvalidConfig(format!(
                "letter shape {} needs at least 2 prongs, got {}",
                self.name, self.prongs
            )));
        }
        if !(self.short_ratio > 0.0 && self.short_ratio < 1.0) {
            return Err(TrackError::InvalidConfig(format!(
                "letter shape {} short ratio must be in (0, 1), got {}",
                self.name, self.short_ratio
            )));
        }
        Ok(())
    }
}

/// The jittered closed-track families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackShape {
    /// A rectangle spanning the usable area.
    Rectangle,
    /// A letter-like glyph.
    Letter(LetterShape),
}

impl TrackShape {
    /// Fewest distinct points this shape is built from.
    #[must_use]
    pub const fn min_points(&self) -> usize {
        match self {
            Self::Rectangle => RECTANGLE_MIN_POINTS,
            Self::Letter(letter) => letter.min_points,
        }
    }

    /// Curve parameter at which the start/stop line is placed.
    #[must_use]
    pub const fn start_stop_location(&self) -> f64 {
        match self {
            Self::Rectangle => RECTANGLE_START_STOP_LOCATION,
            Self::Letter(letter) => letter.start_stop_location,
        }
    }

    /// Raise `requested` to the shape's minimum point count.
    #[must_use]
    pub fn clamp_point_count(&self, requested: usize) -> usize {
        let used = requested.max(self.min_points());
        if used != requested {
            tracing::debug!(requested, used, "number of points limited to minimum");
        }
        used
    }

    /// Generate the closed seed point sequence for this shape.
    ///
    /// `requested` is raised to [`Self::min_points`] first. The returned
    /// polyline repeats its first point as its last.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] for empty dimensions or an
    /// inconsistent letter shape.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        requested: usize,
        dimensions: Dimensions,
        rng: &mut R,
    ) -> Result<Polyline, TrackError> {
        let n = self.clamp_point_count(requested);
        match self {
            Self::Rectangle => rectangle_points(n, dimensions, rng),
            Self::Letter(letter) => letter_points(letter, n, dimensions, rng),
        }
    }
}

/// Generate `n` (or a few more) jittered points around a rectangle.
///
/// Sides are walked counter-clockwise starting at the bottom-left
/// corner. Points per side follow the aspect ratio of the canvas.
///
/// # Errors
///
/// Returns [`TrackError::InvalidConfig`] if either dimension is zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn rectangle_points<R: Rng + ?Sized>(
    n: usize,
    dimensions: Dimensions,
    rng: &mut R,
) -> Result<Polyline, TrackError> {
    let area = UsableArea::new(dimensions)?;
    let w = f64::from(dimensions.width);
    let h = f64::from(dimensions.height);

    let nx = ((n as f64 * w / (2.0 * (w + h))).floor() as usize).max(1);
    let ny = n.div_ceil(2).saturating_sub(nx).max(1);

    let dx = area.width / nx as f64;
    let dy = area.height / ny as f64;

    let mut points = Vec::with_capacity(2 * (nx + ny) + 1);
    area.walk_x(&mut points, rng, 0.0, 0.0, dx, nx);
    area.walk_y(&mut points, rng, area.width, 0.0, dy, ny);
    area.walk_x(&mut points, rng, area.width, area.height, -dx, nx);
    area.walk_y(&mut points, rng, 0.0, area.height, -dy, ny);
    close(&mut points);

    tracing::debug!(nx, ny, points = points.len(), "rectangle seed points");
    Ok(Polyline::new(points))
}

/// Generate at least `n` jittered points around a letter glyph.
///
/// # Errors
///
/// Returns [`TrackError::InvalidConfig`] if either dimension is zero or
/// the letter shape is inconsistent.
#[allow(clippy::cast_precision_loss)]
pub fn letter_points<R: Rng + ?Sized>(
    letter: &LetterShape,
    n: usize,
    dimensions: Dimensions,
    rng: &mut R,
) -> Result<Polyline, TrackError> {
    letter.validate()?;
    let area = UsableArea::new(dimensions)?;

    let [long, short, small] = letter_budget(letter, n);
    let small_count = letter.small_count();

    let level = area.height * letter.small_ratio();
    let short_length = area.width * letter.short_ratio;
    let inner_x = area.width - short_length;

    let long_dx = area.width / long as f64;
    let long_dy = area.height / long as f64;
    let short_dx = short_length / short as f64;
    let small_dy = level / small as f64;

    let mut points = Vec::with_capacity(3 * long + 2 * short * small_count + 1);
    area.walk_x(&mut points, rng, 0.0, 0.0, long_dx, long);

    for i in 0..small_count {
        let y = i as f64 * level;
        let outer = i % 2 == 0;
        let x = if outer { area.width } else { inner_x };
        area.walk_y(&mut points, rng, x, y, small_dy, small);

        if i + 1 < small_count {
            let next_y = y + level;
            if outer {
                area.walk_x(&mut points, rng, area.width, next_y, -short_dx, short);
            } else {
                area.walk_x(&mut points, rng, inner_x, next_y, short_dx, short);
            }
        }
    }

    area.walk_x(&mut points, rng, area.width, area.height, -long_dx, long);
    area.walk_y(&mut points, rng, 0.0, area.height, -long_dy, long);
    close(&mut points);

    tracing::debug!(
        shape = letter.name,
        long,
        short,
        small,
        points = points.len(),
        "letter seed points"
    );
    Ok(Polyline::new(points))
}

/// Points per side for the long, short and small side types.
///
/// Each type starts at its proportional share of `n` (at least one
/// point) and the type furthest below its ideal share is topped up until
/// the glyph holds at least `n` points.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn letter_budget(letter: &LetterShape, n: usize) -> [usize; 3] {
    let counts = [3, letter.short_count(), letter.small_count()];
    let ratios = [1.0, letter.short_ratio, letter.small_ratio()];
    let weight: f64 = counts
        .iter()
        .zip(ratios)
        .map(|(&count, ratio)| count as f64 * ratio)
        .sum();

    let ideal = ratios.map(|ratio| n as f64 * ratio / weight);
    let mut budget = ideal.map(|share| (share.floor() as usize).max(1));

    let total = |budget: &[usize; 3]| -> usize {
        budget.iter().zip(counts).map(|(b, c)| b * c).sum()
    };
    while total(&budget) < n {
        let deficit = |t: usize| ideal[t] - budget[t] as f64;
        let mut pick = 0;
        for t in 1..3 {
            if deficit(t) > deficit(pick) {
                pick = t;
            }
        }
        budget[pick] += 1;
    }
    budget
}

/// The margin-inset region points are placed in.
struct UsableArea {
    origin: Point,
    width: f64,
    height: f64,
    tolerance_x: f64,
    tolerance_y: f64,
}

impl UsableArea {
    fn new(dimensions: Dimensions) -> Result<Self, TrackError> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(TrackError::InvalidConfig(format!(
                "image dimensions must be non-zero, got {}x{}",
                dimensions.width, dimensions.height
            )));
        }
        let w = f64::from(dimensions.width);
        let h = f64::from(dimensions.height);
        let width = w * (1.0 - 2.0 * MARGIN_FRACTION);
        let height = h * (1.0 - 2.0 * MARGIN_FRACTION);
        Ok(Self {
            origin: Point::new(w * MARGIN_FRACTION, h * MARGIN_FRACTION),
            width,
            height,
            tolerance_x: width * JITTER_FRACTION,
            tolerance_y: height * JITTER_FRACTION,
        })
    }

    /// `count` points stepping along x from `(x, y)`, jittered in y.
    #[allow(clippy::cast_precision_loss)]
    fn walk_x<R: Rng + ?Sized>(
        &self,
        out: &mut Vec<Point>,
        rng: &mut R,
        x: f64,
        y: f64,
        step: f64,
        count: usize,
    ) {
        for i in 0..count {
            let px = (i as f64).mul_add(step, x);
            let py = jitter(rng, y, self.tolerance_y);
            out.push(Point::new(self.origin.x + px, self.origin.y + py));
        }
    }

    /// `count` points stepping along y from `(x, y)`, jittered in x.
    #[allow(clippy::cast_precision_loss)]
    fn walk_y<R: Rng + ?Sized>(
        &self,
        out: &mut Vec<Point>,
        rng: &mut R,
        x: f64,
        y: f64,
        step: f64,
        count: usize,
    ) {
        for i in 0..count {
            let px = jitter(rng, x, self.tolerance_x);
            let py = (i as f64).mul_add(step, y);
            out.push(Point::new(self.origin.x + px, self.origin.y + py));
        }
    }
}

/// Uniform sample from `[base − tolerance/2, base + tolerance)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f64, tolerance: f64) -> f64 {
    let low = base - tolerance / 2.0;
    let high = base + tolerance;
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

fn close(points: &mut Vec<Point>) {
    if let Some(&first) = points.first() {
        points.push(first);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn distinct(polyline: &Polyline) -> usize {
        polyline.len() - 1
    }

    // --- rectangle ---

    #[test]
    fn rectangle_is_closed_with_at_least_n_points() {
        for n in [20, 21, 33, 80] {
            let points = rectangle_points(n, Dimensions::square(1024), &mut rng()).unwrap();
            assert!(points.is_closed(), "n={n}");
            assert!(distinct(&points) >= n, "n={n}: {}", distinct(&points));
        }
    }

    #[test]
    fn square_rectangle_has_twenty_points() {
        // nx = floor(20·1024 / 4096) = 5, ny = 10 − 5 = 5.
        let points = rectangle_points(20, Dimensions::square(1024), &mut rng()).unwrap();
        assert_eq!(distinct(&points), 20);
    }

    #[test]
    fn rectangle_sides_follow_aspect_ratio() {
        let dims = Dimensions {
            width: 2000,
            height: 1000,
        };
        let n = 60;
        // nx = floor(60·2000 / 6000) = 20, ny = 30 − 20 = 10.
        let points = rectangle_points(n, dims, &mut rng()).unwrap();
        assert_eq!(distinct(&points), 60);

        // The bottom side holds the first nx points, all near y = 100.
        let bottom = &points.points()[..20];
        for p in bottom {
            assert!((p.y - 100.0).abs() <= 80.0 + 1e-9, "{p:?}");
        }
    }

    #[test]
    fn rectangle_nominal_points_stay_in_margin() {
        // StepRng(0, 0) always draws the low end of the jitter range, so
        // points sit at `base − tol/2`.
        let mut rng = StepRng::new(0, 0);
        let points = rectangle_points(20, Dimensions::square(1024), &mut rng).unwrap();
        let tol = 0.8 * 1024.0 * 0.1;
        for p in points.points() {
            assert!(p.x >= 102.4 - tol / 2.0 - 1e-9 && p.x <= 921.6 + 1e-9, "{p:?}");
            assert!(p.y >= 102.4 - tol / 2.0 - 1e-9 && p.y <= 921.6 + 1e-9, "{p:?}");
        }
        // First point: x nominal, y at the low end of its jitter range.
        let first = points.first().unwrap();
        assert!((first.x - 102.4).abs() < 1e-9);
        assert!((first.y - (102.4 - tol / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn rectangle_rejects_zero_dimensions() {
        let dims = Dimensions {
            width: 0,
            height: 100,
        };
        assert!(matches!(
            rectangle_points(20, dims, &mut rng()),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rectangle_is_reproducible_with_same_seed() {
        let a = rectangle_points(24, Dimensions::square(512), &mut rng()).unwrap();
        let b = rectangle_points(24, Dimensions::square(512), &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    // --- clamping ---

    #[test]
    fn below_minimum_is_raised() {
        assert_eq!(TrackShape::Rectangle.clamp_point_count(5), 20);
        assert_eq!(TrackShape::Letter(LetterShape::E).clamp_point_count(10), 30);
        assert_eq!(TrackShape::Letter(LetterShape::C).clamp_point_count(3), 14);
        assert_eq!(TrackShape::Rectangle.clamp_point_count(42), 42);
    }

    #[test]
    fn generate_uses_clamped_count() {
        let points = TrackShape::Rectangle
            .generate(5, Dimensions::square(1024), &mut rng())
            .unwrap();
        assert!(distinct(&points) >= 20);
    }

    // --- letters ---

    #[test]
    fn letter_budget_reaches_requested_total() {
        for letter in [LetterShape::E, LetterShape::C] {
            for n in [letter.min_points, 45, 60, 100] {
                let [long, short, small] = letter_budget(&letter, n);
                let total = 3 * long + letter.short_count() * short + letter.small_count() * small;
                assert!(total >= n, "{} n={n}: {total}", letter.name);
                assert!(long >= 1 && short >= 1 && small >= 1);
            }
        }
    }

    #[test]
    fn e_track_at_minimum_has_every_side() {
        // 30 points used to leave the small sides without any point.
        let points = letter_points(&LetterShape::E, 30, Dimensions::square(1024), &mut rng()).unwrap();
        assert!(points.is_closed());
        assert!(distinct(&points) >= 30);
    }

    #[test]
    fn e_track_default_count() {
        let points = letter_points(&LetterShape::E, 60, Dimensions::square(1024), &mut rng()).unwrap();
        assert!(points.is_closed());
        assert!(distinct(&points) >= 60);
    }

    #[test]
    fn letter_walk_visits_outline_in_order() {
        let mut rng = StepRng::new(0, 0);
        let dims = Dimensions::square(1000);
        let points = letter_points(&LetterShape::E, 30, dims, &mut rng).unwrap();
        let [long, ..] = letter_budget(&LetterShape::E, 30);

        // Bottom side starts at the bottom-left corner and moves +x.
        let bottom = &points.points()[..long];
        assert!((bottom[0].x - 100.0).abs() < 1e-9);
        assert!(bottom.windows(2).all(|w| w[1].x > w[0].x));

        // The spine is the last run before the closing point and moves −y
        // at the left edge.
        let spine = &points.points()[points.len() - 1 - long..points.len() - 1];
        assert!(spine.windows(2).all(|w| w[1].y < w[0].y));
        assert!((spine[0].y - 900.0).abs() < 1e-9);
    }

    #[test]
    fn c_track_is_closed() {
        let points = letter_points(&LetterShape::C, 20, Dimensions::square(800), &mut rng()).unwrap();
        assert!(points.is_closed());
        assert!(distinct(&points) >= 20);
    }

    #[test]
    fn letter_rejects_single_prong() {
        let letter = LetterShape {
            name: "I",
            prongs: 1,
            ..LetterShape::E
        };
        assert!(matches!(
            letter_points(&letter, 30, Dimensions::square(100), &mut rng()),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    // --- jitter ---

    #[test]
    fn jitter_with_zero_tolerance_returns_base() {
        assert!((jitter(&mut rng(), 5.0, 0.0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jitter_stays_in_range() {
        let mut rng = rng();
        for _ in 0..200 {
            let v = jitter(&mut rng, 10.0, 4.0);
            assert!((8.0..14.0).contains(&v), "{v}");
        }
    }
}
