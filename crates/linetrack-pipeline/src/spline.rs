//! Interpolating cubic splines through ordered point sequences.
//!
//! Both flavours are parameterized by normalized cumulative chord length
//! and stored in second-derivative form: each coordinate keeps its value
//! and second derivative at every knot, and a segment is evaluated from
//! the two knots that bound it.
//!
//! - [`fit_closed`] builds a periodic cubic (`C²` across the seam) by
//!   solving a cyclic tridiagonal system.
//! - [`fit_open`] builds a linear, quadratic or natural cubic curve
//!   depending on how many points it is given.

use crate::types::{Point, Polyline, TrackError, Vector};

/// Dense points per seed point when a closed track is resampled.
pub const RESAMPLE_FACTOR: usize = 10;

/// A smooth curve over the parameter domain `[0, 1]`.
pub trait ParametricCurve {
    /// Point on the curve at parameter `u`.
    fn point_at(&self, u: f64) -> Point;

    /// First derivative with respect to `u`.
    fn tangent_at(&self, u: f64) -> Vector;

    /// `count` points at uniformly spaced parameters from 0 to 1
    /// inclusive.
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, count: usize) -> Polyline {
        match count {
            0 => Polyline::default(),
            1 => Polyline::new(vec![self.point_at(0.0)]),
            _ => {
                let last = (count - 1) as f64;
                Polyline::new(
                    (0..count)
                        .map(|k| self.point_at(k as f64 / last))
                        .collect(),
                )
            }
        }
    }
}

/// Piecewise cubic through a sequence of knots.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve {
    knots: Vec<f64>,
    x: Axis,
    y: Axis,
    periodic: bool,
}

/// Values and second derivatives of one coordinate at every knot.
#[derive(Debug, Clone, PartialEq)]
struct Axis {
    values: Vec<f64>,
    second: Vec<f64>,
}

impl SplineCurve {
    /// Whether the curve wraps around at `u = 1`.
    #[must_use]
    pub const fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Knot parameters, starting at 0 and ending at 1.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Map `u` into the domain and find the segment containing it.
    fn locate(&self, u: f64) -> (usize, f64) {
        let u = if self.periodic {
            u.rem_euclid(1.0)
        } else {
            u.clamp(0.0, 1.0)
        };
        let segments = self.knots.len() - 1;
        let index = self
            .knots
            .partition_point(|&t| t <= u)
            .saturating_sub(1)
            .min(segments - 1);
        (index, u)
    }
}

impl ParametricCurve for SplineCurve {
    fn point_at(&self, u: f64) -> Point {
        let (i, u) = self.locate(u);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        Point::new(self.x.value(i, t0, t1, u), self.y.value(i, t0, t1, u))
    }

    fn tangent_at(&self, u: f64) -> Vector {
        let (i, u) = self.locate(u);
        let (t0, t1) = (self.knots[i], self.knots[i + 1]);
        Vector::new(
            self.x.derivative(i, t0, t1, u),
            self.y.derivative(i, t0, t1, u),
        )
    }
}

impl Axis {
    fn value(&self, i: usize, t0: f64, t1: f64, u: f64) -> f64 {
        let h = t1 - t0;
        let a = (t1 - u) / h;
        let b = (u - t0) / h;
        let curvature = (a.powi(3) - a).mul_add(self.second[i], (b.powi(3) - b) * self.second[i + 1]);
        a.mul_add(self.values[i], b * self.values[i + 1]) + curvature * h * h / 6.0
    }

    fn derivative(&self, i: usize, t0: f64, t1: f64, u: f64) -> f64 {
        let h = t1 - t0;
        let a = (t1 - u) / h;
        let b = (u - t0) / h;
        (self.values[i + 1] - self.values[i]) / h
            - 3.0f64.mul_add(a * a, -1.0) / 6.0 * h * self.second[i]
            + 3.0f64.mul_add(b * b, -1.0) / 6.0 * h * self.second[i + 1]
    }
}

/// Fit a closed periodic cubic spline through `points`.
///
/// The last point must repeat the first one; it becomes the seam at
/// `u = 0 ≡ 1`.
///
/// # Errors
///
/// - [`TrackError::TooFewPoints`] with fewer than 3 distinct points.
/// - [`TrackError::NotClosed`] if the sequence is open.
/// - [`TrackError::DuplicatePoint`] if consecutive points coincide.
/// - [`TrackError::Collinear`] if all points lie on one line.
pub fn fit_closed(points: &[Point]) -> Result<SplineCurve, TrackError> {
    if points.len() < 4 {
        return Err(TrackError::TooFewPoints {
            required: 4,
            actual: points.len(),
        });
    }
    if points.first() != points.last() {
        return Err(TrackError::NotClosed);
    }
    let knots = chord_parameters(points)?;
    if is_collinear(points) {
        return Err(TrackError::Collinear);
    }

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let steps: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();

    tracing::debug!(points = points.len() - 1, "fitting periodic spline");
    Ok(SplineCurve {
        x: periodic_axis(xs, &steps),
        y: periodic_axis(ys, &steps),
        knots,
        periodic: true,
    })
}

/// Fit an open interpolating spline through `points`.
///
/// The degree is `min(3, n − 1)`: two points give a line, three a
/// parabola, and four or more a natural cubic.
///
/// # Errors
///
/// - [`TrackError::TooFewPoints`] with fewer than 2 points.
/// - [`TrackError::DuplicatePoint`] if consecutive points coincide.
pub fn fit_open(points: &[Point]) -> Result<SplineCurve, TrackError> {
    if points.len() < 2 {
        return Err(TrackError::TooFewPoints {
            required: 2,
            actual: points.len(),
        });
    }
    let knots = chord_parameters(points)?;

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

    Ok(SplineCurve {
        x: open_axis(xs, &knots),
        y: open_axis(ys, &knots),
        knots,
        periodic: false,
    })
}

/// Fit a closed track through `seeds` and resample it densely.
///
/// # Errors
///
/// See [`fit_closed`].
pub fn fit_and_resample(seeds: &Polyline) -> Result<(SplineCurve, Polyline), TrackError> {
    let curve = fit_closed(seeds.points())?;
    let dense = curve.sample(seeds.len() * RESAMPLE_FACTOR);
    Ok((curve, dense))
}

/// Normalized cumulative chord lengths, one per point.
fn chord_parameters(points: &[Point]) -> Result<Vec<f64>, TrackError> {
    let mut knots = Vec::with_capacity(points.len());
    let mut total = 0.0;
    knots.push(0.0);
    for (index, pair) in points.windows(2).enumerate() {
        let chord = pair[0].distance(pair[1]);
        if chord <= f64::EPSILON {
            return Err(TrackError::DuplicatePoint { index: index + 1 });
        }
        total += chord;
        knots.push(total);
    }
    for t in &mut knots {
        *t /= total;
    }
    // Guard the final knot against rounding so lookups at u = 1 hit the
    // last segment.
    if let Some(last) = knots.last_mut() {
        *last = 1.0;
    }
    Ok(knots)
}

/// True if no point deviates from the line through the first point and
/// the point farthest from it.
fn is_collinear(points: &[Point]) -> bool {
    let origin = points[0];
    let far = points
        .iter()
        .copied()
        .max_by(|a, b| origin.distance_squared(*a).total_cmp(&origin.distance_squared(*b)))
        .unwrap_or(origin);
    let axis = Vector::between(origin, far);
    let length = axis.length();
    if length <= f64::EPSILON {
        return true;
    }
    let tolerance = length * 1e-9;
    points
        .iter()
        .all(|&p| (axis.cross(Vector::between(origin, p)) / length).abs() <= tolerance)
}

/// Second derivatives of a periodic cubic through `values`, where
/// `values[n] == values[0]` closes the loop over `n` segments.
fn periodic_axis(values: Vec<f64>, steps: &[f64]) -> Axis {
    let n = steps.len();
    let mut lower = vec![0.0; n];
    let mut diagonal = vec![0.0; n];
    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    for i in 0..n {
        let before = steps[(i + n - 1) % n];
        let after = steps[i];
        let previous = values[(i + n - 1) % n];
        lower[i] = before;
        diagonal[i] = 2.0 * (before + after);
        upper[i] = after;
        rhs[i] = 6.0 * ((values[i + 1] - values[i]) / after - (values[i] - previous) / before);
    }

    let mut second = solve_cyclic(&lower, &diagonal, &upper, &rhs);
    second.push(second[0]);
    Axis { values, second }
}

/// Second derivatives of an open spline of degree `min(3, n − 1)`.
fn open_axis(values: Vec<f64>, knots: &[f64]) -> Axis {
    let n = values.len();
    let second = match n {
        2 => vec![0.0; 2],
        3 => {
            // A parabola has constant second derivative, twice the second
            // divided difference.
            let d01 = (values[1] - values[0]) / (knots[1] - knots[0]);
            let d12 = (values[2] - values[1]) / (knots[2] - knots[1]);
            let curvature = 2.0 * (d12 - d01) / (knots[2] - knots[0]);
            vec![curvature; 3]
        }
        _ => {
            let m = n - 2;
            let mut lower = vec![0.0; m];
            let mut diagonal = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![0.0; m];
            for row in 0..m {
                let i = row + 1;
                let before = knots[i] - knots[i - 1];
                let after = knots[i + 1] - knots[i];
                lower[row] = before;
                diagonal[row] = 2.0 * (before + after);
                upper[row] = after;
                rhs[row] = 6.0
                    * ((values[i + 1] - values[i]) / after - (values[i] - values[i - 1]) / before);
            }
            let mut second = Vec::with_capacity(n);
            second.push(0.0);
            second.extend(solve_tridiagonal(&lower, &diagonal, &upper, &rhs));
            second.push(0.0);
            second
        }
    };
    Axis { values, second }
}

/// Thomas algorithm. `lower[0]` and `upper[n − 1]` are ignored.
fn solve_tridiagonal(lower: &[f64], diagonal: &[f64], upper: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diagonal.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    c[0] = upper[0] / diagonal[0];
    d[0] = rhs[0] / diagonal[0];
    for i in 1..n {
        let pivot = lower[i].mul_add(-c[i - 1], diagonal[i]);
        c[i] = if i + 1 < n { upper[i] / pivot } else { 0.0 };
        d[i] = lower[i].mul_add(-d[i - 1], rhs[i]) / pivot;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = c[i].mul_add(-x[i + 1], d[i]);
    }
    x
}

/// Cyclic tridiagonal solve by the Sherman-Morrison correction.
///
/// `lower[0]` is the top-right corner and `upper[n − 1]` the bottom-left
/// corner of the matrix. Requires `n ≥ 3`.
fn solve_cyclic(lower: &[f64], diagonal: &[f64], upper: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diagonal.len();
    let alpha = upper[n - 1];
    let beta = lower[0];
    let gamma = -diagonal[0];

    let mut modified = diagonal.to_vec();
    modified[0] = diagonal[0] - gamma;
    modified[n - 1] = diagonal[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(lower, &modified, upper, rhs);
    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(lower, &modified, upper, &u);

    let factor = (beta * x[n - 1] / gamma + x[0]) / (1.0 + z[0] + beta * z[n - 1] / gamma);
    x.iter().zip(&z).map(|(xi, zi)| factor.mul_add(-zi, *xi)).collect()
}
