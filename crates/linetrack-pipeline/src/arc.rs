//! Corner planning for grid tracks.
//!
//! A grid track is a list of waypoints. Axis-aligned steps become
//! straight lines; diagonal steps become quarter-circle arcs whose
//! orientation depends on the direction the track is currently heading.
//! The heading is threaded through the waypoint pairs by [`plan`].

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::types::{Point, Polyline};

/// Points per drawn arc.
pub const ARC_SAMPLES: usize = 100;

/// Offsets smaller than this count as zero when classifying a step.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Cardinal direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// Unit vector of the heading.
    #[must_use]
    pub const fn unit(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Heading of an axis-aligned sign pair; `None` for `(0, 0)` and
    /// diagonals.
    #[must_use]
    pub const fn from_signs(sx: i8, sy: i8) -> Option<Self> {
        match (sx, sy) {
            (0, 1) => Some(Self::North),
            (0, -1) => Some(Self::South),
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Quadrant of a diagonal displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// `+x, +y`
    First,
    /// `−x, +y`
    Second,
    /// `−x, −y`
    Third,
    /// `+x, −y`
    Fourth,
}

impl Quadrant {
    const fn from_positive(x: bool, y: bool) -> Self {
        match (x, y) {
            (true, true) => Self::First,
            (false, true) => Self::Second,
            (false, false) => Self::Third,
            (true, false) => Self::Fourth,
        }
    }
}

/// Which waypoint of a step supplies a coordinate of the arc center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CenterSource {
    Start,
    End,
}

impl CenterSource {
    const fn pick(self, start: f64, end: f64) -> f64 {
        match self {
            Self::Start => start,
            Self::End => end,
        }
    }
}

/// A realizable corner: sweep angles, the heading after the corner and
/// where the center comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub angle_start: f64,
    pub angle_end: f64,
    pub heading: Heading,
    pub center_x: CenterSource,
    pub center_y: CenterSource,
}

/// Look up the corner for a diagonal step in `quadrant` while travelling
/// `heading`.
///
/// Returns `None` when the corner would require reversing or turning
/// through more than a quarter circle.
#[must_use]
pub fn turn(heading: Heading, quadrant: Quadrant) -> Option<Turn> {
    use CenterSource::{End, Start};
    use Heading::{East, North, South, West};
    use Quadrant::{First, Fourth, Second, Third};

    let (angle_start, angle_end, heading, center_x, center_y) = match (heading, quadrant) {
        (North, First) => (FRAC_PI_2, PI, East, End, Start),
        (East, First) => (3.0 * FRAC_PI_2, 2.0 * PI, North, Start, End),
        (North, Second) => (0.0, FRAC_PI_2, West, End, Start),
        (West, Second) => (PI, 3.0 * FRAC_PI_2, North, Start, End),
        (West, Third) => (FRAC_PI_2, PI, South, Start, End),
        (South, Third) => (3.0 * FRAC_PI_2, 2.0 * PI, West, End, Start),
        (South, Fourth) => (PI, 3.0 * FRAC_PI_2, East, End, Start),
        (East, Fourth) => (0.0, FRAC_PI_2, South, Start, End),
        _ => return None,
    };
    Some(Turn {
        angle_start,
        angle_end,
        heading,
        center_x,
        center_y,
    })
}

/// A circular arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub center: Point,
    pub radius: f64,
    pub angle_start: f64,
    pub angle_end: f64,
}

impl ArcSpec {
    /// Signed sweep angle.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.angle_end - self.angle_start
    }

    /// Point on the circle at `angle`.
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(
            self.radius.mul_add(cos, self.center.x),
            self.radius.mul_add(sin, self.center.y),
        )
    }

    /// `count` points from `angle_start` to `angle_end` inclusive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, count: usize) -> Polyline {
        if count < 2 {
            return Polyline::new(
                (0..count).map(|_| self.point_at_angle(self.angle_start)).collect(),
            );
        }
        let last = (count - 1) as f64;
        Polyline::new(
            (0..count)
                .map(|k| {
                    let angle = (k as f64 / last).mul_add(self.sweep(), self.angle_start);
                    self.point_at_angle(angle)
                })
                .collect(),
        )
    }
}

/// One drawn piece of a grid track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathElement {
    Line { start: Point, end: Point },
    Arc(ArcSpec),
}

impl PathElement {
    /// Returns `true` for a line without length or an arc without sweep.
    /// Neither draws anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Line { start, end } => start.distance(*end) <= AXIS_TOLERANCE,
            Self::Arc(arc) => arc.sweep().abs() <= f64::EPSILON,
        }
    }

    /// Points to stroke for this element.
    #[must_use]
    pub fn polyline(&self) -> Polyline {
        match self {
            _ if self.is_empty() => Polyline::default(),
            Self::Line { start, end } => Polyline::new(vec![*start, *end]),
            Self::Arc(arc) => arc.sample(ARC_SAMPLES),
        }
    }
}

fn sign(value: f64) -> i8 {
    if value > AXIS_TOLERANCE {
        1
    } else if value < -AXIS_TOLERANCE {
        -1
    } else {
        0
    }
}

/// Plan the element between two consecutive waypoints.
///
/// Axis-aligned steps produce a line and set the heading to the step's
/// direction (a zero-length step keeps it). Diagonal steps produce a
/// quarter arc of radius `|dx|`; a corner missing from the turn table
/// produces an arc with zero sweep and keeps the heading.
#[must_use]
pub fn step(heading: Heading, start: Point, end: Point) -> (Heading, PathElement) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (sx, sy) = (sign(dx), sign(dy));

    if sx == 0 || sy == 0 {
        let next = Heading::from_signs(sx, sy).unwrap_or(heading);
        return (next, PathElement::Line { start, end });
    }

    let radius = dx.abs();
    if (dx.abs() - dy.abs()).abs() > AXIS_TOLERANCE {
        tracing::warn!(dx, dy, "diagonal step is not square, using |dx| as radius");
    }

    let quadrant = Quadrant::from_positive(sx > 0, sy > 0);
    match turn(heading, quadrant) {
        Some(turn) => (
            turn.heading,
            PathElement::Arc(ArcSpec {
                center: Point::new(
                    turn.center_x.pick(start.x, end.x),
                    turn.center_y.pick(start.y, end.y),
                ),
                radius,
                angle_start: turn.angle_start,
                angle_end: turn.angle_end,
            }),
        ),
        None => {
            tracing::warn!(
                ?heading,
                ?quadrant,
                x = end.x,
                y = end.y,
                "no corner for this heading, skipping arc"
            );
            (
                heading,
                PathElement::Arc(ArcSpec {
                    center: end,
                    radius,
                    angle_start: 0.0,
                    angle_end: 0.0,
                }),
            )
        }
    }
}

/// Plan every element of a grid track, starting heading east.
#[must_use]
pub fn plan(points: &[Point]) -> Vec<PathElement> {
    points
        .windows(2)
        .scan(Heading::East, |heading, pair| {
            let (next, element) = step(*heading, pair[0], pair[1]);
            *heading = next;
            Some(element)
        })
        .collect()
}
