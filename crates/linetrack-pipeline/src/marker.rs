//! Start/stop line placement.

use serde::{Deserialize, Serialize};

use crate::spline::ParametricCurve;
use crate::types::{Point, TrackError, Vector};

/// Tangents shorter than this are treated as a stationary curve.
const MIN_TANGENT_LENGTH: f64 = 1e-9;

/// A start/stop line split into two segments, one on each side of the
/// track, leaving a gap over the track line itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartStopLine {
    /// Segment on the `−normal` side, inner end first.
    pub low: [Point; 2],
    /// Segment on the `+normal` side, inner end first.
    pub high: [Point; 2],
}

impl StartStopLine {
    /// Both segments, `low` first.
    #[must_use]
    pub const fn segments(&self) -> [[Point; 2]; 2] {
        [self.low, self.high]
    }
}

/// Build the start/stop line crossing `curve` at parameter `u`.
///
/// Each segment starts `distance_from_middle` away from the curve point
/// along the unit normal and extends `length` further outwards.
///
/// # Errors
///
/// Returns [`TrackError::StationaryCurve`] if the tangent at `u` has no
/// direction.
pub fn start_stop_line<C: ParametricCurve + ?Sized>(
    curve: &C,
    u: f64,
    distance_from_middle: f64,
    length: f64,
) -> Result<StartStopLine, TrackError> {
    let center = curve.point_at(u);
    let tangent = curve.tangent_at(u);
    let magnitude = tangent.length();
    if !magnitude.is_finite() || magnitude < MIN_TANGENT_LENGTH {
        return Err(TrackError::StationaryCurve { u });
    }

    let normal = tangent.perpendicular();
    let normal = Vector::new(normal.x / magnitude, normal.y / magnitude);
    let outer = distance_from_middle + length;

    tracing::debug!(u, x = center.x, y = center.y, "start/stop line");
    Ok(StartStopLine {
        low: [
            center.offset(normal, -distance_from_middle),
            center.offset(normal, -outer),
        ],
        high: [
            center.offset(normal, distance_from_middle),
            center.offset(normal, outer),
        ],
    })
}
