//! Grid track definitions.
//!
//! A grid file lists integer waypoints under a `track` key:
//!
//! ```json
//! {"track": [{"x": 0, "y": 0, "startStopLine": true}, {"x": 3, "y": 0}]}
//! ```
//!
//! Waypoints are spaced `point_distance` meters apart and offset from the
//! bottom-left corner of the image by a 20% border.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, Point, TrackError};

/// Fewest waypoints a grid track needs.
pub const GRID_MIN_POINTS: usize = 2;

const BORDER_FRACTION: f64 = 0.2;

/// One waypoint of a grid track, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWaypoint {
    pub x: i64,
    pub y: i64,
    /// A start/stop line is drawn at this waypoint.
    pub start_stop_line: bool,
}

impl GridWaypoint {
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            start_stop_line: false,
        }
    }
}

#[derive(Deserialize)]
struct GridFile {
    #[serde(default)]
    track: Vec<RawWaypoint>,
}

#[derive(Deserialize)]
struct RawWaypoint {
    x: i64,
    y: i64,
    #[serde(default, rename = "startStopLine")]
    start_stop_line: Option<serde_json::Value>,
}

impl From<RawWaypoint> for GridWaypoint {
    fn from(raw: RawWaypoint) -> Self {
        // Presence of the key marks the waypoint unless it is false or null.
        let start_stop_line = !matches!(
            raw.start_stop_line,
            None | Some(serde_json::Value::Bool(false) | serde_json::Value::Null)
        );
        Self {
            x: raw.x,
            y: raw.y,
            start_stop_line,
        }
    }
}

/// Parse a grid definition.
///
/// A document without a `track` key yields an empty list.
///
/// # Errors
///
/// Returns [`TrackError::GridFormat`] if the text is not a valid grid
/// document.
pub fn parse_grid(json: &str) -> Result<Vec<GridWaypoint>, TrackError> {
    let file: GridFile = serde_json::from_str(json)?;
    Ok(file.track.into_iter().map(GridWaypoint::from).collect())
}

/// Fail unless there are enough waypoints to draw anything.
///
/// # Errors
///
/// Returns [`TrackError::TooFewWaypoints`] below [`GRID_MIN_POINTS`].
pub fn check_waypoint_count(waypoints: &[GridWaypoint]) -> Result<(), TrackError> {
    if waypoints.len() < GRID_MIN_POINTS {
        return Err(TrackError::TooFewWaypoints {
            required: GRID_MIN_POINTS,
            actual: waypoints.len(),
        });
    }
    Ok(())
}

/// Convert waypoints to canvas points.
///
/// `spacing` is the distance between neighbouring grid positions in
/// pixels.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scale_waypoints(waypoints: &[GridWaypoint], spacing: f64, dimensions: Dimensions) -> Vec<Point> {
    let border_x = f64::from(dimensions.width) * BORDER_FRACTION;
    let border_y = f64::from(dimensions.height) * BORDER_FRACTION;
    waypoints
        .iter()
        .map(|wp| {
            Point::new(
                (wp.x as f64).mul_add(spacing, border_x),
                (wp.y as f64).mul_add(spacing, border_y),
            )
        })
        .collect()
}
