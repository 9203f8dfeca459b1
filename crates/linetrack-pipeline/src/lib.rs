//! linetrack-pipeline: Procedural line follower track geometry (sans-IO).
//!
//! Builds the ground texture of a line follower arena through:
//! seed points -> closed spline fit -> dense resampling -> start/stop
//! line -> rasterization. Grid tracks replace the first two steps with
//! waypoint scaling and corner planning.
//!
//! This crate has **no I/O dependencies**: it returns in-memory images
//! and geometry. Writing files lives in the `linetrack` binary.

pub mod arc;
pub mod grid;
pub mod marker;
pub mod raster;
pub mod shape;
pub mod spline;
pub mod types;

use rand::Rng;

pub use arc::{ArcSpec, Heading, PathElement, Quadrant};
pub use grid::{GridWaypoint, parse_grid};
pub use marker::{StartStopLine, start_stop_line};
pub use raster::TrackDrawing;
pub use shape::{LetterShape, TrackShape};
pub use spline::{ParametricCurve, SplineCurve};
pub use types::{
    Color, Dimensions, Point, Polyline, RenderStyle, RgbaImage, TrackConfig, TrackError, Vector,
};

/// A rendered track and the geometry it was drawn from.
#[derive(Debug, Clone)]
pub struct TrackImage {
    /// The ground texture.
    pub image: RgbaImage,
    /// Paths, start/stop lines and seed points that were drawn.
    pub drawing: TrackDrawing,
}

/// Build a closed track of the given shape.
///
/// # Pipeline steps
///
/// 1. Seed points (raised to the shape's minimum count, jittered with
///    `rng`)
/// 2. Periodic spline fit
/// 3. Resampling to ten points per seed point
/// 4. Start/stop line at the shape's curve parameter
/// 5. Rasterization
///
/// # Errors
///
/// Returns [`TrackError::InvalidConfig`] for an invalid `config` and the
/// curve fitting errors of [`spline::fit_closed`] for degenerate seeds.
pub fn generate_shape_track<R: Rng + ?Sized>(
    shape: &TrackShape,
    num_points: usize,
    config: &TrackConfig,
    rng: &mut R,
) -> Result<TrackImage, TrackError> {
    config.validate()?;

    // 1. Seed points.
    let seeds = shape.generate(num_points, config.dimensions, rng)?;

    // 2-3. Fit and resample.
    let (curve, dense) = spline::fit_and_resample(&seeds)?;

    // 4. Start/stop line.
    let marker = start_stop_line(
        &curve,
        shape.start_stop_location(),
        config.start_stop_distance_px(),
        config.start_stop_length_px(),
    )?;

    // 5. Rasterize.
    let drawing = TrackDrawing {
        paths: vec![dense],
        markers: vec![marker],
        seed_points: seeds.into_points(),
    };
    let image = raster::render(&drawing, config)?;
    Ok(TrackImage { image, drawing })
}

/// Build a track from grid waypoints spaced `point_distance` meters
/// apart.
///
/// Start/stop lines are placed on the flagged waypoints, crossing the
/// element that ends there (or, for the first waypoint, the element
/// that starts there).
///
/// # Errors
///
/// Returns [`TrackError::TooFewWaypoints`] with fewer than two
/// waypoints, [`TrackError::InvalidConfig`] for an invalid `config`, and
/// curve fitting errors for degenerate elements under a start/stop line.
pub fn generate_grid_track(
    waypoints: &[GridWaypoint],
    point_distance: f64,
    config: &TrackConfig,
) -> Result<TrackImage, TrackError> {
    grid::check_waypoint_count(waypoints)?;
    config.validate()?;

    let spacing = point_distance * config.pixels_per_meter;
    let points = grid::scale_waypoints(waypoints, spacing, config.dimensions);
    let elements = arc::plan(&points);
    let paths: Vec<Polyline> = elements.iter().map(PathElement::polyline).collect();

    let mut markers = Vec::new();
    for (index, waypoint) in waypoints.iter().enumerate() {
        if !waypoint.start_stop_line {
            continue;
        }
        let target = points[index];
        let candidates = [index.checked_sub(1), Some(index)];
        let Some(path) = candidates
            .into_iter()
            .flatten()
            .filter_map(|i| paths.get(i))
            .find(|path| !path.is_empty())
        else {
            tracing::warn!(index, "no drawn element at start/stop waypoint");
            continue;
        };
        markers.push(marker_at_waypoint(path, target, config)?);
    }

    tracing::debug!(
        waypoints = waypoints.len(),
        elements = elements.len(),
        markers = markers.len(),
        "planned grid track"
    );

    let drawing = TrackDrawing {
        paths,
        markers,
        seed_points: points,
    };
    let image = raster::render(&drawing, config)?;
    Ok(TrackImage { image, drawing })
}

/// Start/stop line across `path` at whichever end lies on `target`.
fn marker_at_waypoint(
    path: &Polyline,
    target: Point,
    config: &TrackConfig,
) -> Result<StartStopLine, TrackError> {
    let curve = spline::fit_open(path.points())?;
    let at_start = match (path.first(), path.last()) {
        (Some(first), Some(last)) => first.distance(target) <= last.distance(target),
        _ => true,
    };
    let u = if at_start { 0.0 } else { 1.0 };
    start_stop_line(
        &curve,
        u,
        config.start_stop_distance_px(),
        config.start_stop_length_px(),
    )
}
