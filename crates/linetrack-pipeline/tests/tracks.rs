//! End-to-end track builds.

#![allow(clippy::unwrap_used)]

use image::Rgba;
use linetrack_pipeline::{
    Dimensions, GridWaypoint, LetterShape, ParametricCurve, PathElement, Polyline, RgbaImage,
    TrackConfig, TrackDrawing, TrackError, TrackShape, generate_grid_track, generate_shape_track,
    parse_grid, raster, shape, spline,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::rngs::mock::StepRng;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Number of 4-connected components of non-background pixels.
fn ink_components(img: &RgbaImage) -> usize {
    let (w, h) = img.dimensions();
    let mut seen = vec![false; (w * h) as usize];
    let mut components = 0;
    for start in 0..w * h {
        if seen[start as usize] || *img.get_pixel(start % w, start / w) == WHITE {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        seen[start as usize] = true;
        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx >= w || ny >= h {
                    continue;
                }
                let j = ny * w + nx;
                if !seen[j as usize] && *img.get_pixel(nx, ny) != WHITE {
                    seen[j as usize] = true;
                    stack.push(j);
                }
            }
        }
    }
    components
}

#[test]
fn rectangle_track_is_one_closed_curve() {
    let config = TrackConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let track = generate_shape_track(&TrackShape::Rectangle, 20, &config, &mut rng).unwrap();

    let seeds = Polyline::new(track.drawing.seed_points.clone());
    assert!(seeds.is_closed());
    assert!(seeds.len() > 20);
    assert_eq!(track.drawing.paths[0].len(), seeds.len() * spline::RESAMPLE_FACTOR);

    // The curve alone renders as a single connected shape on white.
    let curve_only = TrackDrawing {
        paths: track.drawing.paths.clone(),
        ..TrackDrawing::default()
    };
    let img = raster::render(&curve_only, &config).unwrap();
    assert_eq!(ink_components(&img), 1);
    assert_eq!(*img.get_pixel(0, 0), WHITE);
    assert_eq!(*img.get_pixel(512, 512), WHITE);
}

#[test]
fn rectangle_nominal_points_are_inside_margin() {
    // With a zero random source jitter only moves points below their
    // nominal coordinate, so the upper bound is the nominal bound.
    let mut rng = StepRng::new(0, 0);
    let seeds = shape::rectangle_points(20, Dimensions::square(1024), &mut rng).unwrap();
    for p in seeds.points() {
        assert!(p.x <= 921.6 + 1e-9 && p.y <= 921.6 + 1e-9, "{p:?}");
    }
}

#[test]
fn below_minimum_request_is_clamped() {
    let config = TrackConfig::default();
    let mut rng = StdRng::seed_from_u64(2);
    let track = generate_shape_track(&TrackShape::Rectangle, 5, &config, &mut rng).unwrap();
    assert!(track.drawing.seed_points.len() - 1 >= 20);
}

#[test]
fn e_track_at_minimum_builds() {
    let config = TrackConfig::for_arena(1024, 2.0, 0.015, false);
    let mut rng = StdRng::seed_from_u64(3);
    let shape = TrackShape::Letter(LetterShape::E);
    let track = generate_shape_track(&shape, 30, &config, &mut rng).unwrap();
    assert!(track.drawing.seed_points.len() - 1 >= 30);
    assert_eq!(track.drawing.markers.len(), 1);
}

#[test]
fn closed_tracks_have_regular_curves() {
    let shapes = [
        TrackShape::Rectangle,
        TrackShape::Letter(LetterShape::E),
        TrackShape::Letter(LetterShape::C),
    ];
    for (seed, shape) in shapes.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let seeds = shape
            .generate(shape.min_points(), Dimensions::square(1024), &mut rng)
            .unwrap();
        let curve = spline::fit_closed(seeds.points()).unwrap();
        for k in 0..=2000 {
            let u = f64::from(k) / 2000.0;
            assert!(curve.tangent_at(u).length() > 0.0, "{shape:?} u={u}");
        }
    }
}

#[test]
fn marker_segments_are_symmetric_on_track() {
    let config = TrackConfig::default();
    let mut rng = StdRng::seed_from_u64(4);
    let track = generate_shape_track(&TrackShape::Rectangle, 24, &config, &mut rng).unwrap();
    let marker = track.drawing.markers[0];

    let mid_low = marker.low[0].midpoint(marker.low[1]);
    let mid_high = marker.high[0].midpoint(marker.high[1]);
    let seeds = Polyline::new(track.drawing.seed_points);
    let curve = spline::fit_closed(seeds.points()).unwrap();
    let center = curve.point_at(shape::RECTANGLE_START_STOP_LOCATION);
    assert!(mid_low.midpoint(mid_high).distance(center) < 1e-9);
}

#[test]
fn same_seed_gives_same_image() {
    let config = TrackConfig::for_arena(256, 1.0, 0.015, true);
    let a = generate_shape_track(&TrackShape::Rectangle, 20, &config, &mut StdRng::seed_from_u64(9))
        .unwrap();
    let b = generate_shape_track(&TrackShape::Rectangle, 20, &config, &mut StdRng::seed_from_u64(9))
        .unwrap();
    assert_eq!(a.image, b.image);
}

#[test]
fn grid_square_with_one_diagonal_corner() {
    let json = r#"{"track": [
        {"x": 0, "y": 2, "startStopLine": true},
        {"x": 1, "y": 2},
        {"x": 2, "y": 1},
        {"x": 2, "y": 0},
        {"x": 0, "y": 0}
    ]}"#;
    let waypoints = parse_grid(json).unwrap();
    let config = TrackConfig::for_arena(2048, 1.0, 0.015, false);
    let track = generate_grid_track(&waypoints, 0.1, &config).unwrap();

    assert_eq!(track.drawing.paths.len(), 4);
    let arcs = track
        .drawing
        .paths
        .iter()
        .filter(|p| p.len() == linetrack_pipeline::arc::ARC_SAMPLES)
        .count();
    assert_eq!(arcs, 1);
    assert_eq!(track.drawing.paths.iter().filter(|p| p.len() == 2).count(), 3);

    // The first waypoint's start/stop line crosses the first line, which
    // runs along x, so the marker runs along y.
    assert_eq!(track.drawing.markers.len(), 1);
    let marker = track.drawing.markers[0];
    assert!((marker.low[0].x - marker.low[1].x).abs() < 1e-9);
    assert!((marker.high[0].x - 409.6).abs() < 1e-9);
}

#[test]
fn grid_marker_at_arc_end() {
    let waypoints = [
        GridWaypoint::new(0, 0),
        GridWaypoint::new(1, 0),
        GridWaypoint {
            start_stop_line: true,
            ..GridWaypoint::new(2, 1)
        },
    ];
    let config = TrackConfig::for_arena(512, 1.0, 0.015, false);
    let track = generate_grid_track(&waypoints, 0.1, &config).unwrap();
    let marker = track.drawing.markers[0];

    // The arc ends heading north at the flagged waypoint: the marker is
    // horizontal and centered on it.
    let target = linetrack_pipeline::grid::scale_waypoints(&waypoints, 51.2, config.dimensions)[2];
    let center = marker.low[0].midpoint(marker.high[0]);
    assert!(center.distance(target) < 1e-6, "{center:?} {target:?}");
    let run = marker.low[1].x - marker.low[0].x;
    let rise = marker.low[1].y - marker.low[0].y;
    assert!(rise.abs() < 0.05 * run.abs(), "{marker:?}");
}

#[test]
fn grid_table_miss_draws_nothing_for_that_step() {
    // Heading east, then a step up-left: not a realizable corner.
    let waypoints = [
        GridWaypoint::new(0, 0),
        GridWaypoint::new(2, 0),
        GridWaypoint::new(1, 1),
    ];
    let config = TrackConfig::for_arena(256, 1.0, 0.015, false);
    let track = generate_grid_track(&waypoints, 0.1, &config).unwrap();
    assert_eq!(track.drawing.paths.len(), 2);
    assert!(track.drawing.paths[1].is_empty());
    let planned = linetrack_pipeline::arc::plan(&track.drawing.seed_points);
    assert!(matches!(planned[1], PathElement::Arc(arc) if arc.sweep().abs() < f64::EPSILON));
}

#[test]
fn grid_marker_on_repeated_waypoint_uses_next_element() {
    // The flagged waypoint repeats the previous one, so the step into it
    // has no length and the marker sits on the step out of it.
    let waypoints = [
        GridWaypoint::new(0, 0),
        GridWaypoint::new(2, 0),
        GridWaypoint {
            start_stop_line: true,
            ..GridWaypoint::new(2, 0)
        },
        GridWaypoint::new(2, 2),
    ];
    let config = TrackConfig::for_arena(256, 1.0, 0.015, false);
    let track = generate_grid_track(&waypoints, 0.1, &config).unwrap();
    assert!(track.drawing.paths[1].is_empty());
    assert_eq!(track.drawing.markers.len(), 1);

    let marker = track.drawing.markers[0];
    let target = linetrack_pipeline::grid::scale_waypoints(&waypoints, 25.6, config.dimensions)[2];
    let center = marker.low[0].midpoint(marker.high[0]);
    assert!(center.distance(target) < 1e-6, "{center:?} {target:?}");
}

#[test]
fn empty_grid_is_rejected() {
    let waypoints = parse_grid(r#"{"track": []}"#).unwrap();
    let config = TrackConfig::for_arena(2048, 1.0, 0.015, false);
    assert!(matches!(
        generate_grid_track(&waypoints, 0.1, &config),
        Err(TrackError::TooFewWaypoints {
            required: 2,
            actual: 0
        })
    ));
}
