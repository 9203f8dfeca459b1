//! Track rasterization.
//!
//! Uses tiny-skia for anti-aliased path stroking. One canvas unit maps
//! to one pixel and the canvas y axis is flipped so `y = 0` is the bottom
//! row of the image.

use image::Rgba;
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::marker::StartStopLine;
use crate::types::{Color, Dimensions, Point, Polyline, RgbaImage, TrackConfig, TrackError};

/// Radius of a debug seed point dot, in pixels.
const SEED_POINT_RADIUS: f32 = 4.0;

/// Everything drawn onto the ground texture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDrawing {
    /// Track line paths, stroked in order.
    pub paths: Vec<Polyline>,
    /// Start/stop lines.
    pub markers: Vec<StartStopLine>,
    /// Seed points, drawn only in debug mode.
    pub seed_points: Vec<Point>,
}

/// Render `drawing` with the colors, line width and debug flag of
/// `config`.
///
/// # Errors
///
/// Returns [`TrackError::InvalidConfig`] for empty dimensions or a
/// non-positive line width.
pub fn render(drawing: &TrackDrawing, config: &TrackConfig) -> Result<RgbaImage, TrackError> {
    config.validate()?;
    let Dimensions { width, height } = config.dimensions;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        TrackError::InvalidConfig(format!("cannot allocate a {width}x{height} canvas"))
    })?;
    pixmap.fill(skia_color(config.style.background));

    #[allow(clippy::cast_precision_loss)]
    let flip = Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, height as f32);

    #[allow(clippy::cast_possible_truncation)]
    let stroke = Stroke {
        width: config.line_width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let line_paint = paint(config.style.line);
    for polyline in &drawing.paths {
        if let Some(path) = build_path(polyline.points(), config.dimensions) {
            pixmap.stroke_path(&path, &line_paint, &stroke, flip, None);
        }
    }

    let marker_paint = if config.debug {
        paint(config.style.debug_marker)
    } else {
        line_paint.clone()
    };
    for marker in &drawing.markers {
        for segment in marker.segments() {
            if let Some(path) = build_path(&segment, config.dimensions) {
                pixmap.stroke_path(&path, &marker_paint, &stroke, flip, None);
            }
        }
    }

    if config.debug {
        let seed_paint = paint(config.style.seed_point);
        for &point in &drawing.seed_points {
            let (x, y) = clamp(point, config.dimensions);
            if let Some(dot) = PathBuilder::from_circle(x, y, SEED_POINT_RADIUS) {
                pixmap.fill_path(&dot, &seed_paint, FillRule::Winding, flip, None);
            }
        }
    }

    tracing::debug!(
        width,
        height,
        paths = drawing.paths.len(),
        markers = drawing.markers.len(),
        "rendered track"
    );
    Ok(to_rgba_image(&pixmap))
}

fn build_path(points: &[Point], dimensions: Dimensions) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    let (x, y) = clamp(*first, dimensions);
    pb.move_to(x, y);
    for &p in rest {
        let (x, y) = clamp(p, dimensions);
        pb.line_to(x, y);
    }
    pb.finish()
}

/// Clamp a point into `[0, width) × [0, height)`.
#[allow(clippy::cast_possible_truncation)]
fn clamp(point: Point, dimensions: Dimensions) -> (f32, f32) {
    let max_x = f64::from(dimensions.width).next_down();
    let max_y = f64::from(dimensions.height).next_down();
    (
        point.x.clamp(0.0, max_x) as f32,
        point.y.clamp(0.0, max_y) as f32,
    )
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, 255)
}

/// Convert the premultiplied pixmap to a straight-alpha image.
fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, source) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = source.demultiply();
        *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn config(size: u32, line_width: f64, debug: bool) -> TrackConfig {
        TrackConfig {
            dimensions: Dimensions::square(size),
            line_width,
            debug,
            ..TrackConfig::default()
        }
    }

    fn horizontal(y: f64, from: f64, to: f64) -> Polyline {
        Polyline::new(vec![Point::new(from, y), Point::new(to, y)])
    }

    #[test]
    fn empty_drawing_is_background_only() {
        let img = render(&TrackDrawing::default(), &config(32, 3.0, false)).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn line_is_drawn_with_y_up() {
        // A line near the canvas bottom lands in the last image rows.
        let drawing = TrackDrawing {
            paths: vec![horizontal(10.0, 10.0, 90.0)],
            ..TrackDrawing::default()
        };
        let img = render(&drawing, &config(100, 6.0, false)).unwrap();
        assert_eq!(*img.get_pixel(50, 89), BLACK);
        assert_eq!(*img.get_pixel(50, 10), WHITE);
    }

    #[test]
    fn out_of_range_points_are_clamped() {
        let drawing = TrackDrawing {
            paths: vec![horizontal(-50.0, -100.0, 500.0)],
            ..TrackDrawing::default()
        };
        let img = render(&drawing, &config(64, 4.0, false)).unwrap();
        // Clamped onto the bottom edge.
        assert_eq!(*img.get_pixel(32, 63), BLACK);
        assert_eq!(*img.get_pixel(32, 0), WHITE);
    }

    #[test]
    fn markers_use_debug_color_only_in_debug() {
        let marker = StartStopLine {
            low: [Point::new(20.0, 50.0), Point::new(40.0, 50.0)],
            high: [Point::new(60.0, 50.0), Point::new(80.0, 50.0)],
        };
        let drawing = TrackDrawing {
            markers: vec![marker],
            ..TrackDrawing::default()
        };

        let plain = render(&drawing, &config(100, 4.0, false)).unwrap();
        assert_eq!(*plain.get_pixel(30, 50), BLACK);
        assert_eq!(*plain.get_pixel(50, 50), WHITE);

        let debug = render(&drawing, &config(100, 4.0, true)).unwrap();
        assert_eq!(*debug.get_pixel(30, 50), Rgba([255, 165, 0, 255]));
    }

    #[test]
    fn seed_points_only_in_debug() {
        let drawing = TrackDrawing {
            seed_points: vec![Point::new(50.0, 50.0)],
            ..TrackDrawing::default()
        };
        let plain = render(&drawing, &config(100, 4.0, false)).unwrap();
        assert_eq!(*plain.get_pixel(50, 50), WHITE);

        let debug = render(&drawing, &config(100, 4.0, true)).unwrap();
        assert_eq!(*debug.get_pixel(50, 50), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn zero_line_width_is_rejected() {
        let drawing = TrackDrawing {
            paths: vec![horizontal(5.0, 1.0, 9.0)],
            ..TrackDrawing::default()
        };
        assert!(matches!(
            render(&drawing, &config(16, 0.0, false)),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        let drawing = TrackDrawing {
            paths: vec![Polyline::new(vec![
                Point::new(10.0, 10.0),
                Point::new(50.0, 80.0),
                Point::new(90.0, 20.0),
            ])],
            ..TrackDrawing::default()
        };
        let a = render(&drawing, &config(100, 5.0, false)).unwrap();
        let b = render(&drawing, &config(100, 5.0, false)).unwrap();
        assert_eq!(a, b);
    }
}
