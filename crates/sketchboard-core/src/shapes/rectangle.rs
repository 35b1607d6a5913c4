//! Rectangle and rounded rectangle outlines.

use super::{AnchorBox, clamp_number};
use kurbo::Point;
use std::f64::consts::{FRAC_PI_2, PI};

/// Samples per rounded corner, end points included.
const CORNER_ARC_SAMPLES: usize = 8;
/// Corner radius as a fraction of the shorter side.
const CORNER_RADIUS_RATIO: f64 = 0.2;
const CORNER_RADIUS_MIN: f64 = 4.0;

/// Closed axis-aligned rectangle, clockwise from the top-left corner.
pub fn rectangle_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    vec![
        Point::new(b.min_x, b.min_y),
        Point::new(b.max_x, b.min_y),
        Point::new(b.max_x, b.max_y),
        Point::new(b.min_x, b.max_y),
        Point::new(b.min_x, b.min_y),
    ]
}

/// Rectangle whose corners are replaced by sampled quarter arcs.
pub fn rounded_rectangle_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let (width, height) = (b.width(), b.height());
    let short_side = width.min(height);
    let radius = clamp_number(short_side * CORNER_RADIUS_RATIO, CORNER_RADIUS_MIN, short_side / 2.0);
    let rx = radius.min(width / 2.0);
    let ry = radius.min(height / 2.0);

    let mut points = Vec::with_capacity(4 * CORNER_ARC_SAMPLES + 5);
    points.push(Point::new(b.min_x + rx, b.min_y));
    points.push(Point::new(b.max_x - rx, b.min_y));
    push_arc(&mut points, Point::new(b.max_x - rx, b.min_y + ry), rx, ry, -FRAC_PI_2, 0.0);
    points.push(Point::new(b.max_x, b.max_y - ry));
    push_arc(&mut points, Point::new(b.max_x - rx, b.max_y - ry), rx, ry, 0.0, FRAC_PI_2);
    points.push(Point::new(b.min_x + rx, b.max_y));
    push_arc(&mut points, Point::new(b.min_x + rx, b.max_y - ry), rx, ry, FRAC_PI_2, PI);
    points.push(Point::new(b.min_x, b.min_y + ry));
    push_arc(&mut points, Point::new(b.min_x + rx, b.min_y + ry), rx, ry, PI, 1.5 * PI);
    points.push(Point::new(b.min_x + rx, b.min_y));
    points
}

fn push_arc(points: &mut Vec<Point>, center: Point, rx: f64, ry: f64, from: f64, to: f64) {
    let steps = (CORNER_ARC_SAMPLES - 1) as f64;
    for i in 0..CORNER_ARC_SAMPLES {
        let angle = from + (to - from) * (i as f64 / steps);
        points.push(Point::new(center.x + angle.cos() * rx, center.y + angle.sin() * ry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_scenario() {
        let points = rectangle_points(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(0.0, 50.0),
                Point::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_rectangle_normalizes_drag_direction() {
        let a = rectangle_points(Point::new(100.0, 50.0), Point::new(0.0, 0.0));
        let b = rectangle_points(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_rounded_rectangle_stays_in_box() {
        let points = rounded_rectangle_points(Point::new(0.0, 0.0), Point::new(100.0, 60.0));
        assert_eq!(points.len(), 4 * CORNER_ARC_SAMPLES + 5);
        for p in &points {
            assert!(p.x >= -1e-9 && p.x <= 100.0 + 1e-9);
            assert!(p.y >= -1e-9 && p.y <= 60.0 + 1e-9);
        }
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn test_rounded_rectangle_corner_radius() {
        let points = rounded_rectangle_points(Point::new(0.0, 0.0), Point::new(100.0, 60.0));
        // Radius is 20% of the short side: 12.
        assert!((points[0].x - 12.0).abs() < 1e-9);
        assert!((points[1].x - 88.0).abs() < 1e-9);
    }
}
