//! Line and arrow outlines.

use super::clamp_number;
use kurbo::{Point, Vec2};

/// Arrowhead length as a fraction of the shaft length.
const HEAD_LENGTH_RATIO: f64 = 0.2;
const HEAD_LENGTH_MIN: f64 = 10.0;
const HEAD_LENGTH_MAX: f64 = 32.0;
/// Arrowhead half-width as a fraction of the head length.
const HEAD_WIDTH_RATIO: f64 = 0.6;

/// Straight segment between the anchors. Also used for freeform seeds.
pub fn line_points(start: Point, end: Point) -> Vec<Point> {
    vec![start, end]
}

/// Shaft plus a V-shaped head.
///
/// Point order is `start, end, left, end, right`: the head is stroked as two
/// barbs that both return to the tip.
pub fn arrow_points(start: Point, end: Point) -> Vec<Point> {
    let shaft = end - start;
    let length = match shaft.hypot() {
        l if l > 0.0 => l,
        _ => 1.0,
    };
    let head_length = clamp_number(length * HEAD_LENGTH_RATIO, HEAD_LENGTH_MIN, HEAD_LENGTH_MAX);
    let head_width = head_length * HEAD_WIDTH_RATIO;

    let unit = shaft / length;
    let base = end - unit * head_length;
    let normal = Vec2::new(-unit.y, unit.x);

    vec![
        start,
        end,
        base + normal * head_width,
        end,
        base - normal * head_width,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line() {
        let points = line_points(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_arrow_head_geometry() {
        let points = arrow_points(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(points.len(), 5);
        // Head length 20, half width 12.
        assert!((points[2].x - 80.0).abs() < 1e-9);
        assert!((points[2].y - 12.0).abs() < 1e-9);
        assert!((points[4].x - 80.0).abs() < 1e-9);
        assert!((points[4].y + 12.0).abs() < 1e-9);
        assert_eq!(points[1], points[3]);
    }

    #[test]
    fn test_arrow_head_clamped() {
        let points = arrow_points(Point::new(0.0, 0.0), Point::new(1000.0, 0.0));
        assert!((points[2].x - (1000.0 - HEAD_LENGTH_MAX)).abs() < 1e-9);

        let points = arrow_points(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((points[2].x - (10.0 - HEAD_LENGTH_MIN)).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_arrow_is_finite() {
        let p = Point::new(5.0, 5.0);
        let points = arrow_points(p, p);
        assert!(points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()));
    }
}
