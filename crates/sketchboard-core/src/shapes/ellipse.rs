//! Ellipse outline.

use super::line_points;
use kurbo::Point;
use std::f64::consts::TAU;

/// Below this radius on both axes the ellipse collapses to a line.
const MIN_RADIUS: f64 = 2.0;
const MIN_SEGMENTS: usize = 24;

/// Ellipse inscribed in the anchor box, sampled parametrically.
///
/// The sample count grows with the radii (`max(24, (rx + ry) / 4)`); the
/// first sample is repeated at the end so the outline closes.
pub fn ellipse_points(start: Point, end: Point) -> Vec<Point> {
    let center = start.midpoint(end);
    let rx = (end.x - start.x).abs() / 2.0;
    let ry = (end.y - start.y).abs() / 2.0;
    if rx < MIN_RADIUS && ry < MIN_RADIUS {
        return line_points(start, end);
    }

    let segments = (((rx + ry) / 4.0).round() as usize).max(MIN_SEGMENTS);
    (0..=segments)
        .map(|i| {
            let angle = i as f64 / segments as f64 * TAU;
            Point::new(center.x + angle.cos() * rx, center.y + angle.sin() * ry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_ellipse_degenerates_to_line() {
        let points = ellipse_points(Point::new(0.0, 0.0), Point::new(3.0, 3.0));
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_ellipse_sample_count() {
        let points = ellipse_points(Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert_eq!(points.len(), MIN_SEGMENTS + 1);

        let points = ellipse_points(Point::new(0.0, 0.0), Point::new(400.0, 400.0));
        // rx + ry = 400 -> 100 segments.
        assert_eq!(points.len(), 101);
    }

    #[test]
    fn test_ellipse_points_on_curve() {
        let points = ellipse_points(Point::new(-50.0, -20.0), Point::new(50.0, 20.0));
        for p in &points {
            let v = (p.x / 50.0).powi(2) + (p.y / 20.0).powi(2);
            assert!((v - 1.0).abs() < 1e-9);
        }
    }
}
