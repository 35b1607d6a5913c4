//! Triangles, diamond, regular polygons and the star.

use super::AnchorBox;
use kurbo::Point;
use std::f64::consts::{FRAC_PI_2, TAU};

const STAR_TIPS: usize = 5;
/// Inner radius of the star as a fraction of the outer one.
const STAR_INNER_RATIO: f64 = 0.45;

/// Isosceles triangle with its apex at the top center.
pub fn triangle_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let apex = Point::new(b.center().x, b.min_y);
    vec![apex, Point::new(b.max_x, b.max_y), Point::new(b.min_x, b.max_y), apex]
}

/// Right triangle with the right angle at the bottom-left corner.
pub fn right_triangle_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let top = Point::new(b.min_x, b.min_y);
    vec![top, Point::new(b.max_x, b.max_y), Point::new(b.min_x, b.max_y), top]
}

/// Diamond touching the midpoint of each box edge.
pub fn diamond_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let c = b.center();
    let top = Point::new(c.x, b.min_y);
    vec![
        top,
        Point::new(b.max_x, c.y),
        Point::new(c.x, b.max_y),
        Point::new(b.min_x, c.y),
        top,
    ]
}

/// Regular polygon inscribed in the anchor box, first vertex at 12 o'clock.
pub fn regular_polygon_points(sides: usize, start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let c = b.center();
    let rx = ((b.max_x - b.min_x) / 2.0).max(1.0);
    let ry = ((b.max_y - b.min_y) / 2.0).max(1.0);
    let sides = sides.max(3);

    let mut points: Vec<Point> = (0..sides)
        .map(|i| {
            let angle = -FRAC_PI_2 + i as f64 / sides as f64 * TAU;
            Point::new(c.x + angle.cos() * rx, c.y + angle.sin() * ry)
        })
        .collect();
    points.push(points[0]);
    points
}

pub fn hexagon_points(start: Point, end: Point) -> Vec<Point> {
    regular_polygon_points(6, start, end)
}

/// Five-pointed star alternating outer and inner radius.
pub fn star_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let c = b.center();
    let outer = (b.max_x - b.min_x).min(b.max_y - b.min_y) / 2.0;
    let inner = outer * STAR_INNER_RATIO;
    let total = STAR_TIPS * 2;

    let mut points: Vec<Point> = (0..total)
        .map(|i| {
            let angle = -FRAC_PI_2 + i as f64 / total as f64 * TAU;
            let radius = if i % 2 == 0 { outer } else { inner };
            Point::new(c.x + angle.cos() * radius, c.y + angle.sin() * radius)
        })
        .collect();
    points.push(points[0]);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle() {
        let points = triangle_points(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        assert_eq!(points[0], Point::new(5.0, 0.0));
        assert_eq!(points[1], Point::new(10.0, 20.0));
        assert_eq!(points[2], Point::new(0.0, 20.0));
        assert_eq!(points[3], points[0]);
    }

    #[test]
    fn test_right_triangle() {
        let points = right_triangle_points(Point::new(10.0, 20.0), Point::new(0.0, 0.0));
        assert_eq!(points, vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(0.0, 20.0),
            Point::new(0.0, 0.0),
        ]);
    }

    #[test]
    fn test_diamond() {
        let points = diamond_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert_eq!(points.len(), 5);
        assert_eq!(points[1], Point::new(10.0, 5.0));
        assert_eq!(points[3], Point::new(0.0, 5.0));
    }

    #[test]
    fn test_hexagon_closed() {
        let points = hexagon_points(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(points.len(), 7);
        assert_eq!(points[0], points[6]);
        // First vertex sits at the top center.
        assert!((points[0].x - 50.0).abs() < 1e-9);
        assert!((points[0].y).abs() < 1e-9);
    }

    #[test]
    fn test_star_radii() {
        let points = star_points(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(points.len(), 11);
        let c = Point::new(50.0, 50.0);
        assert!((points[0].distance(c) - 50.0).abs() < 1e-9);
        assert!((points[1].distance(c) - 22.5).abs() < 1e-9);
        assert_eq!(points[0], points[10]);
    }
}
