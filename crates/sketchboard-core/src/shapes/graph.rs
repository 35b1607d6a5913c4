//! Axis diagram outlines ("econ-graph" and "math-graph").

use super::{AnchorBox, clamp_number};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Barb spread relative to the arrow size.
const BARB_SPREAD: f64 = 0.6;

/// Direction an axis arrow points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Append an arrowhead at `tip` as `first, tip, second, tip`.
pub fn append_axis_arrow(points: &mut Vec<Point>, tip: Point, direction: AxisDirection, size: f64) {
    let spread = size * BARB_SPREAD;
    let (first, second) = match direction {
        AxisDirection::Up => (
            Point::new(tip.x - spread, tip.y + size),
            Point::new(tip.x + spread, tip.y + size),
        ),
        AxisDirection::Down => (
            Point::new(tip.x - spread, tip.y - size),
            Point::new(tip.x + spread, tip.y - size),
        ),
        AxisDirection::Left => (
            Point::new(tip.x + size, tip.y - spread),
            Point::new(tip.x + size, tip.y + spread),
        ),
        AxisDirection::Right => (
            Point::new(tip.x - size, tip.y - spread),
            Point::new(tip.x - size, tip.y + spread),
        ),
    };
    points.extend([first, tip, second, tip]);
}

/// First-quadrant axes: origin at the bottom-left, arrows up and right.
pub fn econ_graph_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let origin = Point::new(b.min_x, b.max_y);
    let top = Point::new(b.min_x, b.min_y);
    let right = Point::new(b.max_x, b.max_y);
    let size = clamp_number((b.max_x - b.min_x).min(b.max_y - b.min_y) * 0.15, 8.0, 26.0);

    let mut points = vec![origin, top];
    append_axis_arrow(&mut points, top, AxisDirection::Up, size);
    points.extend([origin, right]);
    append_axis_arrow(&mut points, right, AxisDirection::Right, size);
    points
}

/// Four-quadrant axes crossing at the box center, arrows on every end.
pub fn math_graph_points(start: Point, end: Point) -> Vec<Point> {
    let b = AnchorBox::new(start, end);
    let center = b.center();
    let top = Point::new(center.x, b.min_y);
    let bottom = Point::new(center.x, b.max_y);
    let left = Point::new(b.min_x, center.y);
    let right = Point::new(b.max_x, center.y);
    let size = clamp_number((b.max_x - b.min_x).min(b.max_y - b.min_y) * 0.12, 8.0, 24.0);

    let mut points = vec![bottom, top];
    append_axis_arrow(&mut points, top, AxisDirection::Up, size);
    points.push(bottom);
    append_axis_arrow(&mut points, bottom, AxisDirection::Down, size);
    points.extend([center, left]);
    append_axis_arrow(&mut points, left, AxisDirection::Left, size);
    points.extend([center, right]);
    append_axis_arrow(&mut points, right, AxisDirection::Right, size);
    points.push(center);
    points
}
