//! Shape outline generators.
//!
//! Every shape tag maps to a pure function that turns the two drag anchors
//! into an ordered outline in world coordinates. Generators are looked up
//! through [`GENERATORS`]; adding a shape means adding a tag and registering
//! its function there.

mod arrow;
mod ellipse;
mod graph;
mod polygon;
mod rectangle;

pub use arrow::{arrow_points, line_points};
pub use ellipse::ellipse_points;
pub use graph::{AxisDirection, append_axis_arrow, econ_graph_points, math_graph_points};
pub use polygon::{
    diamond_points, hexagon_points, regular_polygon_points, right_triangle_points, star_points,
    triangle_points,
};
pub use rectangle::{rectangle_points, rounded_rectangle_points};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Tag naming which generator produced a path outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeTag {
    #[default]
    Freeform,
    Line,
    Curve,
    Arrow,
    Rectangle,
    RoundedRectangle,
    Ellipse,
    Triangle,
    RightTriangle,
    Diamond,
    Hexagon,
    Star,
    EconGraph,
    MathGraph,
}

/// Signature shared by all outline generators.
pub type ShapeGenerator = fn(Point, Point) -> Vec<Point>;

/// Tag to generator table.
pub const GENERATORS: [(ShapeTag, ShapeGenerator); 14] = [
    (ShapeTag::Freeform, line_points),
    (ShapeTag::Line, line_points),
    (ShapeTag::Curve, curve_points),
    (ShapeTag::Arrow, arrow_points),
    (ShapeTag::Rectangle, rectangle_points),
    (ShapeTag::RoundedRectangle, rounded_rectangle_points),
    (ShapeTag::Ellipse, ellipse_points),
    (ShapeTag::Triangle, triangle_points),
    (ShapeTag::RightTriangle, right_triangle_points),
    (ShapeTag::Diamond, diamond_points),
    (ShapeTag::Hexagon, hexagon_points),
    (ShapeTag::Star, star_points),
    (ShapeTag::EconGraph, econ_graph_points),
    (ShapeTag::MathGraph, math_graph_points),
];

impl ShapeTag {
    /// All tags in toolbar order.
    pub const ALL: [ShapeTag; 14] = [
        ShapeTag::Freeform,
        ShapeTag::Line,
        ShapeTag::Curve,
        ShapeTag::Arrow,
        ShapeTag::Rectangle,
        ShapeTag::RoundedRectangle,
        ShapeTag::Ellipse,
        ShapeTag::Triangle,
        ShapeTag::RightTriangle,
        ShapeTag::Diamond,
        ShapeTag::Hexagon,
        ShapeTag::Star,
        ShapeTag::EconGraph,
        ShapeTag::MathGraph,
    ];

    /// Look up the generator registered for this tag.
    pub fn generator(self) -> ShapeGenerator {
        GENERATORS
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, generator)| *generator)
            .unwrap_or(line_points)
    }

    /// Open outlines are stroked as-is; everything else is closed when rendered.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ShapeTag::Line | ShapeTag::Arrow | ShapeTag::Curve | ShapeTag::EconGraph | ShapeTag::MathGraph
        )
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ShapeTag::Freeform => "Freeform",
            ShapeTag::Line => "Line",
            ShapeTag::Curve => "Curve",
            ShapeTag::Arrow => "Arrow",
            ShapeTag::Rectangle => "Rectangle",
            ShapeTag::RoundedRectangle => "Rounded Rectangle",
            ShapeTag::Ellipse => "Circle",
            ShapeTag::Triangle => "Triangle",
            ShapeTag::RightTriangle => "Right Triangle",
            ShapeTag::Diamond => "Diamond",
            ShapeTag::Hexagon => "Hexagon",
            ShapeTag::Star => "Star",
            ShapeTag::EconGraph => "Economics Graph",
            ShapeTag::MathGraph => "Math Graph",
        }
    }
}

/// Generate the outline for `tag` between two anchors.
pub fn generate(tag: ShapeTag, start: Point, end: Point) -> Vec<Point> {
    (tag.generator())(start, end)
}

fn curve_points(start: Point, end: Point) -> Vec<Point> {
    crate::curve::Curve::between(start, end).sample()
}

/// Clamp that tolerates `lo > hi` by letting the upper bound win.
pub(crate) fn clamp_number(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Axis-aligned box spanned by two drag anchors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnchorBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl AnchorBox {
    pub fn new(start: Point, end: Point) -> Self {
        let rect = Rect::from_points(start, end);
        Self {
            min_x: rect.x0,
            min_y: rect.y0,
            max_x: rect.x1,
            max_y: rect.y1,
        }
    }

    /// Width, at least one world unit.
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(1.0)
    }

    /// Height, at least one world unit.
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Bounding box of a point list, `None` when empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for point in &points[1..] {
        rect = rect.union_pt(*point);
    }
    Some(rect)
}

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline.
///
/// A single point is measured directly; an empty list is infinitely far.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_has_generator() {
        for tag in ShapeTag::ALL {
            assert!(GENERATORS.iter().any(|(t, _)| *t == tag), "{tag:?} missing");
        }
    }

    #[test]
    fn test_zero_size_outlines_are_finite() {
        let p = Point::new(42.0, -17.0);
        for tag in ShapeTag::ALL {
            let points = generate(tag, p, p);
            assert!(!points.is_empty(), "{tag:?} produced no points");
            assert!(
                points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()),
                "{tag:?} produced a non-finite point"
            );
        }
    }

    #[test]
    fn test_open_tags() {
        assert!(ShapeTag::Line.is_open());
        assert!(ShapeTag::MathGraph.is_open());
        assert!(!ShapeTag::Rectangle.is_open());
        assert!(!ShapeTag::Star.is_open());
    }

    #[test]
    fn test_tag_serialization() {
        let json = serde_json::to_string(&ShapeTag::RoundedRectangle).unwrap();
        assert_eq!(json, "\"rounded-rectangle\"");
        let tag: ShapeTag = serde_json::from_str("\"econ-graph\"").unwrap();
        assert_eq!(tag, ShapeTag::EconGraph);
    }

    #[test]
    fn test_point_on_segment_hits_at_zero_tolerance() {
        let points = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(point_to_polyline_dist(Point::new(37.5, 0.0), &points) <= 0.0);
        assert!(point_to_polyline_dist(Point::new(37.5, 3.0), &points) > 2.0);
    }

    #[test]
    fn test_single_point_distance() {
        let d = point_to_polyline_dist(Point::new(3.0, 4.0), &[Point::ZERO]);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_points_bounds() {
        let bounds = points_bounds(&[
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
        ])
        .unwrap();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
        assert!(points_bounds(&[]).is_none());
    }
}
