//! Ink paths and their eraser masks.

use crate::curve::Curve;
use crate::shapes::{self, ShapeTag, point_to_polyline_dist, points_bounds};
use crate::tools::StrokeStyle;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a path.
pub type PathId = Uuid;
/// Unique identifier for an eraser mask.
pub type MaskId = Uuid;

/// Stroke color sentinel marking eraser strokes.
pub const ERASE_COLOR: &str = "erase";

/// Stroke end cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Round,
    Butt,
}

/// How the points of a path are authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// Points are authored directly (freehand strokes and generated shapes).
    #[default]
    Freehand,
    /// Points are the sampling of [`Path::curve`].
    Curve,
}

/// Subtractive overlay attached to a path.
///
/// Masks never alter the points of the path they belong to; the renderer
/// composites them out of the path's stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraserMask {
    pub id: MaskId,
    pub points: Vec<Point>,
    pub width: f64,
}

impl EraserMask {
    pub fn new(points: Vec<Point>, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            width,
        }
    }

    /// Same mask under a fresh id.
    pub fn with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// One drawable vector entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: PathId,
    /// CSS color string, or [`ERASE_COLOR`] for eraser strokes.
    pub color: String,
    pub width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub points: Vec<Point>,
    #[serde(default)]
    pub start_cap: LineCap,
    #[serde(default)]
    pub end_cap: LineCap,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default, rename = "pathKind", alias = "kind")]
    pub kind: PathKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
    #[serde(default)]
    pub shape_type: ShapeTag,
    #[serde(default)]
    pub eraser_masks: Vec<EraserMask>,
    #[serde(default)]
    pub locked: bool,
}

impl Path {
    fn with_style(style: &StrokeStyle, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: style.color.clone(),
            width: style.width,
            opacity: style.opacity,
            points,
            start_cap: LineCap::Round,
            end_cap: LineCap::Round,
            is_closed: false,
            kind: PathKind::Freehand,
            curve: None,
            shape_type: ShapeTag::Freeform,
            eraser_masks: Vec::new(),
            locked: false,
        }
    }

    /// Freehand stroke starting at `point`.
    pub fn stroke(style: &StrokeStyle, point: Point) -> Self {
        Self::with_style(style, vec![point])
    }

    /// Generated shape outline between two anchors.
    pub fn shape(tag: ShapeTag, style: &StrokeStyle, start: Point, end: Point) -> Self {
        let mut path = Self::with_style(style, shapes::generate(tag, start, end));
        path.start_cap = LineCap::Butt;
        path.end_cap = LineCap::Butt;
        path.is_closed = !tag.is_open();
        path.shape_type = tag;
        path
    }

    /// Two-node curve between two anchors.
    pub fn curve(style: &StrokeStyle, start: Point, end: Point) -> Self {
        let curve = Curve::between(start, end);
        let mut path = Self::with_style(style, curve.sample());
        path.kind = PathKind::Curve;
        path.curve = Some(curve);
        path.shape_type = ShapeTag::Curve;
        path
    }

    /// Eraser strokes are never ink; they only produce masks.
    pub fn is_eraser(&self) -> bool {
        self.color == ERASE_COLOR
    }

    pub fn is_curve(&self) -> bool {
        self.kind == PathKind::Curve && self.curve.is_some()
    }

    /// Replace the curve and re-derive the points from it.
    pub fn set_curve(&mut self, curve: Curve) {
        self.points = curve.sample();
        self.curve = Some(curve);
    }

    /// Bounding box of the points.
    pub fn bounds(&self) -> Option<Rect> {
        points_bounds(&self.points)
    }

    /// Whether `point` lies within `tolerance` of the stroke centerline.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        if !contains_inclusive(bounds.inflate(tolerance, tolerance), point) {
            return false;
        }
        point_to_polyline_dist(point, &self.points) <= tolerance
    }

    /// Apply `f` to the points, the masks and the curve controls.
    ///
    /// Curve paths re-derive their points from the mapped curve.
    pub fn map_geometry(&mut self, f: impl Fn(Point) -> Point) {
        for mask in &mut self.eraser_masks {
            for point in &mut mask.points {
                *point = f(*point);
            }
        }
        let mapped_curve = match (&self.curve, self.kind) {
            (Some(curve), PathKind::Curve) => Some(curve.map_points(&f)),
            _ => None,
        };
        match mapped_curve {
            Some(curve) => self.set_curve(curve),
            None => {
                for point in &mut self.points {
                    *point = f(*point);
                }
            }
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.map_geometry(|p| p + delta);
    }

    /// Translated copy with fresh path and mask ids.
    pub fn duplicated(&self, delta: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.eraser_masks = self.eraser_masks.iter().map(EraserMask::with_new_id).collect();
        copy.translate(delta);
        copy
    }
}

/// `Rect::contains` is half-open; hits exactly on the far edges still count.
pub(crate) fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveNode;

    const EPS: f64 = 1e-9;

    fn style() -> StrokeStyle {
        StrokeStyle {
            color: "#111827".to_string(),
            width: 2.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_shape_path_flags() {
        let rect = Path::shape(ShapeTag::Rectangle, &style(), Point::ZERO, Point::new(10.0, 10.0));
        assert!(rect.is_closed);
        assert_eq!(rect.start_cap, LineCap::Butt);
        let arrow = Path::shape(ShapeTag::Arrow, &style(), Point::ZERO, Point::new(10.0, 10.0));
        assert!(!arrow.is_closed);
    }

    #[test]
    fn test_hit_on_straight_path_at_zero_tolerance() {
        let path = Path::shape(ShapeTag::Line, &style(), Point::ZERO, Point::new(10.0, 0.0));
        assert!(path.hit_test(Point::new(5.0, 0.0), 0.0));
        assert!(path.hit_test(Point::new(10.0, 0.0), 0.0));
        assert!(!path.hit_test(Point::new(5.0, 3.0), 2.9));
        assert!(path.hit_test(Point::new(5.0, 3.0), 3.0));
    }

    #[test]
    fn test_translate_curve_path_rederives_points() {
        let mut path = Path::curve(&style(), Point::ZERO, Point::new(100.0, 0.0));
        let mut curve = path.curve.clone().unwrap();
        curve.nodes[0] = CurveNode {
            anchor: Point::ZERO,
            handle_in: None,
            handle_out: Some(Point::new(30.0, 40.0)),
        };
        path.set_curve(curve);
        path.translate(Vec2::new(5.0, 5.0));
        let expected = path.curve.as_ref().unwrap().sample();
        assert_eq!(path.points, expected);
        assert!((path.points[0].x - 5.0).abs() < EPS);
        assert_eq!(path.curve.as_ref().unwrap().nodes[0].handle_out, Some(Point::new(35.0, 45.0)));
    }

    #[test]
    fn test_duplicated_gets_fresh_ids() {
        let mut path = Path::stroke(&style(), Point::ZERO);
        path.eraser_masks.push(EraserMask::new(vec![Point::ZERO], 4.0));
        let copy = path.duplicated(Vec2::new(24.0, 24.0));
        assert_ne!(copy.id, path.id);
        assert_ne!(copy.eraser_masks[0].id, path.eraser_masks[0].id);
        assert_eq!(copy.points[0], Point::new(24.0, 24.0));
        assert_eq!(copy.eraser_masks[0].points[0], Point::new(24.0, 24.0));
    }

    #[test]
    fn test_serde_wire_shape() {
        let path = Path::curve(&style(), Point::ZERO, Point::new(1.0, 1.0));
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["pathKind"], "curve");
        assert_eq!(json["shapeType"], "curve");
        assert_eq!(json["startCap"], "round");
        assert!(json["eraserMasks"].as_array().unwrap().is_empty());

        let minimal: Path = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "color": "#000",
            "width": 3.0,
            "points": [{ "x": 1.0, "y": 2.0 }]
        }))
        .unwrap();
        assert_eq!(minimal.kind, PathKind::Freehand);
        assert!((minimal.opacity - 1.0).abs() < EPS);
        assert!(!minimal.locked);
    }
}
