//! Editable cubic Bezier chains.
//!
//! A curve is a list of nodes; each consecutive pair forms one cubic
//! segment `(a.anchor, a.handle_out ?? a.anchor, b.handle_in ?? b.anchor,
//! b.anchor)`. A missing handle makes that end of the segment a sharp
//! corner. The polyline stored on a curve path is always derived from the
//! nodes through [`Curve::sample`].

use kurbo::{CubicBez, ParamCurve, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Samples per segment when deriving the path polyline.
pub const SAMPLES_PER_SEGMENT: usize = 24;
/// Samples per segment when searching for the closest point on the curve.
pub const SEARCH_SAMPLES_PER_SEGMENT: usize = 40;

/// One editable point on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveNode {
    pub anchor: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Point>,
}

impl CurveNode {
    /// A sharp node without handles.
    pub fn corner(anchor: Point) -> Self {
        Self {
            anchor,
            handle_in: None,
            handle_out: None,
        }
    }

    fn map(&self, f: &impl Fn(Point) -> Point) -> Self {
        Self {
            anchor: f(self.anchor),
            handle_in: self.handle_in.map(f),
            handle_out: self.handle_out.map(f),
        }
    }
}

/// Which control of a node is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveHandleKind {
    Anchor,
    HandleIn,
    HandleOut,
}

/// A draggable control on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveHandle {
    pub kind: CurveHandleKind,
    pub node_index: usize,
}

impl CurveHandle {
    pub fn anchor(node_index: usize) -> Self {
        Self {
            kind: CurveHandleKind::Anchor,
            node_index,
        }
    }
}

/// Closest sampled position on a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveHit {
    /// Index of the segment's start node.
    pub node_index: usize,
    /// Parameter within that segment.
    pub t: f64,
    pub distance: f64,
}

/// A chain of cubic Bezier segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub nodes: Vec<CurveNode>,
}

impl Curve {
    pub fn new(nodes: Vec<CurveNode>) -> Self {
        Self { nodes }
    }

    /// Straight two-node curve used while a curve is being dragged out.
    pub fn between(start: Point, end: Point) -> Self {
        Self::new(vec![CurveNode::corner(start), CurveNode::corner(end)])
    }

    /// Number of cubic segments.
    pub fn segment_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Control points of the segment starting at node `index`.
    pub fn segment(&self, index: usize) -> Option<CubicBez> {
        let start = self.nodes.get(index)?;
        let end = self.nodes.get(index + 1)?;
        Some(CubicBez::new(
            start.anchor,
            start.handle_out.unwrap_or(start.anchor),
            end.handle_in.unwrap_or(end.anchor),
            end.anchor,
        ))
    }

    /// Sample the curve into a polyline at [`SAMPLES_PER_SEGMENT`].
    pub fn sample(&self) -> Vec<Point> {
        self.sample_with(SAMPLES_PER_SEGMENT)
    }

    /// Sample every segment at `resolution` subdivisions.
    ///
    /// Shared segment endpoints are emitted once. A single-node curve yields
    /// its anchor and an empty curve yields nothing.
    pub fn sample_with(&self, resolution: usize) -> Vec<Point> {
        let resolution = resolution.max(1);
        match self.nodes.as_slice() {
            [] => return Vec::new(),
            [only] => return vec![only.anchor],
            _ => {}
        }

        let mut points = Vec::with_capacity(self.segment_count() * resolution + 1);
        for index in 0..self.segment_count() {
            let Some(segment) = self.segment(index) else {
                continue;
            };
            let first = if index == 0 { 0 } else { 1 };
            for i in first..=resolution {
                points.push(segment.eval(i as f64 / resolution as f64));
            }
        }
        points
    }

    /// Apply `f` to every anchor and every defined handle.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            nodes: self.nodes.iter().map(|node| node.map(&f)).collect(),
        }
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        self.map_points(|p| p + delta)
    }

    /// Rotate about `center` by `angle` radians.
    pub fn rotated(&self, center: Point, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.map_points(|p| rotate_about(p, center, cos, sin))
    }

    /// Position of a handle; missing handles resolve to their anchor.
    pub fn handle_point(&self, handle: CurveHandle) -> Option<Point> {
        let node = self.nodes.get(handle.node_index)?;
        Some(match handle.kind {
            CurveHandleKind::Anchor => node.anchor,
            CurveHandleKind::HandleIn => node.handle_in.unwrap_or(node.anchor),
            CurveHandleKind::HandleOut => node.handle_out.unwrap_or(node.anchor),
        })
    }

    /// Every draggable control: per node the anchor, then the defined
    /// outgoing and incoming handles.
    pub fn handles(&self) -> Vec<(CurveHandle, Point)> {
        let mut handles = Vec::with_capacity(self.nodes.len() * 3);
        for (node_index, node) in self.nodes.iter().enumerate() {
            handles.push((CurveHandle::anchor(node_index), node.anchor));
            if let Some(out) = node.handle_out {
                handles.push((
                    CurveHandle {
                        kind: CurveHandleKind::HandleOut,
                        node_index,
                    },
                    out,
                ));
            }
            if let Some(handle_in) = node.handle_in {
                handles.push((
                    CurveHandle {
                        kind: CurveHandleKind::HandleIn,
                        node_index,
                    },
                    handle_in,
                ));
            }
        }
        handles
    }

    /// Closest handle within `threshold` of `point`.
    ///
    /// Ties go to the later handle in [`Curve::handles`] order, so a handle
    /// sitting on top of its anchor wins over the anchor.
    pub fn nearest_handle(&self, point: Point, threshold: f64) -> Option<CurveHandle> {
        let mut best = None;
        let mut min_distance = threshold;
        for (handle, position) in self.handles() {
            let distance = point.distance(position);
            if distance <= min_distance {
                best = Some(handle);
                min_distance = distance;
            }
        }
        best
    }

    /// Closest sampled position to `point` over all segments.
    pub fn closest(&self, point: Point) -> Option<CurveHit> {
        let mut best: Option<CurveHit> = None;
        for node_index in 0..self.segment_count() {
            let Some(segment) = self.segment(node_index) else {
                continue;
            };
            for i in 0..=SEARCH_SAMPLES_PER_SEGMENT {
                let t = i as f64 / SEARCH_SAMPLES_PER_SEGMENT as f64;
                let distance = segment.eval(t).distance(point);
                if best.is_none_or(|b| distance < b.distance) {
                    best = Some(CurveHit {
                        node_index,
                        t,
                        distance,
                    });
                }
            }
        }
        best
    }

    /// Insert a node at the sampled position closest to `point`.
    ///
    /// The containing segment is split with De Casteljau subdivision so the
    /// visual shape is unchanged. Returns the new curve and the index of the
    /// inserted node. Curves with fewer than two nodes are returned as-is
    /// with index 0.
    pub fn insert_node_at(&self, point: Point) -> (Self, usize) {
        let Some(hit) = self.closest(point) else {
            return (self.clone(), 0);
        };
        let Some(segment) = self.segment(hit.node_index) else {
            return (self.clone(), 0);
        };
        let (left, right) = split_cubic(segment, hit.t);

        let mut nodes = self.nodes.clone();
        nodes[hit.node_index].handle_out = Some(left.p1);
        nodes[hit.node_index + 1].handle_in = Some(right.p2);
        let inserted = hit.node_index + 1;
        nodes.insert(
            inserted,
            CurveNode {
                anchor: left.p3,
                handle_in: Some(left.p2),
                handle_out: Some(right.p1),
            },
        );
        (Self { nodes }, inserted)
    }

    /// Move one control of this curve so it lands on `target`.
    ///
    /// Moving an anchor drags its own handles along by the same delta; moving
    /// a handle touches only that handle. Returns `None` when the control is
    /// already at `target` or the handle does not exist.
    pub fn with_handle_moved(&self, handle: CurveHandle, target: Point) -> Option<Self> {
        let origin = self.nodes.get(handle.node_index)?;
        let mut next = self.clone();
        let node = &mut next.nodes[handle.node_index];
        match handle.kind {
            CurveHandleKind::Anchor => {
                let delta = target - origin.anchor;
                if delta == Vec2::ZERO {
                    return None;
                }
                node.anchor = target;
                node.handle_in = origin.handle_in.map(|p| p + delta);
                node.handle_out = origin.handle_out.map(|p| p + delta);
            }
            CurveHandleKind::HandleIn => {
                if origin.handle_in.unwrap_or(origin.anchor) == target {
                    return None;
                }
                node.handle_in = Some(target);
            }
            CurveHandleKind::HandleOut => {
                if origin.handle_out.unwrap_or(origin.anchor) == target {
                    return None;
                }
                node.handle_out = Some(target);
            }
        }
        Some(next)
    }
}

/// Split a cubic at `t` into its left and right halves.
pub fn split_cubic(c: CubicBez, t: f64) -> (CubicBez, CubicBez) {
    let p01 = c.p0.lerp(c.p1, t);
    let p12 = c.p1.lerp(c.p2, t);
    let p23 = c.p2.lerp(c.p3, t);
    let p012 = p01.lerp(p12, t);
    let p123 = p12.lerp(p23, t);
    let p0123 = p012.lerp(p123, t);
    (
        CubicBez::new(c.p0, p01, p012, p0123),
        CubicBez::new(p0123, p123, p23, c.p3),
    )
}

/// Rotate `p` about `center` given a precomputed cosine and sine.
pub fn rotate_about(p: Point, center: Point, cos: f64, sin: f64) -> Point {
    let rel = p - center;
    Point::new(
        center.x + rel.x * cos - rel.y * sin,
        center.y + rel.x * sin + rel.y * cos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::point_to_polyline_dist;

    const EPS: f64 = 1e-9;

    fn s_curve() -> Curve {
        Curve::new(vec![
            CurveNode {
                anchor: Point::new(0.0, 0.0),
                handle_in: None,
                handle_out: Some(Point::new(40.0, -60.0)),
            },
            CurveNode {
                anchor: Point::new(100.0, 0.0),
                handle_in: Some(Point::new(60.0, 60.0)),
                handle_out: None,
            },
        ])
    }

    fn assert_curves_close(a: &Curve, b: &Curve) {
        assert_eq!(a.nodes.len(), b.nodes.len());
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert!(na.anchor.distance(nb.anchor) < EPS);
            assert_eq!(na.handle_in.is_some(), nb.handle_in.is_some());
            assert_eq!(na.handle_out.is_some(), nb.handle_out.is_some());
            if let (Some(x), Some(y)) = (na.handle_in, nb.handle_in) {
                assert!(x.distance(y) < EPS);
            }
            if let (Some(x), Some(y)) = (na.handle_out, nb.handle_out) {
                assert!(x.distance(y) < EPS);
            }
        }
    }

    #[test]
    fn test_sample_count_and_endpoints() {
        let curve = s_curve();
        let points = curve.sample();
        assert_eq!(points.len(), SAMPLES_PER_SEGMENT + 1);
        assert_eq!(points[0], Point::new(0.0, 0.0));
        assert!(points[SAMPLES_PER_SEGMENT].distance(Point::new(100.0, 0.0)) < EPS);
    }

    #[test]
    fn test_multi_segment_sampling_skips_shared_endpoint() {
        let mut curve = Curve::between(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        curve.nodes.push(CurveNode::corner(Point::new(20.0, 0.0)));
        assert_eq!(curve.sample().len(), 2 * SAMPLES_PER_SEGMENT + 1);
    }

    #[test]
    fn test_sampling_is_idempotent() {
        let curve = s_curve();
        assert_eq!(curve.sample(), curve.sample());
    }

    #[test]
    fn test_degenerate_curves() {
        assert!(Curve::default().sample().is_empty());
        let single = Curve::new(vec![CurveNode::corner(Point::new(3.0, 4.0))]);
        assert_eq!(single.sample(), vec![Point::new(3.0, 4.0)]);
        let (same, index) = single.insert_node_at(Point::ZERO);
        assert_eq!(same, single);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_translate_roundtrip() {
        let curve = s_curve();
        let back = curve.translated(Vec2::new(13.5, -7.25)).translated(Vec2::new(-13.5, 7.25));
        assert_curves_close(&curve, &back);
    }

    #[test]
    fn test_rotate_full_turn() {
        let curve = s_curve();
        let center = Point::new(50.0, 10.0);
        let mut rotated = curve.clone();
        for _ in 0..8 {
            rotated = rotated.rotated(center, std::f64::consts::TAU / 8.0);
        }
        assert_curves_close(&curve, &rotated);
    }

    #[test]
    fn test_split_preserves_curve() {
        let segment = s_curve().segment(0).unwrap();
        let (left, right) = split_cubic(segment, 0.3);
        for i in 0..=10 {
            let s = i as f64 / 10.0;
            assert!(left.eval(s).distance(segment.eval(0.3 * s)) < EPS);
            assert!(right.eval(s).distance(segment.eval(0.3 + 0.7 * s)) < EPS);
        }
    }

    #[test]
    fn test_insert_node_at_midpoint_keeps_shape() {
        let curve = s_curve();
        let segment = curve.segment(0).unwrap();
        let midpoint = segment.eval(0.5);

        let (inserted, index) = curve.insert_node_at(midpoint);
        assert_eq!(index, 1);
        assert_eq!(inserted.nodes.len(), 3);
        assert!(inserted.nodes[1].anchor.distance(midpoint) < EPS);

        let dense = curve.sample_with(2000);
        for p in inserted.sample() {
            assert!(point_to_polyline_dist(p, &dense) < 1e-2);
        }
        for i in 0..=10 {
            let s = i as f64 / 10.0;
            let left = inserted.segment(0).unwrap().eval(s);
            let right = inserted.segment(1).unwrap().eval(s);
            assert!(left.distance(segment.eval(0.5 * s)) < EPS);
            assert!(right.distance(segment.eval(0.5 + 0.5 * s)) < EPS);
        }
    }

    #[test]
    fn test_nearest_handle() {
        let curve = s_curve();
        let hit = curve.nearest_handle(Point::new(41.0, -59.0), 5.0);
        assert_eq!(
            hit,
            Some(CurveHandle {
                kind: CurveHandleKind::HandleOut,
                node_index: 0
            })
        );
        assert_eq!(curve.nearest_handle(Point::new(50.0, 50.0), 5.0), None);
    }

    #[test]
    fn test_move_anchor_drags_handles() {
        let curve = s_curve();
        let moved = curve
            .with_handle_moved(CurveHandle::anchor(0), Point::new(10.0, 5.0))
            .unwrap();
        assert_eq!(moved.nodes[0].anchor, Point::new(10.0, 5.0));
        assert_eq!(moved.nodes[0].handle_out, Some(Point::new(50.0, -55.0)));
        assert_eq!(moved.nodes[1], curve.nodes[1]);
    }

    #[test]
    fn test_move_handle_is_independent() {
        let curve = s_curve();
        let handle = CurveHandle {
            kind: CurveHandleKind::HandleIn,
            node_index: 0,
        };
        let moved = curve.with_handle_moved(handle, Point::new(-20.0, 0.0)).unwrap();
        assert_eq!(moved.nodes[0].handle_in, Some(Point::new(-20.0, 0.0)));
        assert_eq!(moved.nodes[0].handle_out, curve.nodes[0].handle_out);
        assert_eq!(moved.nodes[0].anchor, curve.nodes[0].anchor);
    }

    #[test]
    fn test_move_to_same_position_is_none() {
        let curve = s_curve();
        assert!(curve.with_handle_moved(CurveHandle::anchor(1), Point::new(100.0, 0.0)).is_none());
        assert!(curve.with_handle_moved(CurveHandle::anchor(9), Point::ZERO).is_none());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_value(s_curve()).unwrap();
        assert!(json["nodes"][0]["handleOut"].is_object());
        assert!(json["nodes"][0].get("handleIn").is_none());
        let back: Curve = serde_json::from_value(serde_json::json!({
            "nodes": [
                { "anchor": { "x": 0.0, "y": 0.0 }, "handleIn": null, "handleOut": null },
                { "anchor": { "x": 5.0, "y": 0.0 } }
            ]
        }))
        .unwrap();
        assert_eq!(back, Curve::between(Point::ZERO, Point::new(5.0, 0.0)));
    }
}
