//! Selection, hit-testing and the move/scale/rotate transform engine.

use crate::camera::Camera;
use crate::curve::rotate_about;
use crate::scene::{Path, PathId, Scene, TextNodeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Path hit tolerance in screen pixels.
pub const HIT_TOLERANCE_PX: f64 = 12.0;
/// Handle hit radius in screen pixels.
pub const HANDLE_HIT_RADIUS_PX: f64 = 10.0;
/// Distance from the top edge of the selection box to the rotate handle.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 36.0;
/// Smallest edge of a selection box while scaling, in screen pixels.
pub const MIN_SCALE_SIZE_PX: f64 = 8.0;
/// Smallest on-screen size of the drawn selection box.
const MIN_SELECTION_BOX_PX: f64 = 4.0;
/// Box sizes are floored here before dividing by them.
const MIN_BOX_EXTENT: f64 = 1e-3;
/// Rotations below this angle are ignored.
const MIN_ROTATION: f64 = 1e-4;

/// Resize handle positions around the selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
        ResizeHandle::Nw,
    ];

    /// Which edges the handle drags: -1 for min, 1 for max, 0 for none.
    pub fn direction(self) -> (i8, i8) {
        match self {
            ResizeHandle::N => (0, -1),
            ResizeHandle::Ne => (1, -1),
            ResizeHandle::E => (1, 0),
            ResizeHandle::Se => (1, 1),
            ResizeHandle::S => (0, 1),
            ResizeHandle::Sw => (-1, 1),
            ResizeHandle::W => (-1, 0),
            ResizeHandle::Nw => (-1, -1),
        }
    }

    /// Handle position as a fraction of the box.
    fn anchor(self) -> (f64, f64) {
        let (x, y) = self.direction();
        ((x as f64 + 1.0) / 2.0, (y as f64 + 1.0) / 2.0)
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    Resize(ResizeHandle),
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in screen coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Screen-space box drawn around the selected paths.
///
/// Never smaller than a few pixels so that single points stay grabbable.
pub fn selection_box(scene: &Scene, ids: &[PathId], camera: &Camera) -> Option<Rect> {
    let world = scene.bounds_of(ids)?;
    let a = camera.world_to_screen(Point::new(world.x0, world.y0));
    let b = camera.world_to_screen(Point::new(world.x1, world.y1));
    let rect = Rect::from_points(a, b);
    Some(Rect::from_origin_size(
        rect.origin(),
        (rect.width().max(MIN_SELECTION_BOX_PX), rect.height().max(MIN_SELECTION_BOX_PX)),
    ))
}

/// Resize handles on the box plus the rotate handle above its top center.
pub fn handles(screen_box: Rect) -> Vec<Handle> {
    let mut handles: Vec<Handle> = ResizeHandle::ALL
        .iter()
        .map(|&handle| {
            let (fx, fy) = handle.anchor();
            let position = Point::new(
                screen_box.x0 + fx * screen_box.width(),
                screen_box.y0 + fy * screen_box.height(),
            );
            Handle::new(position, HandleKind::Resize(handle))
        })
        .collect();
    handles.push(Handle::new(
        Point::new(screen_box.center().x, screen_box.y0 - ROTATE_HANDLE_OFFSET_PX),
        HandleKind::Rotate,
    ));
    handles
}

/// Find which handle (if any) is under a screen point.
pub fn hit_test_handles(screen_box: Rect, point: Point) -> Option<HandleKind> {
    handles(screen_box)
        .into_iter()
        .find(|handle| handle.hit_test(point, HANDLE_HIT_RADIUS_PX))
        .map(|handle| handle.kind)
}

/// Topmost ink path within `tolerance` world units of `point`.
pub fn hit_test_paths(scene: &Scene, point: Point, tolerance: f64) -> Option<PathId> {
    scene
        .paths()
        .iter()
        .rev()
        .filter(|path| !path.is_eraser())
        .find(|path| path.hit_test(point, tolerance))
        .map(|path| path.id)
}

/// Paths and text nodes whose bounds touch the world rectangle.
pub fn marquee_hits(scene: &Scene, rect: Rect) -> (Vec<PathId>, Vec<TextNodeId>) {
    let paths = scene
        .ink_paths()
        .filter(|path| path.bounds().is_some_and(|bounds| overlaps(bounds, rect)))
        .map(|path| path.id)
        .collect();
    let texts = scene
        .text_nodes()
        .iter()
        .filter(|node| overlaps(node.bounds(), rect))
        .map(|node| node.id)
        .collect();
    (paths, texts)
}

/// Closed-interval overlap, so touching edges and zero-area boxes count.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x1 >= b.x0 && a.x0 <= b.x1 && a.y1 >= b.y0 && a.y0 <= b.y1
}

/// Selected paths and text nodes, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub paths: Vec<PathId>,
    pub texts: Vec<TextNodeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.texts.is_empty()
    }

    pub fn contains_path(&self, id: PathId) -> bool {
        self.paths.contains(&id)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.texts.clear();
    }

    /// Add or remove one path.
    pub fn toggle_path(&mut self, id: PathId) {
        if let Some(index) = self.paths.iter().position(|p| *p == id) {
            self.paths.remove(index);
        } else {
            self.paths.push(id);
        }
    }

    /// Replace the path selection, or merge into it when `additive`.
    pub fn select_paths(&mut self, ids: impl IntoIterator<Item = PathId>, additive: bool) {
        if !additive {
            self.paths.clear();
        }
        for id in ids {
            if !self.paths.contains(&id) {
                self.paths.push(id);
            }
        }
    }

    pub fn select_texts(&mut self, ids: impl IntoIterator<Item = TextNodeId>, additive: bool) {
        if !additive {
            self.texts.clear();
        }
        for id in ids {
            if !self.texts.contains(&id) {
                self.texts.push(id);
            }
        }
    }

    /// Drop ids that no longer exist in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) -> bool {
        let before = (self.paths.len(), self.texts.len());
        self.paths.retain(|id| scene.path(*id).is_some());
        self.texts.retain(|id| scene.text_node(*id).is_some());
        before != (self.paths.len(), self.texts.len())
    }
}

/// One transform applied relative to the state captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Move(Vec2),
    /// Remap the original box onto a new one, each axis independently.
    Scale { from: Rect, to: Rect },
    Rotate { center: Point, angle: f64 },
}

impl Transform {
    /// Image of a single point.
    pub fn apply(&self, point: Point) -> Point {
        match *self {
            Transform::Move(delta) => point + delta,
            Transform::Scale { from, to } => remap(point, from, to),
            Transform::Rotate { center, angle } => {
                let (sin, cos) = angle.sin_cos();
                rotate_about(point, center, cos, sin)
            }
        }
    }
}

/// Map a point from one box into another through normalized coordinates.
pub fn remap(point: Point, from: Rect, to: Rect) -> Point {
    let from_w = from.width().max(MIN_BOX_EXTENT);
    let from_h = from.height().max(MIN_BOX_EXTENT);
    let to_w = to.width().max(MIN_BOX_EXTENT);
    let to_h = to.height().max(MIN_BOX_EXTENT);
    let rel_x = (point.x - from.x0) / from_w;
    let rel_y = (point.y - from.y0) / from_h;
    Point::new(to.x0 + rel_x * to_w, to.y0 + rel_y * to_h)
}

/// Box produced by dragging `handle` of `origin` to `point`.
///
/// Dragged edges stop `min_size` short of the opposite edge.
pub fn scaled_box(origin: Rect, handle: ResizeHandle, point: Point, min_size: f64) -> Rect {
    let mut rect = origin;
    let (dx, dy) = handle.direction();
    match dx {
        -1 => rect.x0 = point.x.min(origin.x1 - min_size),
        1 => rect.x1 = point.x.max(origin.x0 + min_size),
        _ => {}
    }
    match dy {
        -1 => rect.y0 = point.y.min(origin.y1 - min_size),
        1 => rect.y1 = point.y.max(origin.y0 + min_size),
        _ => {}
    }
    rect
}

/// Angle swept from `start` to `current` around `center`.
///
/// `None` when the pointer sits on the center or the angle is negligible.
pub fn rotation_angle(center: Point, start_angle: f64, current: Point) -> Option<f64> {
    let vector = current - center;
    if vector.hypot() < MIN_ROTATION {
        return None;
    }
    let delta = vector.atan2() - start_angle;
    (delta.is_finite() && delta.abs() >= MIN_ROTATION).then_some(delta)
}

/// Original state of one text node taking part in a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextTarget {
    pub id: TextNodeId,
    pub origin: Point,
}

/// Paths and text nodes captured when a transform gesture starts.
///
/// Every update is computed from these originals, never from the previous
/// frame, so repeated updates cannot drift.
#[derive(Debug, Clone, Default)]
pub struct TransformTargets {
    pub paths: Vec<Path>,
    pub texts: Vec<TextTarget>,
}

impl TransformTargets {
    /// Capture the unlocked paths among `path_ids` and the movable text nodes.
    ///
    /// Text nodes in `forced_texts` move even when locked; this keeps labels
    /// glued to the shape they annotate.
    pub fn capture(
        scene: &Scene,
        path_ids: &[PathId],
        text_ids: &[TextNodeId],
        forced_texts: &HashSet<TextNodeId>,
    ) -> Self {
        let paths = path_ids
            .iter()
            .filter_map(|id| scene.path(*id))
            .filter(|path| !path.locked)
            .cloned()
            .collect();
        let mut seen = HashSet::new();
        let texts = text_ids
            .iter()
            .chain(forced_texts.iter())
            .filter(|id| seen.insert(**id))
            .filter_map(|id| scene.text_node(*id))
            .filter(|node| forced_texts.contains(&node.id) || !node.is_locked())
            .map(|node| TextTarget {
                id: node.id,
                origin: node.origin(),
            })
            .collect();
        Self { paths, texts }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.texts.is_empty()
    }

    pub fn path_ids(&self) -> Vec<PathId> {
        self.paths.iter().map(|path| path.id).collect()
    }

    /// Aggregate bounds of the captured paths.
    pub fn bounds(&self) -> Option<Rect> {
        self.paths
            .iter()
            .filter_map(Path::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Transformed copies of the captured paths.
    pub fn transformed_paths(&self, transform: &Transform) -> Vec<Path> {
        self.paths
            .iter()
            .map(|original| {
                let mut path = original.clone();
                path.map_geometry(|p| transform.apply(p));
                path
            })
            .collect()
    }

    /// New text origins; only moves carry text nodes along.
    pub fn transformed_texts(&self, transform: &Transform) -> Vec<(TextNodeId, Point)> {
        match transform {
            Transform::Move(delta) => self.texts.iter().map(|t| (t.id, t.origin + *delta)).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{TextNode, TextNodeKind};
    use crate::shapes::ShapeTag;
    use crate::tools::StrokeStyle;
    use std::f64::consts::TAU;

    const EPS: f64 = 1e-9;

    fn shape(tag: ShapeTag, a: (f64, f64), b: (f64, f64)) -> Path {
        Path::shape(tag, &StrokeStyle::default(), Point::new(a.0, a.1), Point::new(b.0, b.1))
    }

    #[test]
    fn test_handles_layout() {
        let handles = handles(Rect::new(0.0, 100.0, 200.0, 300.0));
        assert_eq!(handles.len(), 9);
        assert_eq!(handles[0], Handle::new(Point::new(100.0, 100.0), HandleKind::Resize(ResizeHandle::N)));
        assert_eq!(handles[3].position, Point::new(200.0, 300.0));
        assert_eq!(handles[8], Handle::new(Point::new(100.0, 64.0), HandleKind::Rotate));
    }

    #[test]
    fn test_hit_test_handles() {
        let screen_box = Rect::new(0.0, 100.0, 200.0, 300.0);
        assert_eq!(
            hit_test_handles(screen_box, Point::new(203.0, 297.0)),
            Some(HandleKind::Resize(ResizeHandle::Se))
        );
        assert_eq!(hit_test_handles(screen_box, Point::new(100.0, 66.0)), Some(HandleKind::Rotate));
        assert_eq!(hit_test_handles(screen_box, Point::new(100.0, 200.0)), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost_and_skips_eraser() {
        let mut scene = Scene::new();
        let bottom = shape(ShapeTag::Line, (0.0, 0.0), (10.0, 0.0));
        let top = shape(ShapeTag::Line, (0.0, 0.0), (10.0, 0.0));
        let mut eraser = shape(ShapeTag::Line, (0.0, 0.0), (10.0, 0.0));
        eraser.color = crate::scene::ERASE_COLOR.to_string();
        let top_id = top.id;
        scene.add_path(bottom);
        scene.add_path(top);
        scene.add_path(eraser);
        assert_eq!(hit_test_paths(&scene, Point::new(5.0, 1.0), 2.0), Some(top_id));
        assert_eq!(hit_test_paths(&scene, Point::new(5.0, 5.0), 2.0), None);
    }

    #[test]
    fn test_marquee_hits_paths_and_text() {
        let mut scene = Scene::new();
        let inside = shape(ShapeTag::Rectangle, (10.0, 10.0), (20.0, 20.0));
        let outside = shape(ShapeTag::Rectangle, (100.0, 100.0), (120.0, 120.0));
        let inside_id = inside.id;
        scene.add_path(inside);
        scene.add_path(outside);
        let note = TextNode::new(TextNodeKind::Sticky, Point::new(-200.0, 0.0));
        let note_id = note.id;
        scene.add_text_node(note);

        let (paths, texts) = marquee_hits(&scene, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(paths, vec![inside_id]);
        assert_eq!(texts, vec![note_id]);
    }

    #[test]
    fn test_scaled_box_respects_min_size() {
        let origin = Rect::new(0.0, 0.0, 100.0, 100.0);
        let rect = scaled_box(origin, ResizeHandle::Se, Point::new(150.0, 50.0), 8.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 150.0, 50.0));
        let rect = scaled_box(origin, ResizeHandle::Nw, Point::new(500.0, 500.0), 8.0);
        assert_eq!(rect, Rect::new(92.0, 92.0, 100.0, 100.0));
        let rect = scaled_box(origin, ResizeHandle::E, Point::new(40.0, 900.0), 8.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 40.0, 100.0));
    }

    #[test]
    fn test_scale_to_same_box_is_identity() {
        let mut scene = Scene::new();
        let path = shape(ShapeTag::Star, (3.0, 7.0), (90.0, 61.0));
        let ids = vec![path.id];
        let original = path.points.clone();
        scene.add_path(path);
        let targets = TransformTargets::capture(&scene, &ids, &[], &HashSet::new());
        let bounds = targets.bounds().unwrap();
        let scaled = targets.transformed_paths(&Transform::Scale { from: bounds, to: bounds });
        assert_eq!(scaled[0].points, original);
    }

    #[test]
    fn test_scale_doubles_width() {
        let from = Rect::new(0.0, 0.0, 10.0, 10.0);
        let to = Rect::new(0.0, 0.0, 20.0, 10.0);
        let p = remap(Point::new(5.0, 5.0), from, to);
        assert!((p.x - 10.0).abs() < EPS);
        assert!((p.y - 5.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_full_turn_in_steps() {
        let mut scene = Scene::new();
        let path = shape(ShapeTag::Triangle, (0.0, 0.0), (40.0, 30.0));
        let original = path.points.clone();
        let ids = vec![path.id];
        scene.add_path(path);
        let center = scene.bounds_of(&ids).unwrap().center();

        for _ in 0..6 {
            let targets = TransformTargets::capture(&scene, &ids, &[], &HashSet::new());
            let rotated = targets.transformed_paths(&Transform::Rotate { center, angle: TAU / 6.0 });
            scene.set_paths(rotated);
        }
        for (a, b) in scene.paths()[0].points.iter().zip(&original) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn test_rotation_angle_ignores_tiny_motion() {
        let center = Point::ZERO;
        let start = Point::new(10.0, 0.0);
        let start_angle = (start - center).atan2();
        assert_eq!(rotation_angle(center, start_angle, start), None);
        assert_eq!(rotation_angle(center, start_angle, center), None);
        let angle = rotation_angle(center, start_angle, Point::new(0.0, 10.0)).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_capture_skips_locked_but_forces_children() {
        let mut scene = Scene::new();
        let mut locked = shape(ShapeTag::Line, (0.0, 0.0), (10.0, 0.0));
        locked.locked = true;
        let free = shape(ShapeTag::Line, (0.0, 5.0), (10.0, 5.0));
        let mut label = TextNode::new(TextNodeKind::Label, Point::new(1.0, 1.0));
        label.locked = Some(true);
        label.parent_path_id = Some(free.id);
        let mut other_locked = TextNode::new(TextNodeKind::Sticky, Point::ZERO);
        other_locked.locked = Some(true);
        let ids = vec![locked.id, free.id];
        let (label_id, other_id) = (label.id, other_locked.id);
        scene.add_path(locked);
        scene.add_path(free);
        scene.add_text_node(label);
        scene.add_text_node(other_locked);

        let forced: HashSet<_> = scene.attached_text_nodes(&ids).into_iter().collect();
        let targets = TransformTargets::capture(&scene, &ids, &[other_id], &forced);
        assert_eq!(targets.paths.len(), 1);
        assert_eq!(targets.texts.len(), 1);
        assert_eq!(targets.texts[0].id, label_id);

        let moved = targets.transformed_texts(&Transform::Move(Vec2::new(5.0, 5.0)));
        assert_eq!(moved, vec![(label_id, Point::new(6.0, 6.0))]);
    }

    #[test]
    fn test_selection_toggle_and_additive() {
        let a = PathId::new_v4();
        let b = PathId::new_v4();
        let mut selection = Selection::default();
        selection.select_paths([a], false);
        selection.select_paths([b], true);
        assert_eq!(selection.paths, vec![a, b]);
        selection.toggle_path(a);
        assert_eq!(selection.paths, vec![b]);
        selection.select_paths([a], false);
        assert_eq!(selection.paths, vec![a]);
    }
}
