//! Pointer and touch gesture routing.
//!
//! The router turns raw pointer events into [`SceneCommand`]s. It never
//! touches the scene itself: drafts live here until they are committed, and
//! the owning [`Canvas`](crate::canvas::Canvas) applies the returned commands
//! in order.

use crate::camera::{Camera, ZoomLimits};
use crate::config::CanvasConfig;
use crate::curve::{Curve, CurveHandle};
use crate::input::{InputState, MouseButton, PointerInput};
use crate::scene::{Path, PathId, Scene, TextNodeId, TextNodeKind};
use crate::selection::{
    self, HANDLE_HIT_RADIUS_PX, HandleKind, ResizeHandle, Selection, Transform, TransformTargets,
};
use crate::shapes::{self, ShapeTag, point_to_polyline_dist};
use crate::tools::{CanvasMode, DrawTool, ToolState};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::{BTreeMap, HashSet};

/// Live curve handle grab radius in screen pixels.
const LIVE_CURVE_THRESHOLD_PX: f64 = 18.0;
/// The grab radius never drops below this multiple of the stroke width.
const LIVE_CURVE_WIDTH_FACTOR: f64 = 1.1;
/// Clicks this close to a live curve (relative to the grab radius) add a node.
const NODE_INSERT_FACTOR: f64 = 1.5;
/// Image drags smaller than this on both axes count as a click.
const IMAGE_CLICK_PX: f64 = 6.0;
const IMAGE_CLICK_MIN: f64 = 2.0;
/// Box used when an image is placed with a click.
pub const DEFAULT_IMAGE_SIZE: Size = Size::new(320.0, 240.0);
const MIN_IMAGE_EDGE: f64 = 1.0;
/// Screen offset applied to new text boxes so the caret lands on the click.
const TEXTBOX_OFFSET_PX: Vec2 = Vec2::new(6.4, 16.0);

/// A mutation produced by the router, applied atomically by the owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Push an undo snapshot.
    RecordHistory,
    /// Push an undo snapshot and hold the history guard.
    BeginAction,
    /// Release the history guard.
    EndAction,
    AddPath(Path),
    /// Replace paths with the same ids.
    ReplacePaths(Vec<Path>),
    MoveTextNodes(Vec<(TextNodeId, Point)>),
    /// Mask every path the eraser stroke touches.
    Erase { points: Vec<Point>, width: f64 },
    SetCamera(Camera),
    SetSelection(Selection),
    /// Create a text node at a world position.
    RequestTextNode { position: Point, kind: TextNodeKind },
    /// Place an image in a world rectangle.
    PlaceImage(Rect),
}

/// Read-only state the router needs to interpret an event.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub scene: &'a Scene,
    pub camera: Camera,
    pub selection: &'a Selection,
    pub tools: &'a ToolState,
    pub input: &'a InputState,
    pub config: &'a CanvasConfig,
    pub zoom_limits: ZoomLimits,
}

impl GestureContext<'_> {
    fn to_world(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    fn forces_pan(&self) -> bool {
        self.tools.mode == CanvasMode::Pan || self.input.forces_pan()
    }
}

/// The interaction currently in progress.
#[derive(Debug, Clone, Default)]
pub enum InteractionContext {
    #[default]
    Idle,
    Panning {
        pointer_id: u64,
        origin_screen: Point,
        origin_camera: Camera,
    },
    /// Freehand stroke (`shape: None`) or generated shape.
    Drawing {
        pointer_id: u64,
        draft: Path,
        origin: Point,
        shape: Option<ShapeTag>,
    },
    Erasing {
        pointer_id: u64,
        draft: Path,
    },
    CurveCreating {
        pointer_id: u64,
        draft: Path,
    },
    /// Dragging one control of a curve.
    CurveEditing {
        pointer_id: u64,
        path_id: PathId,
        handle: CurveHandle,
        origin_curve: Curve,
        grab_offset: Vec2,
        mutated: bool,
    },
    Moving {
        pointer_id: u64,
        start: Point,
        targets: TransformTargets,
        mutated: bool,
    },
    Scaling {
        pointer_id: u64,
        handle: ResizeHandle,
        origin_box: Rect,
        min_size: f64,
        targets: TransformTargets,
        mutated: bool,
    },
    Rotating {
        pointer_id: u64,
        center: Point,
        start_angle: f64,
        targets: TransformTargets,
        mutated: bool,
    },
    /// Screen-space drag rectangle merged into `base`.
    Marqueeing {
        pointer_id: u64,
        origin: Point,
        current: Point,
        base: Selection,
    },
    ImagePlacing {
        pointer_id: u64,
        start: Point,
        current: Point,
    },
    TouchPan {
        origin_camera: Camera,
        origin_centroid: Point,
    },
    TouchZoom {
        origin_camera: Camera,
        origin_distance: f64,
        anchor_world: Point,
    },
}

impl InteractionContext {
    /// Pointer owning a single-pointer interaction.
    pub fn pointer_id(&self) -> Option<u64> {
        match self {
            Self::Idle | Self::TouchPan { .. } | Self::TouchZoom { .. } => None,
            Self::Panning { pointer_id, .. }
            | Self::Drawing { pointer_id, .. }
            | Self::Erasing { pointer_id, .. }
            | Self::CurveCreating { pointer_id, .. }
            | Self::CurveEditing { pointer_id, .. }
            | Self::Moving { pointer_id, .. }
            | Self::Scaling { pointer_id, .. }
            | Self::Rotating { pointer_id, .. }
            | Self::Marqueeing { pointer_id, .. }
            | Self::ImagePlacing { pointer_id, .. } => Some(*pointer_id),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_touch_gesture(&self) -> bool {
        matches!(self, Self::TouchPan { .. } | Self::TouchZoom { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::Drawing { .. } => "drawing",
            Self::Erasing { .. } => "erasing",
            Self::CurveCreating { .. } => "curve-creating",
            Self::CurveEditing { .. } => "curve-editing",
            Self::Moving { .. } => "moving",
            Self::Scaling { .. } => "scaling",
            Self::Rotating { .. } => "rotating",
            Self::Marqueeing { .. } => "marqueeing",
            Self::ImagePlacing { .. } => "image-placing",
            Self::TouchPan { .. } => "touch-pan",
            Self::TouchZoom { .. } => "touch-zoom",
        }
    }
}

/// Pointer/touch state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureRouter {
    context: InteractionContext,
    touch_points: BTreeMap<u64, Point>,
    /// Curve in live-edit mode, kept between gestures.
    live_curve: Option<PathId>,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &InteractionContext {
        &self.context
    }

    pub fn live_curve(&self) -> Option<PathId> {
        self.live_curve
    }

    pub fn touch_count(&self) -> usize {
        self.touch_points.len()
    }

    /// Uncommitted path being drawn, erased or created.
    pub fn draft(&self) -> Option<&Path> {
        match &self.context {
            InteractionContext::Drawing { draft, .. }
            | InteractionContext::Erasing { draft, .. }
            | InteractionContext::CurveCreating { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Marquee rectangle in screen space.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.context {
            InteractionContext::Marqueeing { origin, current, .. } => Some(Rect::from_points(*origin, *current)),
            _ => None,
        }
    }

    /// Image rectangle being dragged, in world space.
    pub fn image_draft(&self) -> Option<Rect> {
        match &self.context {
            InteractionContext::ImagePlacing { start, current, .. } => Some(Rect::from_points(*start, *current)),
            _ => None,
        }
    }

    /// Pointer down.
    pub fn begin(&mut self, ctx: &GestureContext, input: PointerInput) -> Vec<SceneCommand> {
        if input.is_touch() {
            self.touch_points.insert(input.pointer_id, input.position);
            if self.touch_points.len() >= 2 {
                let commands = self.interrupt_for_touch(ctx);
                self.start_touch_gesture(ctx.camera);
                return commands;
            }
        }
        if input.button == MouseButton::Right {
            return Vec::new();
        }
        if !self.context.is_idle() {
            log::debug!(
                "pointer {} ignored while {} is in progress",
                input.pointer_id,
                self.context.name()
            );
            return Vec::new();
        }

        let world = ctx.to_world(input.position);
        let tools = ctx.tools;
        if input.is_touch() && tools.mode == CanvasMode::Draw && tools.tool.draws() && !ctx.input.forces_pan() {
            return self.begin_draw(ctx, input.pointer_id, world);
        }
        if let Some(commands) = self.begin_live_curve(ctx, &input, world) {
            return commands;
        }
        if ctx.forces_pan() || input.button == MouseButton::Middle {
            self.begin_pan(ctx, &input);
            return Vec::new();
        }

        match tools.tool {
            DrawTool::Cursor => self.begin_cursor(ctx, &input, world),
            tool if tool.draws() => self.begin_draw(ctx, input.pointer_id, world),
            DrawTool::Image => {
                self.context = InteractionContext::ImagePlacing {
                    pointer_id: input.pointer_id,
                    start: world,
                    current: world,
                };
                Vec::new()
            }
            DrawTool::Text => vec![SceneCommand::RequestTextNode {
                position: world,
                kind: TextNodeKind::Sticky,
            }],
            DrawTool::Textbox => vec![SceneCommand::RequestTextNode {
                position: world - TEXTBOX_OFFSET_PX / ctx.camera.scale,
                kind: TextNodeKind::Textbox,
            }],
            _ => Vec::new(),
        }
    }

    /// Pointer move.
    pub fn update(&mut self, ctx: &GestureContext, input: PointerInput) -> Vec<SceneCommand> {
        if input.is_touch() {
            if let Some(point) = self.touch_points.get_mut(&input.pointer_id) {
                *point = input.position;
            }
            if self.context.is_touch_gesture() {
                return self.update_touch_gesture(ctx).into_iter().collect();
            }
        }
        if self.context.pointer_id() != Some(input.pointer_id) {
            return Vec::new();
        }

        let world = ctx.to_world(input.position);
        match &mut self.context {
            InteractionContext::Panning {
                origin_screen,
                origin_camera,
                ..
            } => {
                let delta = input.position - *origin_screen;
                vec![SceneCommand::SetCamera(Camera {
                    x: origin_camera.x + delta.x,
                    y: origin_camera.y + delta.y,
                    scale: origin_camera.scale,
                })]
            }
            InteractionContext::Drawing {
                draft, origin, shape, ..
            } => {
                match shape {
                    Some(tag) => draft.points = shapes::generate(*tag, *origin, world),
                    None => {
                        if draft.points.last() != Some(&world) {
                            draft.points.push(world);
                        }
                    }
                }
                Vec::new()
            }
            InteractionContext::Erasing { draft, .. } => {
                if draft.points.last() != Some(&world) {
                    draft.points.push(world);
                }
                Vec::new()
            }
            InteractionContext::CurveCreating { draft, .. } => {
                let start = draft
                    .curve
                    .as_ref()
                    .and_then(|curve| curve.nodes.first())
                    .map_or(world, |node| node.anchor);
                draft.set_curve(Curve::between(start, world));
                Vec::new()
            }
            InteractionContext::CurveEditing {
                path_id,
                handle,
                origin_curve,
                grab_offset,
                mutated,
                ..
            } => {
                let Some(path) = ctx.scene.path(*path_id) else {
                    return Vec::new();
                };
                let curve = origin_curve
                    .with_handle_moved(*handle, world + *grab_offset)
                    .unwrap_or_else(|| origin_curve.clone());
                if !*mutated && curve == *origin_curve {
                    return Vec::new();
                }
                let mut next = path.clone();
                next.set_curve(curve);
                let mut commands = Vec::with_capacity(2);
                if !*mutated {
                    *mutated = true;
                    commands.push(SceneCommand::BeginAction);
                }
                commands.push(SceneCommand::ReplacePaths(vec![next]));
                commands
            }
            InteractionContext::Moving {
                start,
                targets,
                mutated,
                ..
            } => {
                let delta = world - *start;
                if !*mutated && delta == Vec2::ZERO {
                    return Vec::new();
                }
                transform_commands(targets, &Transform::Move(delta), mutated)
            }
            InteractionContext::Scaling {
                handle,
                origin_box,
                min_size,
                targets,
                mutated,
                ..
            } => {
                let to = selection::scaled_box(*origin_box, *handle, world, *min_size);
                if !*mutated && to == *origin_box {
                    return Vec::new();
                }
                transform_commands(targets, &Transform::Scale { from: *origin_box, to }, mutated)
            }
            InteractionContext::Rotating {
                center,
                start_angle,
                targets,
                mutated,
                ..
            } => match selection::rotation_angle(*center, *start_angle, world) {
                Some(angle) => transform_commands(
                    targets,
                    &Transform::Rotate {
                        center: *center,
                        angle,
                    },
                    mutated,
                ),
                None => Vec::new(),
            },
            InteractionContext::Marqueeing {
                origin, current, base, ..
            } => {
                *current = input.position;
                let rect = Rect::from_points(ctx.to_world(*origin), world);
                let (paths, texts) = selection::marquee_hits(ctx.scene, rect);
                let mut next = base.clone();
                next.select_paths(paths, true);
                next.select_texts(texts, true);
                if next == *ctx.selection {
                    Vec::new()
                } else {
                    vec![SceneCommand::SetSelection(next)]
                }
            }
            InteractionContext::ImagePlacing { current, .. } => {
                *current = world;
                Vec::new()
            }
            InteractionContext::Idle | InteractionContext::TouchPan { .. } | InteractionContext::TouchZoom { .. } => {
                Vec::new()
            }
        }
    }

    /// Pointer up: commit the interaction owned by `pointer_id`.
    pub fn end(&mut self, ctx: &GestureContext, pointer_id: u64) -> Vec<SceneCommand> {
        if self.touch_points.remove(&pointer_id).is_some() && self.context.is_touch_gesture() {
            if self.touch_points.len() >= 2 {
                self.start_touch_gesture(ctx.camera);
            } else {
                self.context = InteractionContext::Idle;
            }
            return Vec::new();
        }
        if self.context.pointer_id() != Some(pointer_id) {
            log::debug!("end for unknown pointer {pointer_id} ignored");
            return Vec::new();
        }
        self.finish(ctx)
    }

    /// Pointer cancel or leave.
    ///
    /// Image placement is discarded; every other interaction resolves as if
    /// the pointer went up.
    pub fn cancel(&mut self, ctx: &GestureContext, pointer_id: u64) -> Vec<SceneCommand> {
        if let InteractionContext::ImagePlacing { pointer_id: owner, .. } = self.context {
            if owner == pointer_id {
                log::debug!("image placement cancelled");
                self.touch_points.remove(&pointer_id);
                self.context = InteractionContext::Idle;
                return Vec::new();
            }
        }
        self.end(ctx, pointer_id)
    }

    /// Leave curve live editing.
    ///
    /// Outside the cursor tool the curve is also deselected.
    pub fn finish_curve_editing(&mut self, ctx: &GestureContext) -> Vec<SceneCommand> {
        let Some(id) = self.live_curve.take() else {
            return Vec::new();
        };
        if ctx.tools.tool == DrawTool::Cursor {
            return Vec::new();
        }
        let mut next = ctx.selection.clone();
        next.paths.retain(|path| *path != id);
        if next == *ctx.selection {
            Vec::new()
        } else {
            vec![SceneCommand::SetSelection(next)]
        }
    }

    /// Drop every in-flight interaction and touch, committing nothing.
    pub fn reset(&mut self) {
        self.context = InteractionContext::Idle;
        self.touch_points.clear();
        self.live_curve = None;
    }

    fn finish(&mut self, ctx: &GestureContext) -> Vec<SceneCommand> {
        match std::mem::take(&mut self.context) {
            InteractionContext::Idle
            | InteractionContext::Panning { .. }
            | InteractionContext::Marqueeing { .. }
            | InteractionContext::TouchPan { .. }
            | InteractionContext::TouchZoom { .. } => Vec::new(),
            InteractionContext::Drawing { draft, .. } => {
                vec![SceneCommand::RecordHistory, SceneCommand::AddPath(draft)]
            }
            InteractionContext::Erasing { draft, .. } => {
                if draft.points.is_empty() {
                    return Vec::new();
                }
                vec![SceneCommand::Erase {
                    points: draft.points,
                    width: draft.width,
                }]
            }
            InteractionContext::CurveCreating { draft, .. } => {
                let id = draft.id;
                self.live_curve = Some(id);
                vec![
                    SceneCommand::RecordHistory,
                    SceneCommand::AddPath(draft),
                    SceneCommand::SetSelection(Selection {
                        paths: vec![id],
                        texts: Vec::new(),
                    }),
                ]
            }
            InteractionContext::CurveEditing { mutated, .. }
            | InteractionContext::Moving { mutated, .. }
            | InteractionContext::Scaling { mutated, .. }
            | InteractionContext::Rotating { mutated, .. } => {
                if mutated {
                    vec![SceneCommand::EndAction]
                } else {
                    Vec::new()
                }
            }
            InteractionContext::ImagePlacing { start, current, .. } => {
                vec![SceneCommand::PlaceImage(image_rect(start, current, ctx.camera.scale))]
            }
        }
    }

    /// A second finger landed: drafts are thrown away, anything else ends.
    fn interrupt_for_touch(&mut self, ctx: &GestureContext) -> Vec<SceneCommand> {
        match self.context {
            InteractionContext::Drawing { .. }
            | InteractionContext::Erasing { .. }
            | InteractionContext::CurveCreating { .. }
            | InteractionContext::ImagePlacing { .. } => {
                log::debug!("{} cancelled by multi-touch", self.context.name());
                self.context = InteractionContext::Idle;
                Vec::new()
            }
            InteractionContext::Idle | InteractionContext::TouchPan { .. } | InteractionContext::TouchZoom { .. } => {
                Vec::new()
            }
            _ => self.finish(ctx),
        }
    }

    /// Three or more touches pan, two pinch-zoom.
    fn start_touch_gesture(&mut self, camera: Camera) {
        let points: Vec<Point> = self.touch_points.values().copied().collect();
        let centroid = centroid(&points);
        self.context = if points.len() >= 3 {
            InteractionContext::TouchPan {
                origin_camera: camera,
                origin_centroid: centroid,
            }
        } else {
            InteractionContext::TouchZoom {
                origin_camera: camera,
                origin_distance: average_distance(&points, centroid).max(1.0),
                anchor_world: camera.screen_to_world(centroid),
            }
        };
    }

    fn update_touch_gesture(&self, ctx: &GestureContext) -> Option<SceneCommand> {
        let points: Vec<Point> = self.touch_points.values().copied().collect();
        if points.len() < 2 {
            return None;
        }
        let centroid = centroid(&points);
        let camera = match self.context {
            InteractionContext::TouchPan {
                origin_camera,
                origin_centroid,
            } => {
                let delta = centroid - origin_centroid;
                Camera {
                    x: origin_camera.x + delta.x,
                    y: origin_camera.y + delta.y,
                    scale: origin_camera.scale,
                }
            }
            InteractionContext::TouchZoom {
                origin_camera,
                origin_distance,
                anchor_world,
            } => {
                let distance = average_distance(&points, centroid);
                let scale = ctx.zoom_limits.clamp(origin_camera.scale * (distance / origin_distance));
                if !scale.is_finite() {
                    return None;
                }
                Camera {
                    x: centroid.x - anchor_world.x * scale,
                    y: centroid.y - anchor_world.y * scale,
                    scale,
                }
            }
            _ => return None,
        };
        (camera != ctx.camera).then_some(SceneCommand::SetCamera(camera))
    }

    fn begin_pan(&mut self, ctx: &GestureContext, input: &PointerInput) {
        self.context = InteractionContext::Panning {
            pointer_id: input.pointer_id,
            origin_screen: input.position,
            origin_camera: ctx.camera,
        };
    }

    fn begin_draw(&mut self, ctx: &GestureContext, pointer_id: u64, world: Point) -> Vec<SceneCommand> {
        let style = ctx.tools.stroke_style();
        let shape = ctx.tools.shape;
        self.context = if ctx.tools.tool == DrawTool::Eraser {
            InteractionContext::Erasing {
                pointer_id,
                draft: Path::stroke(&style, world),
            }
        } else if shape == ShapeTag::Curve {
            InteractionContext::CurveCreating {
                pointer_id,
                draft: Path::curve(&style, world, world),
            }
        } else if shape == ShapeTag::Freeform {
            InteractionContext::Drawing {
                pointer_id,
                draft: Path::stroke(&style, world),
                origin: world,
                shape: None,
            }
        } else {
            InteractionContext::Drawing {
                pointer_id,
                draft: Path::shape(shape, &style, world, world),
                origin: world,
                shape: Some(shape),
            }
        };
        Vec::new()
    }

    /// Pointer down while a freshly created curve is in live-edit mode.
    ///
    /// Returns `None` when the event should fall through to normal routing.
    fn begin_live_curve(
        &mut self,
        ctx: &GestureContext,
        input: &PointerInput,
        world: Point,
    ) -> Option<Vec<SceneCommand>> {
        let id = self.live_curve?;
        let path = ctx.scene.path(id).filter(|path| path.is_curve());
        let still_live = ctx.tools.mode == CanvasMode::Draw
            && ctx.tools.shape == ShapeTag::Curve
            && ctx.selection.paths == [id]
            && path.is_some();
        if !still_live {
            self.live_curve = None;
            return None;
        }
        if ctx.tools.tool == DrawTool::Cursor {
            return None;
        }
        if input.button != MouseButton::Left {
            return Some(Vec::new());
        }
        let path = path?;
        let curve = path.curve.as_ref()?;

        let threshold = (LIVE_CURVE_THRESHOLD_PX / ctx.camera.scale).max(path.width * LIVE_CURVE_WIDTH_FACTOR);
        if let Some(handle) = curve.nearest_handle(world, threshold) {
            self.start_curve_drag(input.pointer_id, path.id, curve.clone(), handle, world, false);
            return Some(Vec::new());
        }
        if point_to_polyline_dist(world, &path.points) <= threshold * NODE_INSERT_FACTOR {
            let (inserted, index) = curve.insert_node_at(world);
            let mut next = path.clone();
            next.set_curve(inserted.clone());
            self.start_curve_drag(input.pointer_id, path.id, inserted, CurveHandle::anchor(index), world, true);
            return Some(vec![SceneCommand::BeginAction, SceneCommand::ReplacePaths(vec![next])]);
        }
        Some(self.finish_curve_editing(ctx))
    }

    fn start_curve_drag(
        &mut self,
        pointer_id: u64,
        path_id: PathId,
        curve: Curve,
        handle: CurveHandle,
        world: Point,
        mutated: bool,
    ) {
        let grab_offset = curve.handle_point(handle).map_or(Vec2::ZERO, |point| point - world);
        self.context = InteractionContext::CurveEditing {
            pointer_id,
            path_id,
            handle,
            origin_curve: curve,
            grab_offset,
            mutated,
        };
    }

    fn begin_cursor(&mut self, ctx: &GestureContext, input: &PointerInput, world: Point) -> Vec<SceneCommand> {
        if input.button != MouseButton::Left {
            return Vec::new();
        }
        if self.begin_cursor_curve_handle(ctx, input, world) || self.begin_selection_handle(ctx, input, world) {
            return Vec::new();
        }

        let tolerance = ctx.config.hit_tolerance_px / ctx.camera.scale;
        let hit = selection::hit_test_paths(ctx.scene, world, tolerance);
        match hit {
            Some(id) if input.modifiers.shift => {
                let mut next = ctx.selection.clone();
                next.toggle_path(id);
                vec![SceneCommand::SetSelection(next)]
            }
            None if input.modifiers.shift => {
                self.context = InteractionContext::Marqueeing {
                    pointer_id: input.pointer_id,
                    origin: input.position,
                    current: input.position,
                    base: ctx.selection.clone(),
                };
                Vec::new()
            }
            Some(id) => {
                let moves_group = ctx.selection.contains_path(id) && ctx.selection.paths.len() > 1;
                let next = if moves_group {
                    ctx.selection.clone()
                } else {
                    Selection {
                        paths: vec![id],
                        texts: Vec::new(),
                    }
                };
                let unlocked: Vec<PathId> = next
                    .paths
                    .iter()
                    .copied()
                    .filter(|id| ctx.scene.path(*id).is_some_and(|path| !path.locked))
                    .collect();
                let forced: HashSet<TextNodeId> = ctx.scene.attached_text_nodes(&unlocked).into_iter().collect();
                let targets = TransformTargets::capture(ctx.scene, &next.paths, &next.texts, &forced);
                if !targets.is_empty() {
                    self.context = InteractionContext::Moving {
                        pointer_id: input.pointer_id,
                        start: world,
                        targets,
                        mutated: false,
                    };
                }
                if next == *ctx.selection {
                    Vec::new()
                } else {
                    vec![SceneCommand::SetSelection(next)]
                }
            }
            None => {
                self.begin_pan(ctx, input);
                if ctx.selection.is_empty() {
                    Vec::new()
                } else {
                    vec![SceneCommand::SetSelection(Selection::default())]
                }
            }
        }
    }

    /// Control points of a single selected, unlocked curve.
    fn begin_cursor_curve_handle(&mut self, ctx: &GestureContext, input: &PointerInput, world: Point) -> bool {
        let [id] = ctx.selection.paths.as_slice() else {
            return false;
        };
        let Some(path) = ctx.scene.path(*id).filter(|path| path.is_curve() && !path.locked) else {
            return false;
        };
        let Some(curve) = path.curve.as_ref() else {
            return false;
        };
        let threshold = HANDLE_HIT_RADIUS_PX / ctx.camera.scale;
        match curve.nearest_handle(world, threshold) {
            Some(handle) => {
                self.start_curve_drag(input.pointer_id, path.id, curve.clone(), handle, world, false);
                true
            }
            None => false,
        }
    }

    /// Resize and rotate handles around the selected paths.
    fn begin_selection_handle(&mut self, ctx: &GestureContext, input: &PointerInput, world: Point) -> bool {
        let Some(kind) = selection::selection_box(ctx.scene, &ctx.selection.paths, &ctx.camera)
            .and_then(|screen_box| selection::hit_test_handles(screen_box, input.position))
        else {
            return false;
        };
        let targets = TransformTargets::capture(ctx.scene, &ctx.selection.paths, &[], &HashSet::new());
        let Some(origin_box) = targets.bounds() else {
            return false;
        };
        let pointer_id = input.pointer_id;
        self.context = match kind {
            HandleKind::Resize(handle) => InteractionContext::Scaling {
                pointer_id,
                handle,
                origin_box,
                min_size: ctx.config.min_scale_size_px / ctx.camera.scale,
                targets,
                mutated: false,
            },
            HandleKind::Rotate => {
                let center = origin_box.center();
                InteractionContext::Rotating {
                    pointer_id,
                    center,
                    start_angle: (world - center).atan2(),
                    targets,
                    mutated: false,
                }
            }
        };
        true
    }
}

/// Commands for one transform frame; the first frame opens the action.
fn transform_commands(targets: &TransformTargets, transform: &Transform, mutated: &mut bool) -> Vec<SceneCommand> {
    let mut commands = Vec::with_capacity(3);
    if !*mutated {
        *mutated = true;
        commands.push(SceneCommand::BeginAction);
    }
    commands.push(SceneCommand::ReplacePaths(targets.transformed_paths(transform)));
    let texts = targets.transformed_texts(transform);
    if !texts.is_empty() {
        commands.push(SceneCommand::MoveTextNodes(texts));
    }
    commands
}

/// World rectangle for an image drag; tiny drags get the default box.
fn image_rect(start: Point, end: Point, scale: f64) -> Rect {
    let threshold = (IMAGE_CLICK_PX / scale).max(IMAGE_CLICK_MIN);
    let delta = end - start;
    if delta.x.abs() < threshold && delta.y.abs() < threshold {
        return Rect::from_center_size(start, DEFAULT_IMAGE_SIZE);
    }
    Rect::from_origin_size(
        Point::new(start.x.min(end.x), start.y.min(end.y)),
        Size::new(delta.x.abs().max(MIN_IMAGE_EDGE), delta.y.abs().max(MIN_IMAGE_EDGE)),
    )
}

fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

fn average_distance(points: &[Point], center: Point) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.distance(center)).sum::<f64>() / points.len() as f64
}
