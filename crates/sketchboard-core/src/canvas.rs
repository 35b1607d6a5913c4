//! Canvas state and the operations the UI layer drives.

use crate::camera::{Camera, ZoomDirection, ZoomLimits};
use crate::config::CanvasConfig;
use crate::document::{ApplyOptions, DocumentError, SceneDocument, merge_by_id};
use crate::eraser::apply_eraser;
use crate::gesture::{GestureContext, GestureRouter, SceneCommand};
use crate::history::History;
use crate::input::{InputState, KeyEvent, Modifiers, PointerInput};
use crate::observer::{CanvasEvent, CanvasObserver};
use crate::scene::{ImageNode, ImageNodeId, Path, PathId, Scene, TextNode, TextNodeId, TextNodeKind};
use crate::selection::Selection;
use crate::shapes::ShapeTag;
use crate::tools::{CanvasMode, DrawTool, ToolState};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Offset applied to a duplicated text node.
const TEXT_DUPLICATE_OFFSET: f64 = 32.0;

/// Z-order change for the selection or a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZOrder {
    Front,
    Back,
    Forward,
    Backward,
}

/// Optional fields for a new text node. Unset fields use the tool defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNodeOptions {
    pub text: Option<String>,
    pub font_scale: Option<f64>,
    pub font_family: Option<String>,
    pub locked: Option<bool>,
    pub color: Option<String>,
    pub size: Option<Size>,
    pub parent_path_id: Option<PathId>,
}

/// Owns the scene and everything needed to edit it interactively.
///
/// Gesture events go through the [`GestureRouter`]; the commands it returns
/// are applied here in order, and observers are told what changed.
pub struct Canvas {
    scene: Scene,
    camera: Camera,
    history: History,
    selection: Selection,
    router: GestureRouter,
    tools: ToolState,
    input: InputState,
    config: CanvasConfig,
    viewport: Size,
    clipboard: Vec<Path>,
    paste_count: u32,
    /// Source used for the next image placement.
    pending_image: Option<String>,
    observers: Vec<Box<dyn CanvasObserver>>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            history: History::with_max_depth(config.max_history_depth),
            selection: Selection::default(),
            router: GestureRouter::new(),
            tools: ToolState::default(),
            input: InputState::new(),
            config,
            viewport: Size::ZERO,
            clipboard: Vec::new(),
            paste_count: 0,
            pending_image: None,
            observers: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn router(&self) -> &GestureRouter {
        &self.router
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn clipboard(&self) -> &[Path] {
        &self.clipboard
    }

    pub fn add_observer(&mut self, observer: Box<dyn CanvasObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, event: CanvasEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Zoom range for the current viewport.
    pub fn zoom_limits(&self) -> ZoomLimits {
        self.config.zoom_limits(self.viewport.width)
    }

    // --- gestures ---

    pub fn begin_gesture(&mut self, input: PointerInput) {
        self.route(|router, ctx| router.begin(ctx, input));
    }

    pub fn update_gesture(&mut self, input: PointerInput) {
        self.route(|router, ctx| router.update(ctx, input));
    }

    pub fn end_gesture(&mut self, pointer_id: u64) {
        self.route(|router, ctx| router.end(ctx, pointer_id));
    }

    pub fn cancel_gesture(&mut self, pointer_id: u64) {
        self.route(|router, ctx| router.cancel(ctx, pointer_id));
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) {
        self.input.handle_key_event(event);
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    /// Wheel pans, or zooms around the pointer with ctrl/meta held.
    pub fn wheel(&mut self, delta: Vec2, screen_point: Point, modifiers: Modifiers) -> bool {
        let limits = self.zoom_limits();
        self.camera.wheel(delta, screen_point, modifiers.command(), limits)
    }

    fn route(&mut self, f: impl FnOnce(&mut GestureRouter, &GestureContext) -> Vec<SceneCommand>) {
        let ctx = GestureContext {
            scene: &self.scene,
            camera: self.camera,
            selection: &self.selection,
            tools: &self.tools,
            input: &self.input,
            config: &self.config,
            zoom_limits: self.config.zoom_limits(self.viewport.width),
        };
        let commands = f(&mut self.router, &ctx);
        self.apply_commands(commands);
    }

    /// Apply router output in order, then notify observers once.
    pub fn apply_commands(&mut self, commands: Vec<SceneCommand>) {
        let mut scene_changed = false;
        let mut selection_changed = false;
        let mut events = Vec::new();

        for command in commands {
            match command {
                SceneCommand::RecordHistory => {
                    self.history.record(&self.scene);
                }
                SceneCommand::BeginAction => {
                    self.history.begin_action(&self.scene);
                }
                SceneCommand::EndAction => self.history.end_guard(),
                SceneCommand::AddPath(path) => {
                    self.scene.add_path(path);
                    scene_changed = true;
                }
                SceneCommand::ReplacePaths(paths) => {
                    for path in paths {
                        if let Some(slot) = self.scene.path_mut(path.id) {
                            *slot = path;
                            scene_changed = true;
                        }
                    }
                }
                SceneCommand::MoveTextNodes(moves) => {
                    for (id, origin) in moves {
                        if let Some(node) = self.scene.text_node_mut(id) {
                            node.set_origin(origin);
                            scene_changed = true;
                        }
                    }
                }
                SceneCommand::Erase { points, width } => {
                    scene_changed |= self.erase(&points, width);
                }
                SceneCommand::SetCamera(camera) => self.camera = camera,
                SceneCommand::SetSelection(selection) => {
                    if selection != self.selection {
                        self.selection = selection;
                        selection_changed = true;
                    }
                }
                SceneCommand::RequestTextNode { position, kind } => {
                    scene_changed |= self
                        .create_text_node(kind, position, TextNodeOptions::default())
                        .is_some();
                }
                SceneCommand::PlaceImage(rect) => match self.pending_image.take() {
                    Some(src) => {
                        self.scene.add_image_node(ImageNode::new(rect, src));
                        scene_changed = true;
                    }
                    None => events.push(CanvasEvent::ImagePlacementRequested(rect)),
                },
            }
        }

        if scene_changed {
            self.emit(CanvasEvent::SceneChanged);
        }
        if selection_changed {
            self.emit(CanvasEvent::SelectionChanged);
        }
        for event in events {
            self.emit(event);
        }
    }

    /// Mask every path the stroke touches. History is only recorded when
    /// something was hit.
    fn erase(&mut self, points: &[Point], width: f64) -> bool {
        let mut paths = self.scene.paths().to_vec();
        let affected = apply_eraser(&mut paths, points, width);
        if affected.is_empty() {
            return false;
        }
        self.history.record(&self.scene);
        self.scene.set_paths(paths);
        true
    }

    // --- history and view ---

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.scene) {
            log::debug!("nothing to undo");
            return false;
        }
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.scene) {
            log::debug!("nothing to redo");
            return false;
        }
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.emit(CanvasEvent::SceneChanged);
        if self.selection.retain_existing(&self.scene) {
            self.emit(CanvasEvent::SelectionChanged);
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        let limits = self.zoom_limits();
        self.camera.zoom_step(ZoomDirection::In, self.viewport, limits)
    }

    pub fn zoom_out(&mut self) -> bool {
        let limits = self.zoom_limits();
        self.camera.zoom_step(ZoomDirection::Out, self.viewport, limits)
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera.sanitize(self.zoom_limits());
    }

    /// Record the viewport size; narrow viewports pull the zoom under their cap.
    pub fn set_viewport_size(&mut self, size: Size) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        let limits = self.zoom_limits();
        if self.camera.fit_zoom_limits(size, limits) {
            log::debug!("zoom refitted to {} for a {}px viewport", self.camera.scale, size.width);
        }
        self.emit(CanvasEvent::ViewportSizeChanged(size));
    }

    // --- tools ---

    pub fn set_mode(&mut self, mode: CanvasMode) {
        self.tools.mode = mode;
        self.after_tool_change();
    }

    pub fn set_tool(&mut self, tool: DrawTool) {
        self.tools.tool = tool;
        self.after_tool_change();
    }

    pub fn set_shape(&mut self, shape: ShapeTag) {
        self.tools.shape = shape;
        self.after_tool_change();
    }

    pub fn set_stroke_color(&mut self, color: impl Into<String>) {
        self.tools.stroke_color = color.into();
    }

    pub fn set_stroke_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.tools.stroke_scale = scale;
        } else {
            log::warn!("ignoring non-finite stroke scale");
        }
    }

    pub fn set_default_text_scale(&mut self, scale: Option<f64>) {
        self.tools.default_text_scale = scale.filter(|s| s.is_finite());
    }

    pub fn set_default_text_font(&mut self, font: &str) {
        let font = font.trim();
        if !font.is_empty() {
            self.tools.default_text_font = font.to_string();
        }
    }

    /// Leaving curve mode ends live editing, and leaving the cursor tool
    /// drops the selection unless a curve is still being edited.
    fn after_tool_change(&mut self) {
        if !self.tools.is_curve_mode() {
            self.route(|router, ctx| router.finish_curve_editing(ctx));
        }
        let cursor = self.tools.mode == CanvasMode::Draw && self.tools.tool == DrawTool::Cursor;
        if !cursor && self.router.live_curve().is_none() && !self.selection.paths.is_empty() {
            self.selection.paths.clear();
            self.emit(CanvasEvent::SelectionChanged);
        }
    }

    /// Set the pending image source used by the next placement.
    pub fn set_pending_image(&mut self, src: Option<String>) {
        self.pending_image = src;
    }

    // --- selection ---

    pub fn set_selection(&mut self, selection: Selection) {
        self.apply_commands(vec![SceneCommand::SetSelection(selection)]);
    }

    pub fn select_all(&mut self) {
        let selection = Selection {
            paths: self.scene.ink_paths().map(|path| path.id).collect(),
            texts: self.scene.text_nodes().iter().map(|node| node.id).collect(),
        };
        self.set_selection(selection);
    }

    /// Select one text node; path selection is dropped.
    pub fn select_text_node(&mut self, id: TextNodeId, additive: bool) {
        let mut next = self.selection.clone();
        next.paths.clear();
        next.select_texts([id], additive);
        self.set_selection(next);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::default());
    }

    fn selected_paths(&self) -> Vec<Path> {
        self.scene
            .paths()
            .iter()
            .filter(|path| self.selection.contains_path(path.id))
            .cloned()
            .collect()
    }

    // --- clipboard ---

    /// Copy the selected paths. Returns `false` when nothing was copied.
    pub fn copy_selection(&mut self) -> bool {
        if self.tools.mode != CanvasMode::Draw {
            return false;
        }
        let paths = self.selected_paths();
        if paths.is_empty() {
            return false;
        }
        self.clipboard = paths;
        self.paste_count = 0;
        true
    }

    /// Paste the clipboard, each paste shifted a step further.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() || self.tools.mode != CanvasMode::Draw {
            return false;
        }
        self.paste_count += 1;
        let offset = self.paste_count as f64 * self.config.paste_offset_step;
        let pasted: Vec<Path> = self
            .clipboard
            .iter()
            .map(|path| path.duplicated(Vec2::new(offset, offset)))
            .collect();
        let selection = Selection {
            paths: pasted.iter().map(|path| path.id).collect(),
            texts: Vec::new(),
        };
        let mut commands = vec![SceneCommand::RecordHistory];
        commands.extend(pasted.into_iter().map(SceneCommand::AddPath));
        commands.push(SceneCommand::SetSelection(selection));
        self.apply_commands(commands);
        true
    }

    pub fn cut_selection(&mut self) -> bool {
        self.copy_selection() && self.delete_selection()
    }

    /// Delete the selected paths and the text nodes attached to them.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.paths.is_empty() {
            return false;
        }
        let ids: HashSet<PathId> = self.selection.paths.iter().copied().collect();
        self.history.record(&self.scene);
        let (removed, cascaded) = self.scene.remove_paths(&ids);
        log::debug!("deleted {} paths and {} attached text nodes", removed.len(), cascaded.len());
        self.selection.paths.clear();
        self.selection.texts.retain(|id| !cascaded.contains(id));
        self.emit(CanvasEvent::SceneChanged);
        self.emit(CanvasEvent::SelectionChanged);
        true
    }

    pub fn duplicate_selection(&mut self) -> bool {
        self.copy_selection() && self.paste()
    }

    /// Lock or unlock the selected paths. Records history only on change.
    pub fn set_selection_locked(&mut self, locked: bool) -> bool {
        let changed: Vec<PathId> = self
            .scene
            .paths()
            .iter()
            .filter(|path| self.selection.contains_path(path.id) && path.locked != locked)
            .map(|path| path.id)
            .collect();
        if changed.is_empty() {
            return false;
        }
        self.history.record(&self.scene);
        for id in changed {
            if let Some(path) = self.scene.path_mut(id) {
                path.locked = locked;
            }
        }
        self.emit(CanvasEvent::SceneChanged);
        true
    }

    /// Move the selected paths in z-order. Records history only on change.
    pub fn reorder_selection(&mut self, order: ZOrder) -> bool {
        if self.selection.paths.is_empty() {
            return false;
        }
        let selected: HashSet<PathId> = self.selection.paths.iter().copied().collect();
        let current = self.scene.paths();
        let next = reorder(current, order, |path| selected.contains(&path.id));
        if next.iter().map(|p| p.id).eq(current.iter().map(|p| p.id)) {
            return false;
        }
        self.history.record(&self.scene);
        self.scene.set_paths(next);
        self.emit(CanvasEvent::SceneChanged);
        true
    }

    // --- text nodes ---

    /// Create a text node at a world position.
    ///
    /// Text boxes without an explicit font scale need a default text scale;
    /// `None` is returned when it has not been chosen.
    pub fn add_text_node(&mut self, kind: TextNodeKind, position: Point, options: TextNodeOptions) -> Option<TextNodeId> {
        let id = self.create_text_node(kind, position, options)?;
        self.emit(CanvasEvent::SceneChanged);
        Some(id)
    }

    fn create_text_node(&mut self, kind: TextNodeKind, position: Point, options: TextNodeOptions) -> Option<TextNodeId> {
        let font_scale = match (options.font_scale, kind) {
            (Some(scale), _) => scale,
            (None, TextNodeKind::Textbox) => match self.tools.default_text_scale {
                Some(scale) => scale,
                None => {
                    log::warn!("text box requested before a default text size was chosen");
                    return None;
                }
            },
            (None, _) => 1.0,
        };
        let mut node = TextNode::new(kind, position);
        node.text = options.text.unwrap_or_default();
        node.font_scale = Some(font_scale);
        node.font_family = Some(options.font_family.unwrap_or_else(|| self.tools.default_text_font.clone()));
        node.locked = Some(options.locked.unwrap_or(kind == TextNodeKind::Label));
        node.color = Some(options.color.unwrap_or_else(|| self.tools.stroke_color.clone()));
        node.width = options.size.map(|size| size.width);
        node.height = options.size.map(|size| size.height);
        node.parent_path_id = options.parent_path_id;

        let id = node.id;
        self.history.record(&self.scene);
        self.scene.add_text_node(node);
        Some(id)
    }

    /// Edit a text node in place. Not recorded in history.
    pub fn update_text_node(&mut self, id: TextNodeId, update: impl FnOnce(&mut TextNode)) -> bool {
        let Some(mut node) = self.scene.text_node(id).cloned() else {
            return false;
        };
        update(&mut node);
        node.id = id;
        if !self.scene.replace_text_node(node) {
            return false;
        }
        self.emit(CanvasEvent::SceneChanged);
        true
    }

    pub fn move_text_node(&mut self, id: TextNodeId, origin: Point) -> bool {
        self.update_text_node(id, |node| node.set_origin(origin))
    }

    pub fn remove_text_node(&mut self, id: TextNodeId) -> bool {
        if self.scene.text_node(id).is_none() {
            return false;
        }
        self.history.record(&self.scene);
        self.scene.remove_text_node(id);
        self.emit(CanvasEvent::SceneChanged);
        if self.selection.retain_existing(&self.scene) {
            self.emit(CanvasEvent::SelectionChanged);
        }
        true
    }

    /// Copy a text node next to the original, unlocked and auto-sized.
    pub fn duplicate_text_node(&mut self, id: TextNodeId) -> Option<TextNodeId> {
        let source = self.scene.text_node(id)?;
        let mut copy = source.clone();
        copy.id = uuid::Uuid::new_v4();
        copy.translate(Vec2::new(TEXT_DUPLICATE_OFFSET, TEXT_DUPLICATE_OFFSET));
        copy.width = None;
        copy.height = None;
        copy.locked = Some(false);
        let copy_id = copy.id;
        self.history.record(&self.scene);
        self.scene.add_text_node(copy);
        self.emit(CanvasEvent::SceneChanged);
        Some(copy_id)
    }

    pub fn reorder_text_node(&mut self, id: TextNodeId, order: ZOrder) -> bool {
        let current = self.scene.text_nodes();
        let next = reorder(current, order, |node| node.id == id);
        if next.iter().map(|n| n.id).eq(current.iter().map(|n| n.id)) {
            return false;
        }
        self.scene.set_text_nodes(next);
        self.emit(CanvasEvent::SceneChanged);
        true
    }

    // --- image nodes ---

    /// Images are not part of undo history.
    pub fn add_image_node(&mut self, rect: Rect, src: impl Into<String>) -> ImageNodeId {
        let node = ImageNode::new(rect, src);
        let id = node.id;
        self.scene.add_image_node(node);
        self.emit(CanvasEvent::SceneChanged);
        id
    }

    pub fn remove_image_node(&mut self, id: ImageNodeId) -> bool {
        if self.scene.remove_image_node(id).is_none() {
            return false;
        }
        self.emit(CanvasEvent::SceneChanged);
        true
    }

    // --- scene exchange ---

    /// Replace the scene from an untrusted JSON document.
    pub fn apply_scene(&mut self, value: &serde_json::Value, options: ApplyOptions) -> Result<(), DocumentError> {
        let document = SceneDocument::from_value(value)?;
        self.apply_document(document, options);
        Ok(())
    }

    /// Replace the scene wholesale.
    pub fn apply_document(&mut self, document: SceneDocument, options: ApplyOptions) {
        let SceneDocument {
            camera,
            mut paths,
            mut text_nodes,
            mut image_nodes,
            stroke_color,
            stroke_scale,
            default_text_scale,
            default_text_font,
            ..
        } = document;

        if options.merge_local {
            paths = merge_by_id(paths, self.scene.paths(), |path| path.id);
            text_nodes = merge_by_id(text_nodes, self.scene.text_nodes(), |node| node.id);
            image_nodes = merge_by_id(image_nodes, self.scene.image_nodes(), |node| node.id);
        }
        self.scene = Scene::from_parts(paths, text_nodes, image_nodes);

        self.tools.stroke_color = stroke_color;
        self.tools.stroke_scale = stroke_scale;
        self.tools.default_text_scale = default_text_scale;
        self.tools.default_text_font = default_text_font;

        if !options.preserve_view {
            self.camera = camera.sanitize(self.zoom_limits());
            self.history.clear();
            self.router.reset();
        }
        log::info!(
            "scene applied: {} paths, {} text nodes, {} images",
            self.scene.paths().len(),
            self.scene.text_nodes().len(),
            self.scene.image_nodes().len()
        );

        self.emit(CanvasEvent::SceneChanged);
        if self.selection.retain_existing(&self.scene) {
            self.emit(CanvasEvent::SelectionChanged);
        }
    }

    /// Snapshot stamped with the current time.
    pub fn export_scene(&self) -> SceneDocument {
        self.export_scene_at(chrono::Utc::now().to_rfc3339())
    }

    pub fn export_scene_at(&self, exported_at: impl Into<String>) -> SceneDocument {
        SceneDocument::capture(&self.scene, &self.camera, &self.tools, exported_at)
    }
}

/// Reordered copy of `items`. Front and back move the matching items as a
/// block keeping their relative order; forward and backward swap each
/// matching item with its unmatched neighbour.
fn reorder<T: Clone>(items: &[T], order: ZOrder, selected: impl Fn(&T) -> bool) -> Vec<T> {
    let mut next = items.to_vec();
    match order {
        ZOrder::Front | ZOrder::Back => {
            let (chosen, others): (Vec<T>, Vec<T>) = next.into_iter().partition(|item| selected(item));
            if chosen.is_empty() || others.is_empty() {
                return items.to_vec();
            }
            next = if order == ZOrder::Front {
                others.into_iter().chain(chosen).collect()
            } else {
                chosen.into_iter().chain(others).collect()
            };
        }
        ZOrder::Forward => {
            for i in (0..next.len().saturating_sub(1)).rev() {
                if selected(&next[i]) && !selected(&next[i + 1]) {
                    next.swap(i, i + 1);
                }
            }
        }
        ZOrder::Backward => {
            for i in 1..next.len() {
                if selected(&next[i]) && !selected(&next[i - 1]) {
                    next.swap(i, i - 1);
                }
            }
        }
    }
    next
}
