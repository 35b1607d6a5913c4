//! Scene model: paths, text nodes and image nodes.

mod nodes;
mod path;

pub use nodes::{ImageNode, ImageNodeId, TextNode, TextNodeId, TextNodeKind};
pub(crate) use path::contains_inclusive;
pub use path::{ERASE_COLOR, EraserMask, LineCap, MaskId, Path, PathId, PathKind};

use kurbo::Rect;
use std::collections::{HashMap, HashSet};

/// Everything drawn on the canvas.
///
/// Paths are kept in z-order, back to front. Text nodes that name a parent
/// path are tracked in a reverse index so that cascades and forced moves do
/// not have to scan every node.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    paths: Vec<Path>,
    text_nodes: Vec<TextNode>,
    image_nodes: Vec<ImageNode>,
    children: HashMap<PathId, Vec<TextNodeId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from whole collections.
    pub fn from_parts(paths: Vec<Path>, text_nodes: Vec<TextNode>, image_nodes: Vec<ImageNode>) -> Self {
        let mut scene = Self {
            paths,
            text_nodes,
            image_nodes,
            children: HashMap::new(),
        };
        scene.rebuild_index();
        scene
    }

    /// Recompute the parent to children index from the text nodes.
    pub fn rebuild_index(&mut self) {
        self.children.clear();
        for node in &self.text_nodes {
            if let Some(parent) = node.parent_path_id {
                self.children.entry(parent).or_default().push(node.id);
            }
        }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn text_nodes(&self) -> &[TextNode] {
        &self.text_nodes
    }

    pub fn image_nodes(&self) -> &[ImageNode] {
        &self.image_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.text_nodes.is_empty() && self.image_nodes.is_empty()
    }

    // --- paths ---

    /// Add a path on top of the stack.
    pub fn add_path(&mut self, path: Path) {
        self.paths.push(path);
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.iter().find(|path| path.id == id)
    }

    pub fn path_mut(&mut self, id: PathId) -> Option<&mut Path> {
        self.paths.iter_mut().find(|path| path.id == id)
    }

    /// Remove a single path without touching attached text nodes.
    pub fn remove_path(&mut self, id: PathId) -> Option<Path> {
        let index = self.paths.iter().position(|path| path.id == id)?;
        Some(self.paths.remove(index))
    }

    /// Remove paths and every text node attached to them.
    ///
    /// Returns the removed paths and the ids of the cascaded text nodes.
    pub fn remove_paths(&mut self, ids: &HashSet<PathId>) -> (Vec<Path>, Vec<TextNodeId>) {
        let (removed, kept): (Vec<Path>, Vec<Path>) =
            std::mem::take(&mut self.paths).into_iter().partition(|path| ids.contains(&path.id));
        self.paths = kept;

        let cascaded: HashSet<TextNodeId> = removed
            .iter()
            .filter_map(|path| self.children.remove(&path.id))
            .flatten()
            .collect();
        if !cascaded.is_empty() {
            self.text_nodes.retain(|node| !cascaded.contains(&node.id));
        }
        (removed, cascaded.into_iter().collect())
    }

    /// Replace every path, keeping text and image nodes.
    pub fn set_paths(&mut self, paths: Vec<Path>) {
        self.paths = paths;
    }

    pub(crate) fn paths_mut(&mut self) -> &mut Vec<Path> {
        &mut self.paths
    }

    /// Paths that can be selected (everything but stray eraser strokes).
    pub fn ink_paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().filter(|path| !path.is_eraser())
    }

    /// Union of the bounding boxes of the given paths.
    pub fn bounds_of<'a>(&'a self, ids: impl IntoIterator<Item = &'a PathId>) -> Option<Rect> {
        ids.into_iter()
            .filter_map(|id| self.path(*id))
            .filter_map(Path::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    // --- text nodes ---

    pub fn add_text_node(&mut self, node: TextNode) {
        if let Some(parent) = node.parent_path_id {
            self.children.entry(parent).or_default().push(node.id);
        }
        self.text_nodes.push(node);
    }

    pub fn text_node(&self, id: TextNodeId) -> Option<&TextNode> {
        self.text_nodes.iter().find(|node| node.id == id)
    }

    pub fn text_node_mut(&mut self, id: TextNodeId) -> Option<&mut TextNode> {
        self.text_nodes.iter_mut().find(|node| node.id == id)
    }

    /// Replace a text node in place, keeping the reverse index in sync.
    pub fn replace_text_node(&mut self, node: TextNode) -> bool {
        let Some(index) = self.text_nodes.iter().position(|n| n.id == node.id) else {
            return false;
        };
        let previous_parent = self.text_nodes[index].parent_path_id;
        if previous_parent != node.parent_path_id {
            if let Some(parent) = previous_parent {
                self.unlink_child(parent, node.id);
            }
            if let Some(parent) = node.parent_path_id {
                self.children.entry(parent).or_default().push(node.id);
            }
        }
        self.text_nodes[index] = node;
        true
    }

    pub fn remove_text_node(&mut self, id: TextNodeId) -> Option<TextNode> {
        let index = self.text_nodes.iter().position(|node| node.id == id)?;
        let node = self.text_nodes.remove(index);
        if let Some(parent) = node.parent_path_id {
            self.unlink_child(parent, id);
        }
        Some(node)
    }

    /// Replace every text node and rebuild the index.
    pub fn set_text_nodes(&mut self, nodes: Vec<TextNode>) {
        self.text_nodes = nodes;
        self.rebuild_index();
    }

    /// Ids of the text nodes attached to any of `path_ids`.
    pub fn attached_text_nodes<'a>(&self, path_ids: impl IntoIterator<Item = &'a PathId>) -> Vec<TextNodeId> {
        path_ids
            .into_iter()
            .filter_map(|id| self.children.get(id))
            .flatten()
            .copied()
            .collect()
    }

    fn unlink_child(&mut self, parent: PathId, child: TextNodeId) {
        if let Some(children) = self.children.get_mut(&parent) {
            children.retain(|id| *id != child);
            if children.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    // --- image nodes ---

    pub fn add_image_node(&mut self, node: ImageNode) {
        self.image_nodes.push(node);
    }

    pub fn remove_image_node(&mut self, id: ImageNodeId) -> Option<ImageNode> {
        let index = self.image_nodes.iter().position(|node| node.id == id)?;
        Some(self.image_nodes.remove(index))
    }
}
