//! Snapshot-based undo/redo.

use crate::scene::{Path, Scene, TextNode};

/// Paths and text nodes at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub paths: Vec<Path>,
    pub text_nodes: Vec<TextNode>,
}

impl Snapshot {
    pub fn capture(scene: &Scene) -> Self {
        Self {
            paths: scene.paths().to_vec(),
            text_nodes: scene.text_nodes().to_vec(),
        }
    }

    /// Write this snapshot back into the scene; image nodes are untouched.
    pub fn restore(self, scene: &mut Scene) {
        scene.set_paths(self.paths);
        scene.set_text_nodes(self.text_nodes);
    }
}

/// Undo and redo stacks.
///
/// One snapshot is taken before each discrete user action. While the guard
/// is held, further [`History::record`] calls are ignored so the frames of a
/// continuous drag collapse into that single snapshot.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    guarded: bool,
    /// Oldest snapshots are evicted beyond this depth. `None` keeps everything.
    max_depth: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Push the current state before a mutation. Clears the redo stack.
    ///
    /// Returns `false` when ignored because the guard is held.
    pub fn record(&mut self, scene: &Scene) -> bool {
        if self.guarded {
            return false;
        }
        self.past.push(Snapshot::capture(scene));
        self.future.clear();
        if let Some(max) = self.max_depth {
            let excess = self.past.len().saturating_sub(max);
            self.past.drain(..excess);
        }
        true
    }

    /// Record once, then hold the guard until [`History::end_guard`].
    pub fn begin_action(&mut self, scene: &Scene) -> bool {
        let recorded = self.record(scene);
        self.guarded = true;
        recorded
    }

    pub fn begin_guard(&mut self) {
        self.guarded = true;
    }

    pub fn end_guard(&mut self) {
        self.guarded = false;
    }

    pub fn is_guarded(&self) -> bool {
        self.guarded
    }

    /// Restore the previous snapshot. Returns `false` if nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push(Snapshot::capture(scene));
        previous.restore(scene);
        true
    }

    /// Re-apply the last undone snapshot. Returns `false` if nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push(Snapshot::capture(scene));
        next.restore(scene);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.guarded = false;
        log::info!("history cleared");
    }
}
