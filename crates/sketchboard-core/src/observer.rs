//! Change notifications for collaborators outside the engine.

use kurbo::{Rect, Size};

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Paths, text nodes or image nodes changed.
    SceneChanged,
    SelectionChanged,
    ViewportSizeChanged(Size),
    /// An image rectangle was placed but no source was pending.
    ImagePlacementRequested(Rect),
}

/// Receives [`CanvasEvent`]s from a [`Canvas`](crate::canvas::Canvas).
///
/// Autosave, sync broadcast and UI chrome hang off this.
pub trait CanvasObserver {
    fn on_event(&mut self, event: &CanvasEvent);
}

impl<F> CanvasObserver for F
where
    F: FnMut(&CanvasEvent),
{
    fn on_event(&mut self, event: &CanvasEvent) {
        self(event)
    }
}
