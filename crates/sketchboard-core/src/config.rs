//! Canvas tunables.

use crate::camera::{MAX_ZOOM, MIN_ZOOM, NARROW_MAX_ZOOM, NARROW_VIEWPORT_WIDTH, ZoomLimits};
use crate::selection::{HIT_TOLERANCE_PX, MIN_SCALE_SIZE_PX};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Canvas`](crate::canvas::Canvas).
///
/// Every field has a default, so a partial JSON object deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Viewports at most this wide get [`CanvasConfig::narrow_max_zoom`].
    pub narrow_viewport_width: f64,
    pub narrow_max_zoom: f64,
    /// Path hit tolerance in screen pixels.
    pub hit_tolerance_px: f64,
    /// Smallest selection box edge while scaling, in screen pixels.
    pub min_scale_size_px: f64,
    /// Paste offset per repeated paste, in world units.
    pub paste_offset_step: f64,
    /// Undo depth cap; `None` keeps every snapshot.
    pub max_history_depth: Option<usize>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            narrow_viewport_width: NARROW_VIEWPORT_WIDTH,
            narrow_max_zoom: NARROW_MAX_ZOOM,
            hit_tolerance_px: HIT_TOLERANCE_PX,
            min_scale_size_px: MIN_SCALE_SIZE_PX,
            paste_offset_step: 24.0,
            max_history_depth: None,
        }
    }
}

impl CanvasConfig {
    /// Zoom limits for a viewport of the given width.
    pub fn zoom_limits(&self, viewport_width: f64) -> ZoomLimits {
        let narrow = viewport_width > 0.0 && viewport_width <= self.narrow_viewport_width;
        ZoomLimits {
            min: self.min_zoom,
            max: if narrow { self.narrow_max_zoom } else { self.max_zoom },
        }
    }
}
