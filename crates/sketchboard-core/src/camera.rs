//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom level the canvas allows.
pub const MIN_ZOOM: f64 = 0.2;
/// Largest zoom level the canvas allows on regular viewports.
pub const MAX_ZOOM: f64 = 4.0;
/// Viewports at most this wide (in screen pixels) get a lower zoom cap.
pub const NARROW_VIEWPORT_WIDTH: f64 = 720.0;
/// Zoom cap for narrow viewports.
pub const NARROW_MAX_ZOOM: f64 = 1.0;
/// Keyboard/toolbar zoom step, in percent.
pub const ZOOM_STEP_PERCENT: f64 = 5.0;
/// Scale change per wheel delta unit when zooming with ctrl/meta held.
pub const WHEEL_ZOOM_INTENSITY: f64 = 0.0015;

/// Allowed zoom range for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

impl ZoomLimits {
    /// Limits for a viewport of the given width using the default constants.
    ///
    /// A width of zero means the viewport has not been measured yet and
    /// keeps the regular cap.
    pub fn for_viewport(width: f64) -> Self {
        let max = if width > 0.0 && width <= NARROW_VIEWPORT_WIDTH {
            NARROW_MAX_ZOOM
        } else {
            MAX_ZOOM
        };
        Self { min: MIN_ZOOM, max }
    }

    /// Clamp a scale into the range.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }
}

/// Direction of a stepped zoom request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Camera manages the view transform for the canvas.
///
/// `screen = world * scale + (x, y)`. It handles panning (translation)
/// and zooming (scaling), converting between screen coordinates and world
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal screen offset of the world origin.
    pub x: f64,
    /// Vertical screen offset of the world origin.
    pub y: f64,
    /// Uniform zoom factor.
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pan offset as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset())
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen-space length (pixels) to world units.
    pub fn screen_len_to_world(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Set the zoom level, keeping the world point under `anchor` fixed.
    ///
    /// The requested scale is clamped into `limits`. Returns `false` and
    /// leaves the camera untouched when the clamped scale equals the current
    /// one (for example when already sitting on a bound).
    pub fn set_zoom(&mut self, scale: f64, anchor: Point, limits: ZoomLimits) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let new_scale = limits.clamp(scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        let anchor_world = self.screen_to_world(anchor);
        let new_x = anchor.x - anchor_world.x * new_scale;
        let new_y = anchor.y - anchor_world.y * new_scale;
        if !new_x.is_finite() || !new_y.is_finite() {
            return false;
        }

        self.x = new_x;
        self.y = new_y;
        self.scale = new_scale;
        true
    }

    /// Zoom the camera by a factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64, limits: ZoomLimits) -> bool {
        self.set_zoom(self.scale * factor, screen_point, limits)
    }

    /// Step the zoom level to the next multiple of [`ZOOM_STEP_PERCENT`].
    ///
    /// Anchored at the viewport center when the viewport has been measured,
    /// otherwise only the scale changes.
    pub fn zoom_step(&mut self, direction: ZoomDirection, viewport: Size, limits: ZoomLimits) -> bool {
        let min_percent = limits.min * 100.0;
        let max_percent = limits.max * 100.0;
        let percent = (self.scale * 100.0 * 100.0).round() / 100.0;
        let remainder = percent.rem_euclid(ZOOM_STEP_PERCENT);

        let target = match direction {
            ZoomDirection::In => {
                if percent >= max_percent {
                    return false;
                }
                let increment = if remainder == 0.0 {
                    ZOOM_STEP_PERCENT
                } else {
                    ZOOM_STEP_PERCENT - remainder
                };
                (percent + increment).min(max_percent)
            }
            ZoomDirection::Out => {
                if percent <= min_percent {
                    return false;
                }
                let decrement = if remainder == 0.0 { ZOOM_STEP_PERCENT } else { remainder };
                (percent - decrement).max(min_percent)
            }
        };
        if target == percent {
            return false;
        }

        let next_scale = target / 100.0;
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            self.scale = next_scale;
            return true;
        }

        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let anchor_world = self.screen_to_world(center);
        let new_x = center.x - anchor_world.x * next_scale;
        let new_y = center.y - anchor_world.y * next_scale;
        if new_x.is_finite() {
            self.x = new_x;
        }
        if new_y.is_finite() {
            self.y = new_y;
        }
        self.scale = next_scale;
        true
    }

    /// Apply a wheel event.
    ///
    /// With the zoom modifier (ctrl/meta) held the camera zooms around the
    /// pointer, otherwise the wheel delta pans the view.
    pub fn wheel(&mut self, delta: Vec2, screen_point: Point, zoom_modifier: bool, limits: ZoomLimits) -> bool {
        if zoom_modifier {
            let amount = -delta.y * WHEEL_ZOOM_INTENSITY;
            if amount == 0.0 {
                return false;
            }
            return self.zoom_at(screen_point, 1.0 + amount, limits);
        }
        if delta == Vec2::ZERO {
            return false;
        }
        self.pan(-delta);
        true
    }

    /// Pull the scale back under `limits.max`, anchored at the viewport
    /// center. Used when the viewport shrinks below the narrow threshold.
    pub fn fit_zoom_limits(&mut self, viewport: Size, limits: ZoomLimits) -> bool {
        if viewport.width <= 0.0 || viewport.height <= 0.0 || self.scale <= limits.max {
            return false;
        }
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.set_zoom(limits.max, center, limits)
    }

    /// Replace non-finite fields with defaults and clamp the scale.
    pub fn sanitize(self, limits: ZoomLimits) -> Self {
        let default = Self::default();
        let pick = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        Self {
            x: pick(self.x, default.x),
            y: pick(self.y, default.y),
            scale: limits.clamp(pick(self.scale, default.scale)),
        }
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
