//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use peniko::color::{Srgb, parse_color};
use sketchboard_core::canvas::Canvas;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("viewport has no area: {0:?}")]
    EmptyViewport(Size),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Color,
    /// Selection box, handles and marquee color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// Called once per frame; implementations prepare every drawing command for
/// the canvas state in `ctx`.
pub trait Renderer {
    /// Build the command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Parse a CSS color string such as `#111827` or `rgb(0 0 0 / 50%)`.
pub fn parse_css_color(css: &str) -> RenderResult<Color> {
    parse_color(css.trim())
        .map(|color| color.to_alpha_color::<Srgb>())
        .map_err(|_| RendererError::InvalidColor(css.to_string()))
}
