//! Drawing tools and the stroke styles they produce.

use crate::scene::ERASE_COLOR;
use crate::shapes::ShapeTag;
use serde::{Deserialize, Serialize};

/// Stroke color used when nothing else is chosen.
pub const DEFAULT_STROKE_COLOR: &str = "#111827";
/// Stroke scale used when nothing else is chosen.
pub const DEFAULT_STROKE_SCALE: f64 = 0.5;
/// Opacity of an eraser stroke while it is being dragged.
pub const ERASER_DRAFT_OPACITY: f64 = 0.6;
/// Font family for new text nodes when nothing else is chosen.
pub const DEFAULT_TEXT_FONT: &str = "Inter";

/// Whether pointer drags pan the camera or use the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasMode {
    Pan,
    #[default]
    Draw,
}

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTool {
    /// Selection and transform.
    Cursor,
    #[default]
    Pen,
    Pencil,
    Highlighter,
    Eraser,
    /// Sticky note.
    Text,
    Textbox,
    Image,
}

impl DrawTool {
    /// Tools that lay down ink (or eraser strokes) when dragged.
    pub fn draws(self) -> bool {
        matches!(
            self,
            DrawTool::Pen | DrawTool::Pencil | DrawTool::Highlighter | DrawTool::Eraser
        )
    }
}

/// Color, width and opacity for a new stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::for_tool(DrawTool::Pen, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_SCALE)
    }
}

impl StrokeStyle {
    /// Style for `tool` given the user's color and stroke scale.
    ///
    /// Widths grow linearly with the stroke scale; the eraser never gets
    /// thinner than its scale 0.5 width.
    pub fn for_tool(tool: DrawTool, color: &str, stroke_scale: f64) -> Self {
        let multiplier = 0.4 + stroke_scale * 2.6;
        let (width, opacity) = match tool {
            DrawTool::Pencil => (1.2 * multiplier, 0.9),
            DrawTool::Highlighter => (8.0 * multiplier, 0.25),
            DrawTool::Eraser => {
                let eraser_scale = stroke_scale.max(0.5);
                return Self {
                    color: ERASE_COLOR.to_string(),
                    width: 12.0 * (0.4 + eraser_scale * 3.0),
                    opacity: ERASER_DRAFT_OPACITY,
                };
            }
            _ => (2.5 * multiplier, 1.0),
        };
        Self {
            color: color.to_string(),
            width,
            opacity,
        }
    }
}

/// The user's current tool choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolState {
    pub mode: CanvasMode,
    pub tool: DrawTool,
    pub shape: ShapeTag,
    pub stroke_color: String,
    pub stroke_scale: f64,
    /// Font scale for new text boxes; `None` means not chosen yet.
    pub default_text_scale: Option<f64>,
    pub default_text_font: String,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            mode: CanvasMode::default(),
            tool: DrawTool::default(),
            shape: ShapeTag::default(),
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_scale: DEFAULT_STROKE_SCALE,
            default_text_scale: Some(1.0),
            default_text_font: DEFAULT_TEXT_FONT.to_string(),
        }
    }
}

impl ToolState {
    /// Style for a stroke started with the current tool.
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle::for_tool(self.tool, &self.stroke_color, self.stroke_scale)
    }

    /// Whether a drag currently produces a curve.
    pub fn is_curve_mode(&self) -> bool {
        self.mode == CanvasMode::Draw && self.shape == ShapeTag::Curve && self.tool != DrawTool::Eraser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_pen_width_at_default_scale() {
        // 0.4 + 0.5 * 2.6 = 1.7
        let style = StrokeStyle::for_tool(DrawTool::Pen, "#000", 0.5);
        assert!((style.width - 4.25).abs() < EPS);
        assert!((style.opacity - 1.0).abs() < EPS);
        assert_eq!(style.color, "#000");
    }

    #[test]
    fn test_pencil_and_highlighter() {
        let pencil = StrokeStyle::for_tool(DrawTool::Pencil, "#000", 0.0);
        assert!((pencil.width - 0.48).abs() < EPS);
        assert!((pencil.opacity - 0.9).abs() < EPS);
        let highlighter = StrokeStyle::for_tool(DrawTool::Highlighter, "#000", 1.0);
        assert!((highlighter.width - 24.0).abs() < EPS);
        assert!((highlighter.opacity - 0.25).abs() < EPS);
    }

    #[test]
    fn test_eraser_has_floor_and_sentinel_color() {
        let small = StrokeStyle::for_tool(DrawTool::Eraser, "#000", 0.1);
        let half = StrokeStyle::for_tool(DrawTool::Eraser, "#000", 0.5);
        assert_eq!(small, half);
        assert_eq!(half.color, ERASE_COLOR);
        assert!((half.width - 22.8).abs() < EPS);
    }

    #[test]
    fn test_curve_mode() {
        let mut tools = ToolState::default();
        assert!(!tools.is_curve_mode());
        tools.shape = ShapeTag::Curve;
        assert!(tools.is_curve_mode());
        tools.mode = CanvasMode::Pan;
        assert!(!tools.is_curve_mode());
    }
}
