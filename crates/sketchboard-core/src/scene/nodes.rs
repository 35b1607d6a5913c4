//! Text and image nodes placed on the canvas.

use super::PathId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TextNodeId = Uuid;
pub type ImageNodeId = Uuid;

const STICKY_SIZE: Size = Size::new(220.0, 120.0);
const LABEL_SIZE: Size = Size::new(72.0, 48.0);
const TEXTBOX_SIZE: Size = Size::new(160.0, 80.0);

/// Presentation variant of a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextNodeKind {
    #[default]
    Sticky,
    Textbox,
    Label,
}

impl TextNodeKind {
    /// Size used when the node carries no explicit dimensions.
    pub fn default_size(self) -> Size {
        match self {
            TextNodeKind::Sticky => STICKY_SIZE,
            TextNodeKind::Label => LABEL_SIZE,
            TextNodeKind::Textbox => TEXTBOX_SIZE,
        }
    }
}

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub id: TextNodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: TextNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Path this node is attached to. Not an ownership link: the node only
    /// follows the path on move and goes away when the path is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path_id: Option<PathId>,
}

impl TextNode {
    pub fn new(kind: TextNodeKind, origin: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: origin.x,
            y: origin.y,
            text: String::new(),
            kind,
            width: None,
            height: None,
            font_scale: None,
            font_family: None,
            locked: None,
            color: None,
            parent_path_id: None,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    /// Explicit dimensions, falling back to the kind's default size.
    pub fn size(&self) -> Size {
        let fallback = self.kind.default_size();
        Size::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_origin(self.origin() + delta);
    }
}

/// A raster image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    pub id: ImageNodeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Image source, usually a data URL.
    pub src: String,
}

impl ImageNode {
    pub fn new(rect: Rect, src: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            src: src.into(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_default_sizes() {
        let sticky = TextNode::new(TextNodeKind::Sticky, Point::ZERO);
        assert_eq!(sticky.size(), Size::new(220.0, 120.0));
        let label = TextNode::new(TextNodeKind::Label, Point::ZERO);
        assert_eq!(label.size(), Size::new(72.0, 48.0));
        let mut textbox = TextNode::new(TextNodeKind::Textbox, Point::new(10.0, 10.0));
        textbox.width = Some(300.0);
        assert_eq!(textbox.bounds(), Rect::new(10.0, 10.0, 310.0, 90.0));
    }

    #[test]
    fn test_text_node_wire_names() {
        let parent = Uuid::new_v4();
        let mut node = TextNode::new(TextNodeKind::Label, Point::new(1.0, 2.0));
        node.parent_path_id = Some(parent);
        node.font_scale = Some(1.5);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "label");
        assert_eq!(json["parentPathId"], parent.to_string());
        assert_eq!(json["fontScale"], 1.5);
        assert!(json.get("width").is_none());
    }

    #[test]
    fn test_image_node_bounds() {
        let image = ImageNode::new(Rect::new(0.0, 0.0, 320.0, 240.0), "data:image/png;base64,");
        assert_eq!(image.bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
    }
}
