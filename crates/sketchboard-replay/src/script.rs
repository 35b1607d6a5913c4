//! Gesture scripts: a JSON array of steps applied to a canvas in order.

use kurbo::{Point, Size, Vec2};
use serde::Deserialize;
use sketchboard_core::canvas::{Canvas, TextNodeOptions, ZOrder};
use sketchboard_core::input::{KeyEvent, Modifiers, MouseButton, PointerInput, PointerKind};
use sketchboard_core::scene::TextNodeKind;
use sketchboard_core::shapes::ShapeTag;
use sketchboard_core::tools::{CanvasMode, DrawTool};

fn default_pointer() -> u64 {
    1
}

/// A pointer sample in screen coordinates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerStep {
    #[serde(default = "default_pointer")]
    pub pointer: u64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: PointerKind,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerStep {
    fn input(&self) -> PointerInput {
        PointerInput {
            pointer_id: self.pointer,
            kind: self.kind,
            button: self.button,
            modifiers: self.modifiers,
            position: Point::new(self.x, self.y),
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    Begin(PointerStep),
    Update(PointerStep),
    End {
        #[serde(default = "default_pointer")]
        pointer: u64,
    },
    Cancel {
        #[serde(default = "default_pointer")]
        pointer: u64,
    },
    Wheel {
        dx: f64,
        dy: f64,
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: String,
        pressed: bool,
    },
    Viewport {
        width: f64,
        height: f64,
    },
    ZoomIn,
    ZoomOut,
    Undo,
    Redo,
    Mode {
        mode: CanvasMode,
    },
    Tool {
        tool: DrawTool,
    },
    Shape {
        shape: ShapeTag,
    },
    Color {
        color: String,
    },
    StrokeScale {
        scale: f64,
    },
    SelectAll,
    ClearSelection,
    Copy,
    Paste,
    Cut,
    Delete,
    Duplicate,
    Lock {
        locked: bool,
    },
    Reorder {
        order: ZOrder,
    },
    Text {
        kind: TextNodeKind,
        x: f64,
        y: f64,
        #[serde(default)]
        text: Option<String>,
    },
    /// Image source used by the next image placement.
    Image {
        src: String,
    },
}

/// Apply `steps` in order. Returns how many steps changed something the
/// canvas reports on; the rest are logged at debug level.
pub fn run(canvas: &mut Canvas, steps: &[Step]) -> usize {
    steps
        .iter()
        .enumerate()
        .filter(|(index, step)| {
            let applied = apply(canvas, step);
            if !applied {
                log::debug!("step {index} ({step:?}) had no effect");
            }
            applied
        })
        .count()
}

fn apply(canvas: &mut Canvas, step: &Step) -> bool {
    match step {
        Step::Begin(pointer) => canvas.begin_gesture(pointer.input()),
        Step::Update(pointer) => canvas.update_gesture(pointer.input()),
        Step::End { pointer } => canvas.end_gesture(*pointer),
        Step::Cancel { pointer } => canvas.cancel_gesture(*pointer),
        Step::Wheel {
            dx,
            dy,
            x,
            y,
            modifiers,
        } => return canvas.wheel(Vec2::new(*dx, *dy), Point::new(*x, *y), *modifiers),
        Step::Key { key, pressed } => canvas.handle_key_event(if *pressed {
            KeyEvent::Pressed(key.clone())
        } else {
            KeyEvent::Released(key.clone())
        }),
        Step::Viewport { width, height } => canvas.set_viewport_size(Size::new(*width, *height)),
        Step::ZoomIn => return canvas.zoom_in(),
        Step::ZoomOut => return canvas.zoom_out(),
        Step::Undo => return canvas.undo(),
        Step::Redo => return canvas.redo(),
        Step::Mode { mode } => canvas.set_mode(*mode),
        Step::Tool { tool } => canvas.set_tool(*tool),
        Step::Shape { shape } => canvas.set_shape(*shape),
        Step::Color { color } => canvas.set_stroke_color(color.as_str()),
        Step::StrokeScale { scale } => canvas.set_stroke_scale(*scale),
        Step::SelectAll => canvas.select_all(),
        Step::ClearSelection => canvas.clear_selection(),
        Step::Copy => return canvas.copy_selection(),
        Step::Paste => return canvas.paste(),
        Step::Cut => return canvas.cut_selection(),
        Step::Delete => return canvas.delete_selection(),
        Step::Duplicate => return canvas.duplicate_selection(),
        Step::Lock { locked } => return canvas.set_selection_locked(*locked),
        Step::Reorder { order } => return canvas.reorder_selection(*order),
        Step::Text { kind, x, y, text } => {
            let options = TextNodeOptions {
                text: text.clone(),
                ..TextNodeOptions::default()
            };
            return canvas.add_text_node(*kind, Point::new(*x, *y), options).is_some();
        }
        Step::Image { src } => canvas.set_pending_image(Some(src.clone())),
    }
    true
}
