//! Display list backend.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, parse_css_color};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Rect, Shape, Stroke};
use peniko::{Color, Compose};
use sketchboard_core::camera::Camera;
use sketchboard_core::scene::{ImageNodeId, LineCap, Path, PathKind, TextNodeId};
use sketchboard_core::selection::{handles, selection_box};
use sketchboard_core::tools::DEFAULT_STROKE_COLOR;

/// Longest round cap extension drawn at a butt-capped end, in pixels.
const MAX_CAP_EXTENSION_PX: f64 = 12.0;
/// Extra width for the eraser stroke being dragged.
const ERASER_DRAFT_PADDING_PX: f64 = 4.0;
const HANDLE_RADIUS_PX: f64 = 5.0;
const CURVE_HANDLE_RADIUS_PX: f64 = 4.0;

/// One drawing command. Geometry is in logical screen pixels.
#[derive(Debug, Clone)]
pub enum DrawItem {
    Stroke {
        shape: BezPath,
        style: Stroke,
        color: Color,
        compose: Compose,
    },
    Fill {
        shape: BezPath,
        color: Color,
    },
    /// Frame for an image node; the backend draws the bitmap.
    Image { id: ImageNodeId, rect: Rect },
    /// Frame for a text node; text layout belongs to the backend.
    Text { id: TextNodeId, rect: Rect },
}

/// Ordered drawing commands for one frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub background: Option<Color>,
    /// Logical to physical pixels.
    pub transform: Affine,
    pub items: Vec<DrawItem>,
}

/// Renders a canvas into a [`DisplayList`].
///
/// Paint order: images, paths with their eraser masks, the draft path,
/// text frames, then the overlays (selection box, curve handles, marquee,
/// image placement frame).
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    list: DisplayList,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    pub fn take_display_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }

    fn push_path(&mut self, path: &Path, camera: &Camera) {
        if path.points.is_empty() {
            return;
        }
        let color = stroke_color(&path.color);
        let screen: Vec<Point> = path.points.iter().map(|p| camera.world_to_screen(*p)).collect();

        if path.is_eraser() && path.eraser_masks.is_empty() {
            self.list.items.push(DrawItem::Stroke {
                shape: polyline(&screen, false),
                style: round_stroke(path.width * camera.scale + ERASER_DRAFT_PADDING_PX),
                color,
                compose: Compose::DestOut,
            });
            return;
        }

        let color = color.multiply_alpha(path.opacity as f32);
        let line_width = path.width * camera.scale;
        if should_smooth(path) {
            self.list.items.push(DrawItem::Stroke {
                shape: smooth_path(&screen),
                style: round_stroke(line_width),
                color,
                compose: Compose::SrcOver,
            });
        } else {
            self.list.items.push(DrawItem::Stroke {
                shape: polyline(&screen, path.is_closed),
                style: Stroke::new(line_width).with_caps(Cap::Butt).with_join(Join::Round),
                color,
                compose: Compose::SrcOver,
            });
            if path.start_cap == LineCap::Round {
                self.push_cap(&screen, true, line_width, color);
            }
            if path.end_cap == LineCap::Round {
                self.push_cap(&screen, false, line_width, color);
            }
        }

        for mask in &path.eraser_masks {
            if mask.points.is_empty() {
                continue;
            }
            let points: Vec<Point> = mask.points.iter().map(|p| camera.world_to_screen(*p)).collect();
            self.list.items.push(DrawItem::Stroke {
                shape: polyline(&points, false),
                style: round_stroke(mask.width * camera.scale),
                color: Color::BLACK,
                compose: Compose::DestOut,
            });
        }
    }

    /// Short round-capped stub that rounds off a butt-capped end.
    fn push_cap(&mut self, screen: &[Point], start: bool, line_width: f64, color: Color) {
        if screen.len() < 2 {
            return;
        }
        let (anchor, neighbor) = if start {
            (screen[0], screen[1])
        } else {
            (screen[screen.len() - 1], screen[screen.len() - 2])
        };
        // Points into the stroke from the anchor.
        let direction = neighbor - anchor;
        let length = direction.hypot();
        if length == 0.0 {
            return;
        }
        let extension = line_width.min(MAX_CAP_EXTENSION_PX);
        let mut stub = BezPath::new();
        stub.move_to(anchor + direction / length * extension);
        stub.line_to(anchor);
        self.list.items.push(DrawItem::Stroke {
            shape: stub,
            style: round_stroke(line_width),
            color,
            compose: Compose::SrcOver,
        });
    }

    fn push_overlays(&mut self, ctx: &RenderContext) {
        let canvas = ctx.canvas;
        let camera = canvas.camera();
        let selection_color = ctx.selection_color;

        if let Some(screen_box) = selection_box(canvas.scene(), &canvas.selection().paths, camera) {
            self.list.items.push(DrawItem::Stroke {
                shape: screen_box.to_path(0.1),
                style: Stroke::new(1.5),
                color: selection_color,
                compose: Compose::SrcOver,
            });
            for handle in handles(screen_box) {
                let dot = Circle::new(handle.position, HANDLE_RADIUS_PX).to_path(0.1);
                self.list.items.push(DrawItem::Fill {
                    shape: dot.clone(),
                    color: Color::WHITE,
                });
                self.list.items.push(DrawItem::Stroke {
                    shape: dot,
                    style: Stroke::new(1.5),
                    color: selection_color,
                    compose: Compose::SrcOver,
                });
            }
        }

        let live_curve = canvas
            .router()
            .live_curve()
            .and_then(|id| canvas.scene().path(id))
            .and_then(|path| path.curve.as_ref());
        if let Some(curve) = live_curve {
            for node in &curve.nodes {
                let anchor = camera.world_to_screen(node.anchor);
                for handle in [node.handle_in, node.handle_out].into_iter().flatten() {
                    let mut arm = BezPath::new();
                    arm.move_to(anchor);
                    arm.line_to(camera.world_to_screen(handle));
                    self.list.items.push(DrawItem::Stroke {
                        shape: arm,
                        style: Stroke::new(1.0),
                        color: selection_color,
                        compose: Compose::SrcOver,
                    });
                }
            }
            for (_, point) in curve.handles() {
                self.list.items.push(DrawItem::Fill {
                    shape: Circle::new(camera.world_to_screen(point), CURVE_HANDLE_RADIUS_PX).to_path(0.1),
                    color: selection_color,
                });
            }
        }

        if let Some(rect) = canvas.router().marquee_rect() {
            self.push_dashed_rect(rect, selection_color);
        }
        if let Some(world) = canvas.router().image_draft() {
            let rect = Rect::from_points(
                camera.world_to_screen(Point::new(world.x0, world.y0)),
                camera.world_to_screen(Point::new(world.x1, world.y1)),
            );
            self.push_dashed_rect(rect, selection_color);
        }
    }

    fn push_dashed_rect(&mut self, rect: Rect, color: Color) {
        let shape = rect.to_path(0.1);
        self.list.items.push(DrawItem::Fill {
            shape: shape.clone(),
            color: color.with_alpha(0.1),
        });
        self.list.items.push(DrawItem::Stroke {
            shape,
            style: Stroke::new(1.0).with_dashes(0.0, [4.0, 4.0]),
            color,
            compose: Compose::SrcOver,
        });
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.list = DisplayList::default();
        if ctx.viewport_size.width <= 0.0 || ctx.viewport_size.height <= 0.0 {
            return Err(RendererError::EmptyViewport(ctx.viewport_size));
        }
        self.list.background = Some(self.background_color(ctx));
        self.list.transform = Affine::scale(ctx.scale_factor);

        let canvas = ctx.canvas;
        let camera = canvas.camera();
        let scene = canvas.scene();

        for image in scene.image_nodes() {
            let bounds = image.bounds();
            self.list.items.push(DrawItem::Image {
                id: image.id,
                rect: Rect::from_points(
                    camera.world_to_screen(Point::new(bounds.x0, bounds.y0)),
                    camera.world_to_screen(Point::new(bounds.x1, bounds.y1)),
                ),
            });
        }
        for path in scene.paths() {
            self.push_path(path, camera);
        }
        if let Some(draft) = canvas.router().draft() {
            self.push_path(draft, camera);
        }
        for node in scene.text_nodes() {
            let bounds = node.bounds();
            self.list.items.push(DrawItem::Text {
                id: node.id,
                rect: Rect::from_points(
                    camera.world_to_screen(Point::new(bounds.x0, bounds.y0)),
                    camera.world_to_screen(Point::new(bounds.x1, bounds.y1)),
                ),
            });
        }
        self.push_overlays(ctx);
        Ok(())
    }
}

fn stroke_color(css: &str) -> Color {
    if css == sketchboard_core::scene::ERASE_COLOR {
        return Color::BLACK;
    }
    parse_css_color(css).unwrap_or_else(|err| {
        log::warn!("{err}, using the default stroke color");
        parse_css_color(DEFAULT_STROKE_COLOR).unwrap_or(Color::BLACK)
    })
}

/// Open round-capped freehand strokes get midpoint smoothing.
fn should_smooth(path: &Path) -> bool {
    !path.is_closed && path.kind != PathKind::Curve && path.start_cap == LineCap::Round && path.end_cap == LineCap::Round
}

fn round_stroke(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut shape = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return shape;
    };
    shape.move_to(*first);
    if rest.is_empty() {
        // Zero-length segment so round caps still draw a dot.
        shape.line_to(*first);
    }
    for point in rest {
        shape.line_to(*point);
    }
    if closed {
        shape.close_path();
    }
    shape
}

/// Quadratic segments through the midpoints of consecutive points.
fn smooth_path(points: &[Point]) -> BezPath {
    if points.len() < 3 {
        return polyline(points, false);
    }
    let mut shape = BezPath::new();
    shape.move_to(points[0]);
    let n = points.len();
    for i in 1..n - 2 {
        shape.quad_to(points[i], points[i].midpoint(points[i + 1]));
    }
    shape.quad_to(points[n - 2], points[n - 1]);
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Size};
    use sketchboard_core::canvas::Canvas;
    use sketchboard_core::input::PointerInput;
    use sketchboard_core::scene::EraserMask;
    use sketchboard_core::shapes::ShapeTag;
    use sketchboard_core::tools::{DrawTool, StrokeStyle};
    use sketchboard_core::{SceneCommand, Selection};

    const EPS: f64 = 1e-9;

    fn render(canvas: &Canvas) -> DisplayList {
        let mut renderer = DisplayListRenderer::new();
        let ctx = RenderContext::new(canvas, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx).unwrap();
        renderer.take_display_list()
    }

    fn strokes(list: &DisplayList) -> Vec<(&BezPath, &Stroke, Compose)> {
        list.items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Stroke {
                    shape, style, compose, ..
                } => Some((shape, style, *compose)),
                _ => None,
            })
            .collect()
    }

    fn add(canvas: &mut Canvas, path: Path) {
        canvas.apply_commands(vec![SceneCommand::AddPath(path)]);
    }

    #[test]
    fn test_empty_viewport_is_an_error() {
        let canvas = Canvas::new();
        let mut renderer = DisplayListRenderer::new();
        let ctx = RenderContext::new(&canvas, Size::ZERO);
        assert!(matches!(renderer.build_scene(&ctx), Err(RendererError::EmptyViewport(_))));
    }

    #[test]
    fn test_freehand_is_smoothed() {
        let mut canvas = Canvas::new();
        let mut path = Path::stroke(&StrokeStyle::default(), Point::new(0.0, 0.0));
        path.points.extend([Point::new(10.0, 5.0), Point::new(20.0, 0.0), Point::new(30.0, 5.0)]);
        add(&mut canvas, path);

        let list = render(&canvas);
        let items = strokes(&list);
        assert_eq!(items.len(), 1);
        let quads = items[0].0.elements().iter().filter(|el| matches!(el, PathEl::QuadTo(..))).count();
        assert_eq!(quads, 2);
        assert_eq!(items[0].1.start_cap, Cap::Round);
    }

    #[test]
    fn test_curve_gets_cap_extensions() {
        let mut canvas = Canvas::new();
        add(
            &mut canvas,
            Path::curve(&StrokeStyle::default(), Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
        );
        let list = render(&canvas);
        let items = strokes(&list);
        // Body plus one stub per round end.
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].1.start_cap, Cap::Butt);
        let stub = items[1].0.bounding_box();
        assert!((stub.width() - items[0].1.width.min(MAX_CAP_EXTENSION_PX)).abs() < EPS);
    }

    #[test]
    fn test_closed_shape_has_no_extensions() {
        let mut canvas = Canvas::new();
        add(
            &mut canvas,
            Path::shape(
                ShapeTag::Rectangle,
                &StrokeStyle::default(),
                Point::new(0.0, 0.0),
                Point::new(50.0, 50.0),
            ),
        );
        let list = render(&canvas);
        let items = strokes(&list);
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].0.elements().last(), Some(PathEl::ClosePath)));
    }

    #[test]
    fn test_masks_follow_their_path_as_dest_out() {
        let mut canvas = Canvas::new();
        let mut path = Path::stroke(&StrokeStyle::default(), Point::new(0.0, 0.0));
        path.points.push(Point::new(10.0, 0.0));
        path.eraser_masks.push(EraserMask::new(vec![Point::new(5.0, -5.0), Point::new(5.0, 5.0)], 6.0));
        add(&mut canvas, path);
        canvas.zoom_in();

        let list = render(&canvas);
        let items = strokes(&list);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].2, Compose::DestOut);
        assert!((items[1].1.width - 6.0 * canvas.camera().scale).abs() < EPS);
    }

    #[test]
    fn test_eraser_draft_is_padded() {
        let mut canvas = Canvas::new();
        canvas.set_tool(DrawTool::Eraser);
        canvas.begin_gesture(PointerInput::mouse(Point::new(0.0, 0.0)));
        canvas.update_gesture(PointerInput::mouse(Point::new(20.0, 0.0)));

        let list = render(&canvas);
        let items = strokes(&list);
        let width = canvas.router().draft().unwrap().width;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].2, Compose::DestOut);
        assert!((items[0].1.width - (width + ERASER_DRAFT_PADDING_PX)).abs() < EPS);
    }

    #[test]
    fn test_bad_color_falls_back() {
        let mut path = Path::stroke(&StrokeStyle::default(), Point::new(0.0, 0.0));
        path.color = "not-a-color".to_string();
        let expected = parse_css_color(DEFAULT_STROKE_COLOR).unwrap();
        assert_eq!(stroke_color(&path.color), expected);
    }

    #[test]
    fn test_selection_overlay_and_nodes() {
        let mut canvas = Canvas::new();
        let path = Path::shape(
            ShapeTag::Line,
            &StrokeStyle::default(),
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
        );
        let id = path.id;
        add(&mut canvas, path);
        canvas.add_image_node(Rect::new(0.0, 0.0, 10.0, 10.0), "data:,");
        canvas.set_tool(DrawTool::Cursor);
        canvas.set_selection(Selection {
            paths: vec![id],
            texts: Vec::new(),
        });

        let list = render(&canvas);
        assert!(matches!(list.items[0], DrawItem::Image { .. }));
        // 8 resize handles plus rotate, each filled once.
        let fills = list.items.iter().filter(|item| matches!(item, DrawItem::Fill { .. })).count();
        assert_eq!(fills, 9);
        assert!(list.background.is_some());
    }
}
