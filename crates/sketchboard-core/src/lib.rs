//! Sketchboard Core Library
//!
//! Platform-agnostic engine for the Sketchboard infinite canvas: scene
//! model, camera, shape generation, curve editing, eraser masking,
//! selection transforms, gesture routing and undo history.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod curve;
pub mod document;
pub mod eraser;
pub mod gesture;
pub mod history;
pub mod input;
pub mod observer;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use camera::{Camera, ZoomDirection, ZoomLimits};
pub use canvas::{Canvas, TextNodeOptions, ZOrder};
pub use config::CanvasConfig;
pub use curve::{Curve, CurveNode};
pub use document::{ApplyOptions, DocumentError, SceneDocument};
pub use gesture::{GestureRouter, InteractionContext, SceneCommand};
pub use history::History;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerInput, PointerKind};
pub use observer::{CanvasEvent, CanvasObserver};
pub use scene::{ImageNode, Path, PathId, PathKind, Scene, TextNode, TextNodeId, TextNodeKind};
pub use selection::Selection;
pub use shapes::ShapeTag;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use tools::{CanvasMode, DrawTool, StrokeStyle, ToolState};
