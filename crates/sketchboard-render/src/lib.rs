//! Sketchboard Render Library
//!
//! Renderer abstraction for Sketchboard. The bundled backend flattens a
//! canvas into an ordered display list of stroked and filled kurbo paths,
//! which a GPU or 2D backend can replay as-is.

mod display_list;
mod renderer;

pub use display_list::{DisplayList, DisplayListRenderer, DrawItem};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, parse_css_color};
