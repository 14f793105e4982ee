//! Drawing-surface collaborator.
//!
//! The layout pipeline only ever creates shapes and sets their style; it never
//! reads geometry back. Implementations decide what a shape is (a board
//! object, an SVG element, a slide shape) and are free to batch or forward
//! the calls.

pub mod board;

use serde::Serialize;
use uuid::Uuid;

use crate::sequence::color::Rgb;

pub use board::{BoardCanvas, BoardObject};

/// Opaque handle to a shape created on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShapeHandle(pub Uuid);

/// Stroke and arrowhead settings of a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub weight: f64,
    pub dashed: bool,
    pub start_arrow: bool,
    pub end_arrow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
}

/// Font settings of a text box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub align: TextAlign,
}

/// A surface that materializes shapes.
///
/// Calls are fire-and-forget: the pipeline does not inspect results beyond
/// the returned handle, and never retries.
pub trait Canvas {
    fn create_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> ShapeHandle;

    fn create_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ShapeHandle;

    fn create_text_box(&mut self, x: f64, y: f64, width: f64, height: f64, text: &str) -> ShapeHandle;

    /// `None` clears the fill.
    fn set_fill(&mut self, shape: ShapeHandle, fill: Option<Rgb>);

    fn set_border(&mut self, shape: ShapeHandle, color: Rgb, weight: f64, dashed: bool);

    fn set_line_style(&mut self, shape: ShapeHandle, style: &LineStyle);

    fn set_text_style(&mut self, shape: ShapeHandle, style: &TextStyle);

    /// Called once after the last shape. May return a handle or URL for the
    /// finished drawing; the pipeline treats it as opaque.
    fn finish(&mut self) -> Option<String> {
        None
    }
}
