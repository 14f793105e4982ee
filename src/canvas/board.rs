//! In-memory whiteboard canvas.
//!
//! Every created shape becomes a [`BoardObject`] with a fresh id, a JSON
//! `props` bag, and a `z_index` equal to its creation order, so replaying
//! draw commands front-to-back preserves stacking.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Canvas, LineStyle, ShapeHandle, TextStyle};
use crate::sequence::color::Rgb;

const LINE_DASH_PATTERN: &str = "8,4";

/// A shape placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardObject {
    pub id: Uuid,
    pub board_id: Uuid,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub props: serde_json::Value,
}

/// Canvas that collects board objects in creation order.
#[derive(Debug, Clone)]
pub struct BoardCanvas {
    board_id: Uuid,
    objects: Vec<BoardObject>,
    by_id: HashMap<Uuid, usize>,
}

impl Default for BoardCanvas {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl BoardCanvas {
    #[must_use]
    pub fn new(board_id: Uuid) -> Self {
        Self { board_id, objects: Vec::new(), by_id: HashMap::new() }
    }

    #[must_use]
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// Objects in creation (z) order.
    #[must_use]
    pub fn objects(&self) -> &[BoardObject] {
        &self.objects
    }

    #[must_use]
    pub fn into_objects(self) -> Vec<BoardObject> {
        self.objects
    }

    #[must_use]
    pub fn get(&self, shape: ShapeHandle) -> Option<&BoardObject> {
        self.by_id.get(&shape.0).and_then(|&i| self.objects.get(i))
    }

    fn push(&mut self, kind: &str, x: f64, y: f64, width: f64, height: f64, props: serde_json::Value) -> ShapeHandle {
        let id = Uuid::new_v4();
        let z_index = i32::try_from(self.objects.len()).unwrap_or(i32::MAX);
        self.by_id.insert(id, self.objects.len());
        self.objects.push(BoardObject { id, board_id: self.board_id, kind: kind.into(), x, y, width, height, z_index, props });
        ShapeHandle(id)
    }

    /// Merge `fields` into the props of `shape`; unknown handles are ignored.
    fn patch(&mut self, shape: ShapeHandle, fields: serde_json::Value) {
        let Some(object) = self.by_id.get(&shape.0).and_then(|&i| self.objects.get_mut(i)) else {
            warn!(shape = %shape.0, "style update for unknown shape ignored");
            return;
        };
        if let (Some(props), serde_json::Value::Object(fields)) = (object.props.as_object_mut(), fields) {
            props.extend(fields);
        }
    }
}

impl Canvas for BoardCanvas {
    fn create_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> ShapeHandle {
        self.push("rectangle", x, y, width, height, json!({}))
    }

    fn create_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ShapeHandle {
        let props = json!({
            "a": { "x": x1, "y": y1 },
            "b": { "x": x2, "y": y2 },
        });
        self.push("line", x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs(), props)
    }

    fn create_text_box(&mut self, x: f64, y: f64, width: f64, height: f64, text: &str) -> ShapeHandle {
        self.push("text", x, y, width, height, json!({ "text": text }))
    }

    fn set_fill(&mut self, shape: ShapeHandle, fill: Option<Rgb>) {
        self.patch(shape, json!({ "fill": fill.map(Rgb::to_hex) }));
    }

    fn set_border(&mut self, shape: ShapeHandle, color: Rgb, weight: f64, dashed: bool) {
        let dash = dashed.then_some(LINE_DASH_PATTERN);
        self.patch(shape, json!({ "stroke": color.to_hex(), "strokeWidth": weight, "dashPattern": dash }));
    }

    fn set_line_style(&mut self, shape: ShapeHandle, style: &LineStyle) {
        self.patch(shape, json!({ "startArrow": style.start_arrow, "endArrow": style.end_arrow }));
    }

    fn set_text_style(&mut self, shape: ShapeHandle, style: &TextStyle) {
        self.patch(
            shape,
            json!({
                "fontSize": style.font_size,
                "bold": style.bold,
                "italic": style.italic,
                "textColor": style.color.to_hex(),
                "align": style.align,
            }),
        );
    }

    fn finish(&mut self) -> Option<String> {
        debug!(board_id = %self.board_id, objects = self.objects.len(), "board canvas finished");
        Some(format!("board:{}", self.board_id))
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
