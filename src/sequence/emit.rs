//! Primitive emitter: projects a diagram and its layout into draw commands.
//!
//! DESIGN
//! ======
//! The emitter is a pure projection. Every coordinate comes from [`Layout`];
//! the emitter only decides which primitives to issue and in what order.
//! Command order is the z-order contract, back to front:
//!
//! 1. block backgrounds, labels and dividers
//! 2. note boxes
//! 3. participant top row, lifelines, bottom row
//! 4. message lines and labels
//! 5. title
//!
//! Elements whose geometry is missing are skipped and reported as warnings.

use serde::Serialize;
use tracing::warn;

use super::ast::{BlockId, Diagram, ElementKey};
use super::color::{self, Rgb};
use super::layout::{ArrowEnd, ElementGeometry, Layout, MessagePath, Rect};
use crate::canvas::{Canvas, LineStyle, TextAlign, TextStyle};

const PARTICIPANT_BORDER_W: f64 = 2.0;
const BLOCK_BORDER_W: f64 = 1.0;
const NOTE_BORDER_W: f64 = 1.0;
const LIFELINE_W: f64 = 1.0;
const MESSAGE_LINE_W: f64 = 1.5;
const LABEL_FONT: f64 = 12.0;
const BODY_FONT: f64 = 14.0;
const TITLE_FONT: f64 = 18.0;

/// One backend-agnostic drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Rectangle {
        rect: Rect,
        fill: Option<Rgb>,
        border: Rgb,
        border_weight: f64,
        dashed: bool,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
        #[serde(flatten)]
        style: LineStyle,
    },
    Text {
        rect: Rect,
        content: String,
        #[serde(flatten)]
        style: TextStyle,
    },
}

/// Recovered problem found while emitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum RenderWarning {
    #[error("no geometry for {key}; element skipped")]
    MissingGeometry { key: ElementKey },
    #[error("{block} has no horizontal extent; frame skipped")]
    BlockWithoutExtent { block: BlockId },
}

/// Ordered draw commands plus the warnings raised while building them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plan {
    pub commands: Vec<DrawCommand>,
    pub warnings: Vec<RenderWarning>,
}

/// Build the ordered command list for a laid-out diagram.
#[must_use]
pub fn plan(diagram: &Diagram, layout: &Layout, title: &str) -> Plan {
    let mut out = Plan::default();
    emit_blocks(diagram, layout, &mut out);
    emit_notes(diagram, layout, &mut out);
    emit_participants(diagram, layout, &mut out);
    emit_messages(diagram, layout, &mut out);
    out.commands.push(text(layout.title, title, TITLE_FONT, true, false, color::TEXT, TextAlign::Center));
    out
}

/// Issue commands against a canvas, in order.
pub fn replay<C: Canvas + ?Sized>(commands: &[DrawCommand], canvas: &mut C) {
    for command in commands {
        match command {
            DrawCommand::Rectangle { rect, fill, border, border_weight, dashed } => {
                let shape = canvas.create_rectangle(rect.x, rect.y, rect.width, rect.height);
                canvas.set_fill(shape, *fill);
                canvas.set_border(shape, *border, *border_weight, *dashed);
            }
            DrawCommand::Line { x1, y1, x2, y2, color, style } => {
                let shape = canvas.create_line(*x1, *y1, *x2, *y2);
                canvas.set_border(shape, *color, style.weight, style.dashed);
                canvas.set_line_style(shape, style);
            }
            DrawCommand::Text { rect, content, style } => {
                let shape = canvas.create_text_box(rect.x, rect.y, rect.width, rect.height, content);
                canvas.set_text_style(shape, style);
            }
        }
    }
}

fn emit_blocks(diagram: &Diagram, layout: &Layout, out: &mut Plan) {
    for (block, geometry) in diagram.blocks.iter().zip(&layout.blocks) {
        let Some(frame) = geometry.frame() else {
            warn!(block = geometry.block.0, kind = block.kind.keyword(), "block has no horizontal extent");
            out.warnings.push(RenderWarning::BlockWithoutExtent { block: geometry.block });
            continue;
        };
        let (fill, border, dashed) = match block.colors() {
            Some(colors) => (colors.fill, colors.border, false),
            None => (color::BLOCK_FILL, color::BLOCK_STROKE, true),
        };
        out.commands.push(DrawCommand::Rectangle {
            rect: frame,
            fill: Some(fill),
            border,
            border_weight: BLOCK_BORDER_W,
            dashed,
        });
        if let Some(label) = &geometry.label {
            let caption = text(label.rect, &label.text, LABEL_FONT, true, false, color::MUTED_TEXT, TextAlign::Left);
            out.commands.push(caption);
        }
        for divider in &geometry.dividers {
            let style = dotted(BLOCK_BORDER_W);
            out.commands.push(line(divider.x1, divider.y, divider.x2, divider.y, color::BLOCK_STROKE, style));
            if let Some(label) = &divider.label {
                let caption = text(label.rect, &label.text, LABEL_FONT, false, true, color::MUTED_TEXT, TextAlign::Left);
                out.commands.push(caption);
            }
        }
    }
}

fn emit_notes(diagram: &Diagram, layout: &Layout, out: &mut Plan) {
    for note in diagram.notes() {
        let key = ElementKey::note(note.sequence_index);
        let Some(ElementGeometry::Note(geometry)) = lookup(layout, key, out) else {
            continue;
        };
        out.commands.push(DrawCommand::Rectangle {
            rect: geometry.rect,
            fill: Some(color::NOTE_FILL),
            border: color::NOTE_STROKE,
            border_weight: NOTE_BORDER_W,
            dashed: false,
        });
        out.commands.push(text(geometry.rect, &note.text, LABEL_FONT, false, false, color::TEXT, TextAlign::Center));
    }
}

fn emit_participants(diagram: &Diagram, layout: &Layout, out: &mut Plan) {
    let rows = diagram.participants.iter().zip(&layout.participants);
    for (participant, geometry) in rows.clone() {
        participant_box(out, geometry.top, &participant.display_name);
    }
    for (_, geometry) in rows.clone() {
        let x = geometry.lifeline_x;
        let style = dotted(LIFELINE_W);
        out.commands.push(line(x, geometry.top.bottom(), x, geometry.bottom.y, color::LIFELINE_STROKE, style));
    }
    for (participant, geometry) in rows {
        participant_box(out, geometry.bottom, &participant.display_name);
    }
}

fn emit_messages(diagram: &Diagram, layout: &Layout, out: &mut Plan) {
    for message in diagram.messages() {
        let key = ElementKey::message(message.sequence_index);
        let Some(ElementGeometry::Message(geometry)) = lookup(layout, key, out) else {
            continue;
        };
        let style = |start_arrow, end_arrow| LineStyle {
            weight: MESSAGE_LINE_W,
            dashed: geometry.dashed,
            start_arrow,
            end_arrow,
        };
        match geometry.path {
            MessagePath::Straight { start, end, arrow } => {
                let at_end = arrow == ArrowEnd::End;
                out.commands.push(line(start.x, start.y, end.x, end.y, color::TEXT, style(!at_end, at_end)));
            }
            MessagePath::SelfLoop { points } => {
                let last = points.len() - 1;
                for (i, segment) in points.windows(2).enumerate() {
                    let (a, b) = (segment[0], segment[1]);
                    out.commands.push(line(a.x, a.y, b.x, b.y, color::TEXT, style(false, i + 1 == last)));
                }
            }
        }
        if !message.text.is_empty() {
            let align = match geometry.path {
                MessagePath::Straight { .. } => TextAlign::Center,
                MessagePath::SelfLoop { .. } => TextAlign::Left,
            };
            out.commands.push(text(geometry.label, &message.text, LABEL_FONT, false, false, color::TEXT, align));
        }
    }
}

/// Geometry for `key`, recording a warning when it was never laid out.
fn lookup<'a>(layout: &'a Layout, key: ElementKey, out: &mut Plan) -> Option<&'a ElementGeometry> {
    let found = layout.element(key);
    if found.is_none() {
        warn!(%key, "no geometry recorded; skipping element");
        out.warnings.push(RenderWarning::MissingGeometry { key });
    }
    found
}

fn participant_box(out: &mut Plan, rect: Rect, label: &str) {
    out.commands.push(DrawCommand::Rectangle {
        rect,
        fill: Some(color::PARTICIPANT_FILL),
        border: color::PARTICIPANT_STROKE,
        border_weight: PARTICIPANT_BORDER_W,
        dashed: false,
    });
    out.commands.push(text(rect, label, BODY_FONT, true, false, color::TEXT, TextAlign::Center));
}

fn dotted(weight: f64) -> LineStyle {
    LineStyle { weight, dashed: true, start_arrow: false, end_arrow: false }
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, style: LineStyle) -> DrawCommand {
    DrawCommand::Line { x1, y1, x2, y2, color, style }
}

fn text(rect: Rect, content: &str, font_size: f64, bold: bool, italic: bool, color: Rgb, align: TextAlign) -> DrawCommand {
    DrawCommand::Text { rect, content: content.to_owned(), style: TextStyle { font_size, bold, italic, color, align } }
}

#[cfg(test)]
#[path = "emit_test.rs"]
mod tests;
