//! Layout engine: computes canvas size and geometry for a parsed diagram.
//!
//! DESIGN
//! ======
//! Origin is top-left and y grows downward. Participants are placed left to
//! right in declaration order; timeline entries are placed top to bottom by
//! walking the timeline in `(sequence_index, kind)` order with a running
//! cursor. The y of every entry is recorded under its [`ElementKey`]; block
//! frames and element geometry are derived from those rows only, so the
//! emitter never needs to compute a coordinate itself.
//!
//! Blocks that open on the same entry stack their captions upward, and the
//! cursor reserves room for them before placing that entry. Anything placed
//! left of the outer margin shifts the whole drawing right.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::ast::{Block, BlockId, BlockKind, Diagram, ElementKey, ElementKind, Message, Note, NotePosition, TimelineEntry};
use crate::config::LayoutConfig;

// Layout constants (in logical pixels).
const CHAR_WIDTH: f64 = 8.0;
const TEXT_MARGIN: f64 = 20.0;
const TITLE_HEIGHT: f64 = 30.0;
const TITLE_GAP: f64 = 10.0;
/// Gap between the header row and the first timeline row.
const FIRST_ROW_GAP: f64 = 40.0;
const LABEL_GAP: f64 = 2.0;
const SELF_LOOP_W: f64 = 40.0;
const SELF_LOOP_H: f64 = 20.0;
const SELF_LABEL_GAP: f64 = 6.0;
const NOTE_MIN_W: f64 = 100.0;
const NOTE_H: f64 = 28.0;
/// Distance from a note's anchor row to the top of its box.
const NOTE_LIFT: f64 = 20.0;
const NOTE_GAP: f64 = 10.0;
const NOTE_OVERHANG: f64 = 20.0;
const BLOCK_TOP_MARGIN: f64 = 42.0;
const BLOCK_TOP_MARGIN_NOTE: f64 = 48.0;
const BLOCK_BOTTOM_MARGIN: f64 = 28.0;
const BLOCK_NEST_INSET: f64 = 6.0;
const BLOCK_LABEL_H: f64 = 18.0;
const BLOCK_LABEL_INSET: f64 = 4.0;
/// Vertical room per caption when nested blocks open on the same entry.
const BLOCK_CAPTION_STEP: f64 = BLOCK_LABEL_H + LABEL_GAP;
const DIVIDER_OFFSET: f64 = 28.0;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn shift_x(&mut self, dx: f64) {
        self.x += dx;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn shift_x(&mut self, dx: f64) {
        self.x += dx;
    }
}

/// Which end of a straight message line carries the arrowhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowEnd {
    Start,
    End,
}

/// Horizontal placement of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticipantGeometry {
    pub top: Rect,
    pub bottom: Rect,
    pub lifeline_x: f64,
}

/// Path of a message arrow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MessagePath {
    /// Line from the `from` lifeline to the `to` lifeline.
    Straight { start: Point, end: Point, arrow: ArrowEnd },
    /// Out, down and back to the same lifeline; the arrowhead sits on the
    /// last segment pointing at the lifeline.
    SelfLoop { points: [Point; 4] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageGeometry {
    pub y: f64,
    pub path: MessagePath,
    pub label: Rect,
    pub dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteGeometry {
    pub y: f64,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "element", rename_all = "lowercase")]
pub enum ElementGeometry {
    Message(MessageGeometry),
    Note(NoteGeometry),
}

impl ElementGeometry {
    /// Leftmost x covered by the element.
    #[must_use]
    pub fn left(&self) -> f64 {
        match self {
            Self::Message(m) => {
                let path_left = match &m.path {
                    MessagePath::Straight { start, end, .. } => start.x.min(end.x),
                    MessagePath::SelfLoop { points } => points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
                };
                m.label.x.min(path_left)
            }
            Self::Note(n) => n.rect.x,
        }
    }

    /// Rightmost x covered by the element.
    #[must_use]
    pub fn right(&self) -> f64 {
        match self {
            Self::Message(m) => m.label.right(),
            Self::Note(n) => n.rect.right(),
        }
    }

    fn shift_x(&mut self, dx: f64) {
        match self {
            Self::Message(m) => {
                match &mut m.path {
                    MessagePath::Straight { start, end, .. } => {
                        start.shift_x(dx);
                        end.shift_x(dx);
                    }
                    MessagePath::SelfLoop { points } => points.iter_mut().for_each(|p| p.shift_x(dx)),
                }
                m.label.shift_x(dx);
            }
            Self::Note(n) => n.rect.shift_x(dx),
        }
    }
}

/// Positioned caption of a block or section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockLabel {
    pub text: String,
    pub rect: Rect,
}

/// Dotted separator between `alt` sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divider {
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
    /// `None` when the section repeats the primary condition.
    pub label: Option<BlockLabel>,
}

/// Bounding box of a block. Either extent may be undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockGeometry {
    pub block: BlockId,
    /// `(top, bottom)` from the rows of contained entries.
    pub vertical: Option<(f64, f64)>,
    /// `(left, right)` from contained messages only.
    pub horizontal: Option<(f64, f64)>,
    /// Kind tag and primary condition; `None` for `rect` blocks.
    pub label: Option<BlockLabel>,
    pub dividers: Vec<Divider>,
}

impl BlockGeometry {
    /// Frame rectangle when both extents are known.
    #[must_use]
    pub fn frame(&self) -> Option<Rect> {
        let ((top, bottom), (left, right)) = (self.vertical?, self.horizontal?);
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    fn shift_x(&mut self, dx: f64) {
        self.horizontal = self.horizontal.map(|(left, right)| (left + dx, right + dx));
        if let Some(label) = &mut self.label {
            label.rect.shift_x(dx);
        }
        for divider in &mut self.dividers {
            divider.x1 += dx;
            divider.x2 += dx;
            if let Some(label) = &mut divider.label {
                label.rect.shift_x(dx);
            }
        }
    }
}

/// Fully positioned diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub title: Rect,
    /// Same order as [`Diagram::participants`].
    pub participants: Vec<ParticipantGeometry>,
    /// Anchor y of every timeline entry.
    #[serde(skip)]
    pub rows: BTreeMap<ElementKey, f64>,
    /// Geometry of every placeable entry.
    #[serde(skip)]
    pub elements: BTreeMap<ElementKey, ElementGeometry>,
    /// Same order as [`Diagram::blocks`].
    pub blocks: Vec<BlockGeometry>,
}

impl Layout {
    #[must_use]
    pub fn element(&self, key: ElementKey) -> Option<&ElementGeometry> {
        self.elements.get(&key)
    }
}

/// Lay out a diagram.
#[must_use]
pub fn layout(diagram: &Diagram, config: &LayoutConfig) -> Layout {
    let title_y = config.margin;
    let header_y = title_y + TITLE_HEIGHT + TITLE_GAP;
    let header_bottom = header_y + config.participant_height;

    let mut slots: Vec<Rect> = diagram
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| {
            #[allow(clippy::cast_precision_loss)]
            let x = config.margin + i as f64 * config.participant_spacing;
            let width = config.participant_width.max(text_width(&p.display_name));
            Rect::new(x, header_y, width, config.participant_height)
        })
        .collect();
    let centers: Vec<f64> = slots.iter().map(|r| r.x + r.width / 2.0).collect();

    // --- Vertical placement ---
    let mut order: Vec<&TimelineEntry> = diagram.timeline.iter().collect();
    order.sort_by_key(|entry| entry.key());

    let mut rows = BTreeMap::new();
    let mut cursor = header_bottom + FIRST_ROW_GAP;
    for entry in &order {
        let index = entry.sequence_index();
        cursor += stacked(diagram, |b| b.range.start == index) * BLOCK_CAPTION_STEP;
        rows.insert(entry.key(), cursor);
        cursor += match entry {
            TimelineEntry::Message(_) => config.message_spacing,
            TimelineEntry::Note(_) => config.note_spacing,
        };
        cursor += stacked(diagram, |b| b.range.end_index() == Some(index)) * BLOCK_NEST_INSET;
    }

    // --- Element geometry ---
    let place = Placement { diagram, config, centers: &centers, slots: &slots };
    let mut elements = BTreeMap::new();
    for entry in &order {
        let key = entry.key();
        let Some(&y) = rows.get(&key) else {
            continue;
        };
        let geometry = match entry {
            TimelineEntry::Message(m) => place.message(m, y).map(ElementGeometry::Message),
            TimelineEntry::Note(n) => place.note(n, y).map(ElementGeometry::Note),
        };
        if let Some(geometry) = geometry {
            elements.insert(key, geometry);
        }
    }

    // --- Blocks ---
    let mut blocks: Vec<BlockGeometry> = diagram
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| place.block(BlockId(i), block, &order, &rows, &elements))
        .collect();

    // --- Horizontal fit ---
    let content_left = slots
        .iter()
        .map(|r| r.x)
        .chain(elements.values().map(ElementGeometry::left))
        .chain(blocks.iter().filter_map(|b| b.horizontal.map(|(left, _)| left)))
        .fold(config.margin, f64::min);
    let dx = config.margin - content_left;
    if dx > 0.0 {
        debug!(dx, "shifting layout right to keep content inside the margin");
        slots.iter_mut().for_each(|r| r.shift_x(dx));
        elements.values_mut().for_each(|g| g.shift_x(dx));
        blocks.iter_mut().for_each(|b| b.shift_x(dx));
    }

    // --- Canvas size ---
    let bottom_y = cursor;
    let participants: Vec<ParticipantGeometry> = slots
        .iter()
        .map(|top| ParticipantGeometry {
            top: *top,
            bottom: Rect::new(top.x, bottom_y, top.width, top.height),
            lifeline_x: top.x + top.width / 2.0,
        })
        .collect();

    let content_right = slots
        .iter()
        .map(Rect::right)
        .chain(elements.values().map(ElementGeometry::right))
        .chain(blocks.iter().filter_map(|b| b.horizontal.map(|(_, right)| right)))
        .fold(config.margin, f64::max);
    let width = content_right + config.margin;
    let height = bottom_y + config.participant_height + config.margin;
    let title = Rect::new(config.margin, title_y, width - 2.0 * config.margin, TITLE_HEIGHT);

    Layout { width, height, title, participants, rows, elements, blocks }
}

/// Heuristic rendered width of a label.
fn text_width(text: &str) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let chars = text.chars().count() as f64;
    chars * CHAR_WIDTH + TEXT_MARGIN
}

/// Extra stacking levels among non-empty blocks matching `shares`.
///
/// Blocks that open (or close) on the same entry form a nesting chain; only
/// levels beyond the first need extra room.
#[allow(clippy::cast_precision_loss)]
fn stacked(diagram: &Diagram, shares: impl Fn(&Block) -> bool) -> f64 {
    let count = diagram.blocks.iter().filter(|b| !b.range.is_empty() && shares(b)).count();
    count.saturating_sub(1) as f64
}

/// Whether `id` is nested (at any depth) inside `ancestor`.
fn is_nested_in(diagram: &Diagram, id: BlockId, ancestor: BlockId) -> bool {
    let mut cursor = diagram.block(id).and_then(|b| b.parent);
    while let Some(parent) = cursor {
        if parent == ancestor {
            return true;
        }
        cursor = diagram.block(parent).and_then(|b| b.parent);
    }
    false
}

struct Placement<'a> {
    diagram: &'a Diagram,
    config: &'a LayoutConfig,
    centers: &'a [f64],
    slots: &'a [Rect],
}

impl Placement<'_> {
    fn center(&self, id: &str) -> Option<f64> {
        self.diagram.participant_index(id).and_then(|i| self.centers.get(i).copied())
    }

    fn message(&self, message: &Message, y: f64) -> Option<MessageGeometry> {
        let from_x = self.center(&message.from)?;
        let label_width = self.config.label_width.max(text_width(&message.text));
        let label_height = self.config.label_height;

        if message.is_self() {
            let points = [
                Point::new(from_x, y),
                Point::new(from_x + SELF_LOOP_W, y),
                Point::new(from_x + SELF_LOOP_W, y + SELF_LOOP_H),
                Point::new(from_x, y + SELF_LOOP_H),
            ];
            let label = Rect::new(
                from_x + SELF_LOOP_W + SELF_LABEL_GAP,
                y + SELF_LOOP_H / 2.0 - label_height / 2.0,
                label_width,
                label_height,
            );
            return Some(MessageGeometry { y, path: MessagePath::SelfLoop { points }, label, dashed: message.is_async });
        }

        let to_x = self.center(&message.to)?;
        let arrow = arrow_end(message.is_async, from_x, to_x);
        let label = Rect::new(
            f64::midpoint(from_x, to_x) - label_width / 2.0,
            y - label_height - LABEL_GAP,
            label_width,
            label_height,
        );
        Some(MessageGeometry {
            y,
            path: MessagePath::Straight { start: Point::new(from_x, y), end: Point::new(to_x, y), arrow },
            label,
            dashed: message.is_async,
        })
    }

    fn note(&self, note: &Note, y: f64) -> Option<NoteGeometry> {
        let centers: Vec<f64> = note.participant_ids.iter().map(|id| self.center(id)).collect::<Option<_>>()?;
        let first = *centers.first()?;
        let text_w = NOTE_MIN_W.max(text_width(&note.text));
        let top = y - NOTE_LIFT;

        let rect = match note.position {
            NotePosition::LeftOf => Rect::new(first - NOTE_GAP - text_w, top, text_w, NOTE_H),
            NotePosition::RightOf => Rect::new(first + NOTE_GAP, top, text_w, NOTE_H),
            NotePosition::Over => {
                let lo = centers.iter().copied().fold(first, f64::min);
                let hi = centers.iter().copied().fold(first, f64::max);
                let span = hi - lo + 2.0 * NOTE_OVERHANG;
                let width = span.max(text_w);
                Rect::new(f64::midpoint(lo, hi) - width / 2.0, top, width, NOTE_H)
            }
        };
        Some(NoteGeometry { y, rect })
    }

    fn block(
        &self,
        id: BlockId,
        block: &Block,
        order: &[&TimelineEntry],
        rows: &BTreeMap<ElementKey, f64>,
        elements: &BTreeMap<ElementKey, ElementGeometry>,
    ) -> BlockGeometry {
        let contained: Vec<(ElementKey, f64)> = order
            .iter()
            .filter(|entry| block.range.contains(entry.sequence_index()))
            .filter_map(|entry| rows.get(&entry.key()).map(|&y| (entry.key(), y)))
            .collect();

        let vertical = contained.first().map(|&(first_key, first_y)| {
            let max_y = contained.iter().map(|&(_, y)| y).fold(first_y, f64::max);
            let top_margin = match first_key.kind {
                ElementKind::Note => BLOCK_TOP_MARGIN_NOTE,
                ElementKind::Message => BLOCK_TOP_MARGIN,
            };
            let above = self.nested_sharing(id, |b| b.range.start == block.range.start);
            let below = self.nested_sharing(id, |b| b.range.end == block.range.end);
            let top = first_y - top_margin - above * BLOCK_CAPTION_STEP;
            (top, max_y + BLOCK_BOTTOM_MARGIN + below * BLOCK_NEST_INSET)
        });

        let horizontal = self.block_horizontal(id, block, elements);

        let dividers = match (block.kind, horizontal) {
            (BlockKind::Alt, Some((left, right))) => block
                .sections()
                .iter()
                .skip(1)
                .filter_map(|section| {
                    let &(_, y) = contained.iter().find(|(key, _)| section.range.contains(key.sequence_index))?;
                    let y = y - DIVIDER_OFFSET;
                    let label = Some(section.condition.as_str())
                        .filter(|c| Some(*c) != block.primary_condition())
                        .map(|c| caption(format!("[{c}]"), left, y));
                    Some(Divider { y, x1: left, x2: right, label })
                })
                .collect(),
            _ => Vec::new(),
        };

        let label = match (block.kind, vertical, horizontal) {
            (BlockKind::Rect, ..) => None,
            (kind, Some((top, _)), Some((left, _))) => {
                let text = match block.primary_condition() {
                    Some(c) if !c.is_empty() => format!("{} [{c}]", kind.keyword()),
                    _ => kind.keyword().to_owned(),
                };
                Some(caption(text, left, top))
            }
            _ => None,
        };

        BlockGeometry { block: id, vertical, horizontal, label, dividers }
    }

    /// Extent over the participants touched by contained messages.
    fn block_horizontal(
        &self,
        id: BlockId,
        block: &Block,
        elements: &BTreeMap<ElementKey, ElementGeometry>,
    ) -> Option<(f64, f64)> {
        let mut span: Option<(f64, f64)> = None;
        for message in self.diagram.messages().filter(|m| block.range.contains(m.sequence_index)) {
            for participant in [&message.from, &message.to] {
                let Some(slot) = self.diagram.participant_index(participant).and_then(|i| self.slots.get(i)) else {
                    continue;
                };
                span = Some(span.map_or((slot.x, slot.right()), |(l, r)| (l.min(slot.x), r.max(slot.right()))));
            }
            if message.is_self() {
                if let Some(ElementGeometry::Message(m)) = elements.get(&ElementKey::message(message.sequence_index)) {
                    span = span.map(|(l, r)| (l, r.max(m.label.right())));
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let inset = self.diagram.block_depth(id) as f64 * BLOCK_NEST_INSET;
        let padding = self.config.block_padding - inset;
        span.map(|(left, right)| (left - padding, right + padding))
    }

    /// Number of non-empty blocks nested in `id` that match `shares`.
    #[allow(clippy::cast_precision_loss)]
    fn nested_sharing(&self, id: BlockId, shares: impl Fn(&Block) -> bool) -> f64 {
        (0..self.diagram.blocks.len())
            .map(BlockId)
            .filter(|&other| is_nested_in(self.diagram, other, id))
            .filter_map(|other| self.diagram.block(other))
            .filter(|b| !b.range.is_empty() && shares(b))
            .count() as f64
    }
}

/// Arrowhead placement for a straight message.
///
/// Async messages always point at `to`, which is the end of the line. Sync
/// messages follow physical direction: the end when `from` is left of `to`,
/// otherwise the start.
#[must_use]
pub fn arrow_end(is_async: bool, from_x: f64, to_x: f64) -> ArrowEnd {
    if is_async || from_x < to_x { ArrowEnd::End } else { ArrowEnd::Start }
}

/// Caption box anchored at the top-left corner `(left, top)`.
fn caption(text: String, left: f64, top: f64) -> BlockLabel {
    let rect = Rect::new(left + BLOCK_LABEL_INSET, top + LABEL_GAP, text_width(&text), BLOCK_LABEL_H);
    BlockLabel { text, rect }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
