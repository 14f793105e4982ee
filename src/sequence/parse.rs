//! Diagram model builder.
//!
//! DESIGN
//! ======
//! The builder owns the only mutable parse state: the participant registry,
//! the timeline, the block arena and the stack of open blocks. The sequence
//! index is a field of the builder and is only advanced by messages and notes.
//! Open blocks are kept as builders on the stack and frozen into the arena
//! when popped; a frozen block is never touched again.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::ast::{
    Block, BlockId, BlockKind, BlockPayload, Diagram, IndexRange, Message, Note, ParseWarning, Participant,
    Section, TimelineEntry,
};
use super::classify::{ConditionalKind, LineEvent, classify};
use super::color::RectColors;

/// Parse diagram source into a [`Diagram`].
///
/// Parsing never fails: unrecognized lines are skipped and structural
/// problems are recorded in [`Diagram::warnings`].
#[must_use]
pub fn parse(input: &str) -> Diagram {
    let mut builder = DiagramBuilder::default();
    for (i, line) in input.lines().enumerate() {
        builder.feed(i + 1, line);
    }
    builder.finish()
}

/// Incremental builder consuming one source line at a time.
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    participants: Vec<Participant>,
    known_ids: HashSet<String>,
    timeline: Vec<TimelineEntry>,
    arena: Vec<Option<Block>>,
    open: Vec<OpenBlock>,
    next_index: usize,
    warnings: Vec<ParseWarning>,
}

#[derive(Debug)]
struct OpenBlock {
    id: BlockId,
    kind: BlockKind,
    start: usize,
    line: usize,
    parent: Option<BlockId>,
    state: OpenPayload,
}

#[derive(Debug)]
enum OpenPayload {
    Sections { closed: Vec<Section>, condition: String, start: usize },
    Colors(RectColors),
}

impl DiagramBuilder {
    /// The sequence index the next message or note will receive.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Number of blocks currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Consume one source line. `line_no` is 1-based and only used for
    /// diagnostics.
    pub fn feed(&mut self, line_no: usize, line: &str) {
        let Some(event) = classify(line) else {
            if !line.trim().is_empty() {
                debug!(line = line_no, "skipping unrecognized line");
            }
            return;
        };
        match event {
            LineEvent::Participant { id, display_name } => self.declare(id, display_name.unwrap_or(id)),
            LineEvent::Rect { fill, clamped } => {
                if clamped {
                    warn!(line = line_no, "clamping out-of-range rect color channel");
                    self.warnings.push(ParseWarning::ClampedColor { line: line_no });
                }
                self.open_block(line_no, BlockKind::Rect, OpenPayload::Colors(RectColors::from_fill(fill)));
            }
            LineEvent::Open { kind, condition } => {
                let kind = match kind {
                    ConditionalKind::Alt => BlockKind::Alt,
                    ConditionalKind::Opt => BlockKind::Opt,
                };
                let payload =
                    OpenPayload::Sections { closed: Vec::new(), condition: condition.to_owned(), start: self.next_index };
                self.open_block(line_no, kind, payload);
            }
            LineEvent::Note { position, participant_ids, text } => {
                let note = Note {
                    position,
                    participant_ids: participant_ids.into_iter().map(str::to_owned).collect(),
                    text: text.to_owned(),
                    sequence_index: self.next_index,
                };
                self.timeline.push(TimelineEntry::Note(note));
                self.next_index += 1;
            }
            LineEvent::Else { condition } => self.else_section(line_no, condition.unwrap_or("else")),
            LineEvent::End => self.end_block(line_no),
            LineEvent::Message { from, to, text, is_async } => {
                self.declare(from, from);
                self.declare(to, to);
                let message = Message {
                    from: from.to_owned(),
                    to: to.to_owned(),
                    text: text.to_owned(),
                    is_async,
                    sequence_index: self.next_index,
                    enclosing_blocks: self.open.iter().map(|b| b.id).collect(),
                };
                self.timeline.push(TimelineEntry::Message(message));
                self.next_index += 1;
            }
        }
    }

    /// Force-close any open blocks and freeze the diagram.
    #[must_use]
    pub fn finish(mut self) -> Diagram {
        while let Some(block) = self.open.pop() {
            warn!(kind = block.kind.keyword(), line = block.line, "closing unterminated block at end of input");
            self.warnings.push(ParseWarning::UnterminatedBlock { kind: block.kind, opened_at: block.line });
            self.freeze(block);
        }
        Diagram {
            participants: self.participants,
            timeline: self.timeline,
            blocks: self.arena.into_iter().flatten().collect(),
            warnings: self.warnings,
        }
    }

    fn declare(&mut self, id: &str, display_name: &str) {
        if self.known_ids.insert(id.to_owned()) {
            self.participants.push(Participant { id: id.to_owned(), display_name: display_name.to_owned() });
        }
    }

    fn open_block(&mut self, line: usize, kind: BlockKind, state: OpenPayload) {
        let id = BlockId(self.arena.len());
        self.arena.push(None);
        let parent = self.open.last().map(|b| b.id);
        self.open.push(OpenBlock { id, kind, start: self.next_index, line, parent, state });
    }

    fn else_section(&mut self, line: usize, condition: &str) {
        let next_index = self.next_index;
        let current = self.open.last_mut().filter(|b| b.kind == BlockKind::Alt);
        let Some(OpenBlock { state: OpenPayload::Sections { closed, condition: open_condition, start }, .. }) = current
        else {
            warn!(line, "ignoring `else` outside an `alt` block");
            self.warnings.push(ParseWarning::MisplacedElse { line });
            return;
        };
        let finished = std::mem::replace(open_condition, condition.to_owned());
        closed.push(Section { condition: finished, range: IndexRange::new(*start, next_index) });
        *start = next_index;
    }

    fn end_block(&mut self, line: usize) {
        match self.open.pop() {
            Some(block) => self.freeze(block),
            None => {
                warn!(line, "ignoring `end` without an open block");
                self.warnings.push(ParseWarning::UnmatchedEnd { line });
            }
        }
    }

    fn freeze(&mut self, block: OpenBlock) {
        let end = self.next_index;
        let payload = match block.state {
            OpenPayload::Sections { mut closed, condition, start } => {
                closed.push(Section { condition, range: IndexRange::new(start, end) });
                BlockPayload::Sections(closed)
            }
            OpenPayload::Colors(colors) => BlockPayload::Colors(colors),
        };
        let frozen = Block { kind: block.kind, range: IndexRange::new(block.start, end), parent: block.parent, payload };
        if let Some(slot) = self.arena.get_mut(block.id.0) {
            *slot = Some(frozen);
        }
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
