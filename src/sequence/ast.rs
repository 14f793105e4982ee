//! Model types for a parsed sequence diagram.
//!
//! The model is built once by [`super::parse::DiagramBuilder`] and is read-only
//! afterwards. Messages and notes share one timeline; blocks live in an arena
//! addressed by [`BlockId`].

use serde::Serialize;

use super::color::RectColors;

/// A parsed sequence diagram.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub participants: Vec<Participant>,
    /// Messages and notes in sequence-index order.
    pub timeline: Vec<TimelineEntry>,
    /// Blocks in the order their opening lines appear.
    pub blocks: Vec<Block>,
    /// Recovered problems found while parsing.
    pub warnings: Vec<ParseWarning>,
}

impl Diagram {
    /// Position of a participant in declaration order.
    #[must_use]
    pub fn participant_index(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.timeline.iter().filter_map(|entry| match entry {
            TimelineEntry::Message(m) => Some(m),
            TimelineEntry::Note(_) => None,
        })
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.timeline.iter().filter_map(|entry| match entry {
            TimelineEntry::Note(n) => Some(n),
            TimelineEntry::Message(_) => None,
        })
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    /// Number of blocks enclosing `id`.
    #[must_use]
    pub fn block_depth(&self, id: BlockId) -> usize {
        let mut depth = 0;
        let mut cursor = self.block(id).and_then(|b| b.parent);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.block(parent).and_then(|b| b.parent);
        }
        depth
    }
}

/// A named participant (lifeline owner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
}

/// One chronological element of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    Message(Message),
    Note(Note),
}

impl TimelineEntry {
    #[must_use]
    pub fn sequence_index(&self) -> usize {
        match self {
            Self::Message(m) => m.sequence_index,
            Self::Note(n) => n.sequence_index,
        }
    }

    #[must_use]
    pub fn key(&self) -> ElementKey {
        match self {
            Self::Message(m) => ElementKey::message(m.sequence_index),
            Self::Note(n) => ElementKey::note(n.sequence_index),
        }
    }
}

/// Discriminates timeline entries that share a sequence index.
///
/// Declaration order is the tie-break order: messages before notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Message,
    Note,
}

/// Geometry lookup key: `(sequence_index, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementKey {
    pub sequence_index: usize,
    pub kind: ElementKind,
}

impl ElementKey {
    #[must_use]
    pub const fn message(sequence_index: usize) -> Self {
        Self { sequence_index, kind: ElementKind::Message }
    }

    #[must_use]
    pub const fn note(sequence_index: usize) -> Self {
        Self { sequence_index, kind: ElementKind::Note }
    }
}

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ElementKind::Message => "message",
            ElementKind::Note => "note",
        };
        write!(f, "{kind} #{}", self.sequence_index)
    }
}

/// A message arrow between two participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    /// `-->>`: dashed line, response semantics.
    pub is_async: bool,
    pub sequence_index: usize,
    /// Blocks open when the message was read, outermost first.
    pub enclosing_blocks: Vec<BlockId>,
}

impl Message {
    #[must_use]
    pub fn is_self(&self) -> bool {
        self.from == self.to
    }
}

/// A note attached to one or more participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub position: NotePosition,
    pub participant_ids: Vec<String>,
    pub text: String,
    pub sequence_index: usize,
}

/// Where a note sits relative to its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePosition {
    Over,
    LeftOf,
    RightOf,
}

/// Arena index of a block within [`Diagram::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockId(pub usize);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block #{}", self.0)
    }
}

/// A closed range of sequence indices, stored half-open.
///
/// `end` is the sequence index that was current when the range closed, so the
/// last contained element is `end - 1`. A range closed before any element was
/// consumed is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Inclusive end index, or `None` if nothing had been consumed yet.
    #[must_use]
    pub const fn end_index(&self) -> Option<usize> {
        self.end.checked_sub(1)
    }

    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The kind of a bounded region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Alt,
    Opt,
    Rect,
}

impl BlockKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Opt => "opt",
            Self::Rect => "rect",
        }
    }
}

/// A closed `alt`, `opt` or `rect` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub range: IndexRange,
    /// Innermost block that was open when this one opened.
    pub parent: Option<BlockId>,
    pub payload: BlockPayload,
}

impl Block {
    /// Conditional sections; empty for `rect`.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        match &self.payload {
            BlockPayload::Sections(sections) => sections,
            BlockPayload::Colors(_) => &[],
        }
    }

    #[must_use]
    pub fn colors(&self) -> Option<RectColors> {
        match self.payload {
            BlockPayload::Colors(colors) => Some(colors),
            BlockPayload::Sections(_) => None,
        }
    }

    /// Condition of the first section, if any.
    #[must_use]
    pub fn primary_condition(&self) -> Option<&str> {
        self.sections().first().map(|s| s.condition.as_str())
    }
}

/// Kind-specific block data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPayload {
    Sections(Vec<Section>),
    Colors(RectColors),
}

/// One labeled branch of an `alt` or `opt` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub condition: String,
    pub range: IndexRange,
}

/// A recovered problem in the diagram source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseWarning {
    #[error("line {line}: `end` without an open block")]
    UnmatchedEnd { line: usize },
    #[error("line {line}: `else` outside an `alt` block")]
    MisplacedElse { line: usize },
    #[error("line {line}: `rect` color channel outside 0..=255 was clamped")]
    ClampedColor { line: usize },
    #[error("`{}` block opened on line {opened_at} was never closed", kind.keyword())]
    UnterminatedBlock { kind: BlockKind, opened_at: usize },
}
