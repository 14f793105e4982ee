use super::*;
use crate::sequence::ast::NotePosition;
use crate::sequence::color::Rgb;

fn message(diagram: &Diagram, n: usize) -> &Message {
    diagram.messages().nth(n).unwrap()
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[test]
fn scenario_a_two_participants_two_messages() {
    let diagram = parse("participant A\nparticipant B\nA->>B: Hi\nB-->>A: Hi back");
    assert_eq!(diagram.participants.len(), 2);
    let first = message(&diagram, 0);
    let second = message(&diagram, 1);
    assert_eq!((first.sequence_index, first.is_async), (0, false));
    assert_eq!((second.sequence_index, second.is_async), (1, true));
    assert_eq!((second.from.as_str(), second.to.as_str()), ("B", "A"));
    assert!(diagram.warnings.is_empty());
}

#[test]
fn scenario_e_undeclared_ids_are_auto_declared_in_first_seen_order() {
    let diagram = parse("X->>Y: hi");
    let ids: Vec<&str> = diagram.participants.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["X", "Y"]);
    assert_eq!(diagram.participants[0].display_name, "X");
}

#[test]
fn redeclaration_keeps_first_display_name() {
    let diagram = parse("participant A as Alice\nparticipant A as Other\nA->>A: self");
    assert_eq!(diagram.participants.len(), 1);
    assert_eq!(diagram.participants[0].display_name, "Alice");
}

#[test]
fn explicit_declaration_after_use_is_a_no_op() {
    let diagram = parse("B->>A: first\nparticipant A as Alice\nparticipant C");
    let ids: Vec<&str> = diagram.participants.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["B", "A", "C"]);
    assert_eq!(diagram.participants[1].display_name, "A");
}

#[test]
fn note_ids_are_not_auto_declared() {
    let diagram = parse("note over Ghost: boo");
    assert!(diagram.participants.is_empty());
    assert_eq!(diagram.notes().count(), 1);
}

// =============================================================================
// SEQUENCE INDEX
// =============================================================================

#[test]
fn scenario_c_note_consumes_an_index() {
    let diagram = parse("note over A,B: hello\nA->>B: go");
    let note = diagram.notes().next().unwrap();
    assert_eq!(note.sequence_index, 0);
    assert_eq!(note.position, NotePosition::Over);
    assert_eq!(note.participant_ids, ["A", "B"]);
    assert_eq!(message(&diagram, 0).sequence_index, 1);
}

#[test]
fn index_only_advances_on_messages_and_notes() {
    let source = [
        "participant A",
        "rect rgb(1,2,3)",
        "garbage line",
        "A->>B: one",
        "alt c",
        "note right of A: n",
        "else",
        "end",
        "end",
        "B->>A: two",
    ];
    let mut builder = DiagramBuilder::default();
    let mut seen = Vec::new();
    let mut depths = Vec::new();
    for (i, line) in source.iter().enumerate() {
        builder.feed(i + 1, line);
        seen.push(builder.next_index());
        depths.push(builder.depth());
    }
    assert_eq!(seen, [0, 0, 0, 1, 1, 2, 2, 2, 2, 3]);
    assert_eq!(depths, [0, 1, 1, 1, 2, 2, 2, 1, 0, 0]);
    for pair in seen.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn timeline_is_in_index_order() {
    let diagram = parse("A->>B: a\nnote over A: n\nB->>A: b\nnote left of B: m");
    let indices: Vec<usize> = diagram.timeline.iter().map(TimelineEntry::sequence_index).collect();
    assert_eq!(indices, [0, 1, 2, 3]);
}

// =============================================================================
// BLOCKS
// =============================================================================

#[test]
fn scenario_b_alt_with_else_sections() {
    let diagram = parse("alt X\nA->>B: m1\nelse Y\nB->>A: m2\nend");
    assert_eq!(diagram.blocks.len(), 1);
    let block = &diagram.blocks[0];
    assert_eq!(block.kind, BlockKind::Alt);
    assert_eq!(block.range.start, 0);
    assert_eq!(block.range.end_index(), Some(1));
    let sections = block.sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].condition, "X");
    assert_eq!((sections[0].range.start, sections[0].range.end_index()), (0, Some(0)));
    assert_eq!(sections[1].condition, "Y");
    assert_eq!((sections[1].range.start, sections[1].range.end_index()), (1, Some(1)));
}

#[test]
fn else_without_condition_uses_literal_else() {
    let diagram = parse("alt ok\nA->>B: x\nelse\nA->>B: y\nend");
    assert_eq!(diagram.blocks[0].sections()[1].condition, "else");
}

#[test]
fn opt_has_exactly_one_section() {
    let diagram = parse("opt maybe\nA->>B: x\nelse nope\nA->>B: y\nend");
    let block = &diagram.blocks[0];
    assert_eq!(block.kind, BlockKind::Opt);
    assert_eq!(block.sections().len(), 1);
    assert_eq!(block.sections()[0].range.end_index(), Some(1));
    assert_eq!(diagram.warnings, [ParseWarning::MisplacedElse { line: 3 }]);
}

#[test]
fn else_is_a_no_op_inside_rect() {
    let diagram = parse("alt outer\nrect rgb(230,255,230)\nA->>B: x\nelse inner\nend\nend");
    assert_eq!(diagram.blocks.len(), 2);
    let alt = &diagram.blocks[0];
    assert_eq!(alt.sections().len(), 1);
    let rect = &diagram.blocks[1];
    assert_eq!(rect.kind, BlockKind::Rect);
    assert!(rect.sections().is_empty());
    assert_eq!(diagram.warnings, [ParseWarning::MisplacedElse { line: 4 }]);
}

#[test]
fn nested_blocks_close_lifo() {
    let source = "\
rect rgb(230,255,230)
A->>B: 0
alt outer
B->>C: 1
opt inner
C->>A: 2
end
A->>B: 3
end
B->>A: 4
end
A->>A: 5";
    let diagram = parse(source);
    let ranges: Vec<(BlockKind, usize, Option<usize>)> =
        diagram.blocks.iter().map(|b| (b.kind, b.range.start, b.range.end_index())).collect();
    assert_eq!(
        ranges,
        [(BlockKind::Rect, 0, Some(4)), (BlockKind::Alt, 1, Some(3)), (BlockKind::Opt, 2, Some(2))]
    );
    assert_eq!(diagram.blocks[1].parent, Some(BlockId(0)));
    assert_eq!(diagram.blocks[2].parent, Some(BlockId(1)));
    assert_eq!(diagram.block_depth(BlockId(2)), 2);
    assert_eq!(message(&diagram, 2).enclosing_blocks, [BlockId(0), BlockId(1), BlockId(2)]);
    assert_eq!(message(&diagram, 3).enclosing_blocks, [BlockId(0), BlockId(1)]);
    assert!(message(&diagram, 5).enclosing_blocks.is_empty());
}

#[test]
fn rect_colors_derive_border() {
    let diagram = parse("rect rgb(230,255,230)\nnote over A: only a note\nend");
    let colors = diagram.blocks[0].colors().unwrap();
    assert_eq!(colors.fill, Rgb::new(230, 255, 230));
    assert_eq!(colors.border, Rgb::new(170, 195, 170));
}

#[test]
fn out_of_range_rect_color_keeps_nesting() {
    let diagram = parse("alt outer\nA->>B: a\nrect rgb(300,0,0)\nA->>B: b\nend\nA->>B: c\nend");
    let ranges: Vec<(BlockKind, usize, Option<usize>)> =
        diagram.blocks.iter().map(|b| (b.kind, b.range.start, b.range.end_index())).collect();
    assert_eq!(ranges, [(BlockKind::Alt, 0, Some(2)), (BlockKind::Rect, 1, Some(1))]);
    assert_eq!(diagram.blocks[1].colors().unwrap().fill, Rgb::new(255, 0, 0));
    assert_eq!(message(&diagram, 2).enclosing_blocks, [BlockId(0)]);
    assert_eq!(diagram.warnings, [ParseWarning::ClampedColor { line: 3 }]);
}

#[test]
fn scenario_d_note_only_rect_has_vertical_range() {
    let diagram = parse("rect rgb(230,255,230)\nnote over A: only a note\nend");
    let block = &diagram.blocks[0];
    assert_eq!(block.range.start, 0);
    assert_eq!(block.range.end_index(), Some(0));
    assert_eq!(diagram.messages().count(), 0);
}

#[test]
fn unmatched_end_is_ignored_with_warning() {
    let diagram = parse("end\nA->>B: x");
    assert!(diagram.blocks.is_empty());
    assert_eq!(message(&diagram, 0).sequence_index, 0);
    assert_eq!(diagram.warnings, [ParseWarning::UnmatchedEnd { line: 1 }]);
}

#[test]
fn unterminated_blocks_close_at_last_element() {
    let diagram = parse("alt a\nA->>B: x\nopt b\nB->>A: y");
    let ranges: Vec<Option<usize>> = diagram.blocks.iter().map(|b| b.range.end_index()).collect();
    assert_eq!(ranges, [Some(1), Some(1)]);
    assert_eq!(
        diagram.warnings,
        [
            ParseWarning::UnterminatedBlock { kind: BlockKind::Opt, opened_at: 3 },
            ParseWarning::UnterminatedBlock { kind: BlockKind::Alt, opened_at: 1 },
        ]
    );
}

#[test]
fn block_closed_before_any_element_is_empty() {
    let diagram = parse("opt nothing\nend");
    let range = diagram.blocks[0].range;
    assert!(range.is_empty());
    assert_eq!(range.end_index(), None);
}

#[test]
fn empty_input_yields_empty_diagram() {
    let diagram = parse("");
    assert!(diagram.participants.is_empty());
    assert!(diagram.timeline.is_empty());
    assert!(diagram.blocks.is_empty());
}
