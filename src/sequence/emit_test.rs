use super::*;
use crate::canvas::BoardCanvas;
use crate::config::LayoutConfig;
use crate::sequence::{layout, parse};

fn plan_for(source: &str) -> Plan {
    let diagram = parse(source);
    let layout = layout(&diagram, &LayoutConfig::default());
    plan(&diagram, &layout, "Title")
}

/// Line commands as `(x1, x2, dashed, start_arrow, end_arrow)`, message lines only.
fn message_lines(plan: &Plan) -> Vec<(f64, f64, bool, bool, bool)> {
    plan.commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Line { x1, x2, color: stroke, style, .. } if *stroke == color::TEXT => {
                Some((*x1, *x2, style.dashed, style.start_arrow, style.end_arrow))
            }
            _ => None,
        })
        .collect()
}

fn texts(plan: &Plan) -> Vec<&str> {
    plan.commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn commands_follow_back_to_front_order() {
    let plan = plan_for(
        "participant A\nparticipant B\nalt X\nA->>B: m1\nelse Y\nnote over A: n\nB->>A: m2\nend",
    );
    let kinds: Vec<&str> = plan
        .commands
        .iter()
        .map(|c| match c {
            DrawCommand::Rectangle { .. } => "rect",
            DrawCommand::Line { .. } => "line",
            DrawCommand::Text { .. } => "text",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            // block frame, label, divider, divider label
            "rect", "text", "line", "text",
            // note
            "rect", "text",
            // top row
            "rect", "text", "rect", "text",
            // lifelines
            "line", "line",
            // bottom row
            "rect", "text", "rect", "text",
            // messages
            "line", "text", "line", "text",
            // title
            "text",
        ]
    );
    assert_eq!(texts(&plan), ["alt [X]", "[Y]", "n", "A", "B", "A", "B", "m1", "m2", "Title"]);
    assert!(plan.warnings.is_empty());
}

#[test]
fn title_is_emitted_last() {
    let plan = plan_for("A->>B: x");
    let Some(DrawCommand::Text { content, style, .. }) = plan.commands.last() else {
        panic!("expected title text");
    };
    assert_eq!(content, "Title");
    assert!(style.bold);
}

// =============================================================================
// MESSAGES
// =============================================================================

#[test]
fn scenario_a_arrowheads_point_at_to() {
    let plan = plan_for("participant A\nparticipant B\nA->>B: Hi\nB-->>A: Hi back");
    assert_eq!(
        message_lines(&plan),
        [(100.0, 300.0, false, false, true), (300.0, 100.0, true, false, true)]
    );
}

#[test]
fn sync_right_to_left_uses_start_arrow() {
    let plan = plan_for("participant A\nparticipant B\nB->>A: back");
    assert_eq!(message_lines(&plan), [(300.0, 100.0, false, true, false)]);
}

#[test]
fn self_message_emits_three_segments_with_arrow_on_return() {
    let plan = plan_for("participant A\nA-->>A: poll");
    let lines = message_lines(&plan);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines.iter().map(|l| l.4).collect::<Vec<_>>(), [false, false, true]);
    assert!(lines.iter().all(|l| l.2), "async loop is dashed");
    assert!(lines.iter().all(|l| !l.3));

    let label = plan.commands.iter().find_map(|c| match c {
        DrawCommand::Text { content, style, .. } if content == "poll" => Some(style.align),
        _ => None,
    });
    assert_eq!(label, Some(TextAlign::Left));
}

#[test]
fn empty_message_text_has_no_label() {
    let plan = plan_for("A->>B:");
    assert_eq!(texts(&plan), ["A", "B", "A", "B", "Title"]);
}

// =============================================================================
// BLOCKS & NOTES
// =============================================================================

#[test]
fn rect_block_uses_its_colors() {
    let plan = plan_for("rect rgb(230,255,230)\nA->>B: x\nend");
    let DrawCommand::Rectangle { fill, border, dashed, .. } = &plan.commands[0] else {
        panic!("expected block rectangle first");
    };
    assert_eq!(*fill, Some(Rgb::new(230, 255, 230)));
    assert_eq!(*border, Rgb::new(170, 195, 170));
    assert!(!dashed);
}

#[test]
fn scenario_d_note_only_block_is_reported_and_skipped() {
    let plan = plan_for("participant A\nrect rgb(230,255,230)\nnote over A: only a note\nend");
    assert_eq!(plan.warnings, [RenderWarning::BlockWithoutExtent { block: BlockId(0) }]);
    let DrawCommand::Rectangle { fill, .. } = &plan.commands[0] else {
        panic!("expected note rectangle first");
    };
    assert_eq!(*fill, Some(color::NOTE_FILL));
}

#[test]
fn missing_geometry_skips_element_with_warning() {
    let plan = plan_for("note over Ghost: boo\nA->>B: x");
    assert_eq!(plan.warnings, [RenderWarning::MissingGeometry { key: ElementKey::note(0) }]);
    assert!(!texts(&plan).contains(&"boo"));
    assert_eq!(message_lines(&plan).len(), 1);
}

#[test]
fn desynchronized_layout_is_reported_not_fatal() {
    let diagram = parse("A->>B: one\nB->>A: two");
    let mut layout = layout(&diagram, &LayoutConfig::default());
    layout.elements.remove(&ElementKey::message(0));
    let plan = plan(&diagram, &layout, "t");
    assert_eq!(plan.warnings, [RenderWarning::MissingGeometry { key: ElementKey::message(0) }]);
    assert_eq!(message_lines(&plan).len(), 1);
}

// =============================================================================
// REPLAY
// =============================================================================

#[test]
fn replay_creates_one_shape_per_command_in_order() {
    let plan = plan_for("participant A\nparticipant B\nopt maybe\nA->>B: x\nend\nnote right of B: n");
    let mut canvas = BoardCanvas::default();
    replay(&plan.commands, &mut canvas);

    let objects = canvas.objects();
    assert_eq!(objects.len(), plan.commands.len());
    for (object, command) in objects.iter().zip(&plan.commands) {
        let expected = match command {
            DrawCommand::Rectangle { .. } => "rectangle",
            DrawCommand::Line { .. } => "line",
            DrawCommand::Text { .. } => "text",
        };
        assert_eq!(object.kind, expected);
    }
    let frame = &objects[0];
    assert_eq!(frame.props["dashPattern"], "8,4");
    assert_eq!(frame.props["fill"], color::BLOCK_FILL.to_hex());
}

#[test]
fn commands_serialize_with_kind_tags() {
    let plan = plan_for("A->>B: x");
    let json = serde_json::to_value(&plan.commands).unwrap();
    assert_eq!(json[0]["kind"], "rectangle");
    assert_eq!(json[0]["fill"], "#e3f2fd");
    let line = json.as_array().unwrap().iter().find(|c| c["kind"] == "line").unwrap();
    assert_eq!(line["dashed"], true);
    assert!(line.get("end_arrow").is_some());
}
