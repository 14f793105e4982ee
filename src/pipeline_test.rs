use super::*;
use crate::canvas::BoardCanvas;

const SCENARIO_A: &str = "participant A\nparticipant B\nA->>B: Hi\nB-->>A: Hi back";

#[test]
fn renders_onto_board_canvas() {
    let mut canvas = BoardCanvas::default();
    let rendered = render(SCENARIO_A, &LayoutConfig::default(), DEFAULT_TITLE, &mut canvas).unwrap();

    assert_eq!((rendered.width, rendered.height), (400.0, 340.0));
    assert_eq!(rendered.commands.len(), canvas.objects().len());
    assert_eq!(rendered.handle, Some(format!("board:{}", canvas.board_id())));
    assert!(rendered.parse_warnings.is_empty());
    assert!(rendered.render_warnings.is_empty());
}

#[test]
fn empty_source_is_rejected_before_drawing() {
    let mut canvas = BoardCanvas::default();
    let err = render("", &LayoutConfig::default(), DEFAULT_TITLE, &mut canvas).unwrap_err();
    assert!(matches!(err, RenderError::EmptyDiagram));
    assert!(canvas.objects().is_empty());
}

#[test]
fn source_without_participants_is_rejected() {
    let mut canvas = BoardCanvas::default();
    let source = "sequenceDiagram\n%% nothing here\nend\nthis is not a statement";
    let err = render(source, &LayoutConfig::default(), DEFAULT_TITLE, &mut canvas).unwrap_err();
    assert!(matches!(err, RenderError::EmptyDiagram));
    assert!(canvas.objects().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = LayoutConfig { message_spacing: 0.0, ..LayoutConfig::default() };
    let mut canvas = BoardCanvas::default();
    let err = render(SCENARIO_A, &config, DEFAULT_TITLE, &mut canvas).unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::NotPositive { field: "message_spacing" })));
    assert!(canvas.objects().is_empty());
}

#[test]
fn warnings_are_surfaced() {
    let source = "participant A\nend\nnote over Ghost: boo\nopt\nA->>A: loop";
    let mut canvas = BoardCanvas::default();
    let rendered = render(source, &LayoutConfig::default(), "t", &mut canvas).unwrap();

    assert_eq!(rendered.parse_warnings.len(), 2, "{:?}", rendered.parse_warnings);
    assert!(matches!(rendered.parse_warnings[0], ParseWarning::UnmatchedEnd { .. }));
    assert!(matches!(rendered.parse_warnings[1], ParseWarning::UnterminatedBlock { .. }));
    assert_eq!(rendered.render_warnings.len(), 1);
}

#[test]
fn rendered_serializes_warnings_as_messages() {
    let mut canvas = BoardCanvas::default();
    let rendered = render("A->>B: x\nend", &LayoutConfig::default(), "t", &mut canvas).unwrap();
    let json = serde_json::to_value(&rendered).unwrap();

    assert_eq!(json["width"], rendered.width);
    assert!(json["parse_warnings"][0].is_string());
    assert_eq!(json["commands"].as_array().map(Vec::len), Some(rendered.commands.len()));
    assert!(json["handle"].as_str().unwrap().starts_with("board:"));
}
