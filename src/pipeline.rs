//! End-to-end rendering: source text to draw calls on a canvas.

use serde::Serialize;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::config::{ConfigError, LayoutConfig};
use crate::sequence::ast::ParseWarning;
use crate::sequence::{self, DrawCommand, RenderWarning};

pub const DEFAULT_TITLE: &str = "Sequence Diagram";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("diagram has no participants")]
    EmptyDiagram,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
    #[serde(serialize_with = "display_all")]
    pub parse_warnings: Vec<ParseWarning>,
    pub render_warnings: Vec<RenderWarning>,
    /// Opaque reference returned by the canvas, if any.
    pub handle: Option<String>,
}

/// Parse, lay out and emit `source` onto `canvas`.
///
/// # Errors
///
/// Returns [`RenderError::EmptyDiagram`] when parsing yields no participants
/// (nothing is drawn), or [`RenderError::Config`] for an invalid config.
pub fn render<C: Canvas + ?Sized>(
    source: &str,
    config: &LayoutConfig,
    title: &str,
    canvas: &mut C,
) -> Result<Rendered, RenderError> {
    config.validate()?;

    let diagram = sequence::parse(source);
    if diagram.participants.is_empty() {
        return Err(RenderError::EmptyDiagram);
    }
    debug!(
        participants = diagram.participants.len(),
        entries = diagram.timeline.len(),
        blocks = diagram.blocks.len(),
        "parsed diagram"
    );

    let layout = sequence::layout(&diagram, config);
    let plan = sequence::plan(&diagram, &layout, title);
    sequence::replay(&plan.commands, canvas);
    let handle = canvas.finish();

    info!(
        width = layout.width,
        height = layout.height,
        commands = plan.commands.len(),
        warnings = diagram.warnings.len() + plan.warnings.len(),
        "diagram rendered"
    );

    Ok(Rendered {
        width: layout.width,
        height: layout.height,
        commands: plan.commands,
        parse_warnings: diagram.warnings,
        render_warnings: plan.warnings,
        handle,
    })
}

fn display_all<S: serde::Serializer>(warnings: &[ParseWarning], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(warnings.iter().map(ToString::to_string))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
