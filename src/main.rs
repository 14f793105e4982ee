use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use seqboard::canvas::BoardCanvas;
use seqboard::pipeline::DEFAULT_TITLE;
use seqboard::{LayoutConfig, RenderError, render};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] seqboard::config::ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "seqboard", about = "Lay out a sequence diagram as drawing primitives")]
struct Cli {
    /// Diagram source file; reads stdin when omitted.
    input: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// JSON file with layout overrides.
    #[arg(long, env = "SEQBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Commands)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Ordered draw commands with canvas size and warnings.
    Commands,
    /// Board objects as created on the canvas.
    Board,
    /// Canvas size only.
    Size,
}

#[derive(Serialize)]
struct Size {
    width: f64,
    height: f64,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = LayoutConfig::load(cli.config.as_deref())?;
    let source = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut canvas = BoardCanvas::default();
    let rendered = render(&source, &config, &cli.title, &mut canvas)?;
    tracing::info!(handle = rendered.handle.as_deref().unwrap_or_default(), "wrote diagram");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Commands => serde_json::to_writer_pretty(&mut out, &rendered)?,
        Format::Board => serde_json::to_writer_pretty(&mut out, canvas.objects())?,
        Format::Size => serde_json::to_writer_pretty(&mut out, &Size { width: rendered.width, height: rendered.height })?,
    }
    writeln!(out)?;
    Ok(())
}
