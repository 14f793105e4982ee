//! Sequence diagram parser and layout engine.
//!
//! Turns a small line-oriented sequence DSL (participants, messages, notes,
//! `alt`/`else`, `opt` and colored `rect` regions) into positioned drawing
//! primitives, and replays them onto an abstract [`canvas::Canvas`].

pub mod canvas;
pub mod config;
pub mod pipeline;
pub mod sequence;

pub use config::LayoutConfig;
pub use pipeline::{Rendered, RenderError, render};
