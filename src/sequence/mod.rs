//! Sequence diagram parser, layout engine and primitive emitter.
//!
//! Parses the line-oriented sequence DSL into a [`ast::Diagram`], lays it out
//! as positioned geometry, and projects that geometry into ordered
//! [`emit::DrawCommand`]s for a [`crate::canvas::Canvas`].

pub mod ast;
pub mod classify;
pub mod color;
pub mod emit;
pub mod layout;
pub mod parse;

pub use emit::{DrawCommand, Plan, RenderWarning, plan, replay};
pub use layout::layout;
pub use parse::parse;
