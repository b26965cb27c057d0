//! Dimensional semantic analyser and tree-walking evaluator for the document
//! expression language: an AST in (`ast::Node`), a `Value`/`AnalysisError` or
//! `Value`/`RuntimeError` out, with placeholder and `\graphic` results
//! threaded through [`replacement::ReplacementRegistry`].

pub mod analyser;
pub mod ast;
pub mod core;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod registry;
pub mod replacement;

pub use ast::{Coordinate, Node, Tag};
pub use error::{AnalysisError, AnalysisResult, RuntimeError, RuntimeResult};
pub use evaluator::{Evaluator, EvaluatorConfig};
pub use replacement::{Replacement, ReplacementRegistry};

/// Runs the semantic analyser over a program tree. The downward entry point
/// named in §6: `analyse(root) -> void | AnalysisError`.
pub fn analyse(root: &Node) -> AnalysisResult<()> {
    analyser::analyse(root)
}
