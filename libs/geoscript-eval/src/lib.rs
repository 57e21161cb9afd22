//! # geoscript-eval
//!
//! AST-to-scene evaluator: the scope stack, the runtime value
//! domain, the block/command/builtin standard library, solid primitive
//! builders, the scene graph (`Geometry`/`Scene`), and the deterministic
//! PRNG backing `rnd`/`seed`.
//!
//! Consumes a `Vec<Stmt>` from `geoscript-parser` and produces a `Scene`
//! whose `Geometry` nodes build meshes lazily through `geoscript-kernel`.

pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod primitives;
pub mod rng;
pub mod scope;
pub mod value;

pub use error::EvalError;
pub use evaluator::{Delegate, Evaluator, NullDelegate};
pub use geometry::{Along, CameraParams, CsgOp, Geometry, GeometryKind, LightParams, Scene};
pub use rng::Rng;
pub use scope::{ScopeState, Scopes, SymbolKind};
pub use value::Value;

use geoscript_diagnostics::{CancelToken, Diagnostic, Span};

/// The outcome of a failed [`eval_source`] call. Cancellation is kept out
/// of `Diagnostic` deliberately: a cancelled build is not a user-facing
/// failure, and callers (the engine's scheduler) need to tell the two
/// apart.
#[derive(Debug, Clone)]
pub enum CompileError {
    Diagnostic(Diagnostic),
    Cancelled,
}

impl From<Diagnostic> for CompileError {
    fn from(diagnostic: Diagnostic) -> Self {
        CompileError::Diagnostic(diagnostic)
    }
}

/// Parses and evaluates a complete program in one call — the shape
/// `geoscript-engine`'s compile step drives directly.
pub fn eval_source(source: &str, cancel: &dyn CancelToken, delegate: &dyn Delegate) -> Result<Scene, CompileError> {
    let tokens = geoscript_lexer::Lexer::new(source).tokenize().map_err(|e| CompileError::from(Diagnostic::from(e)))?;
    let stmts =
        geoscript_parser::parse_program(tokens).map_err(|e| CompileError::from(Diagnostic::from(e)))?;
    let mut evaluator = Evaluator::new(cancel, delegate);
    match evaluator.eval_program(&stmts) {
        Ok(scene) => Ok(scene),
        Err(EvalError::Cancelled) => Err(CompileError::Cancelled),
        Err(other) => Err(CompileError::Diagnostic(other.into_diagnostic(Span::point(0)))),
    }
}
