//! Geometry-kernel errors, plus the kernel's half of the cooperative-
//! cancellation sentinel.

use thiserror::Error;

/// Errors the geometry kernel itself can raise. `Cancelled` is carried
/// through the same `Result` channel as a matter of plumbing convenience,
/// but callers (the evaluator, the engine's build scheduler) must treat it
/// as the dedicated non-error control-flow signal it is, and never
/// surface it as a user-facing diagnostic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polygon is not planar within tolerance")]
    NonPlanarPolygon,
    #[error("path is degenerate: {0}")]
    DegeneratePath(String),
    #[error("convex hull needs at least 3 non-collinear points")]
    HullDegenerate,
    #[error("build was cancelled")]
    Cancelled,
}

pub type KResult<T> = Result<T, GeometryError>;

/// A polling callback the kernel checks at suspension points named in spec
/// §5 ("between top-level polygons/statements"). `&|| false` is a valid
/// always-run token for callers that don't need cancellation.
pub type Cancel<'a> = &'a dyn Fn() -> bool;

#[inline]
pub fn check_cancelled(cancel: Cancel) -> KResult<()> {
    if cancel() {
        Err(GeometryError::Cancelled)
    } else {
        Ok(())
    }
}
