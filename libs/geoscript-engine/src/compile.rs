//! Synchronous one-shot compile step: parse + evaluate + build every
//! top-level node, populating the shared [`GeometryCache`] along the way.
//! This is the entry point a test harness or a non-`tokio` host (the wasm
//! bridge, a CLI) calls directly; [`crate::scheduler::BuildScheduler`]
//! wraps the same call for hosts that want cooperative background builds
//! with progress reporting.

use std::sync::Arc;

use geoscript_diagnostics::{CancelToken, Diagnostic, Span};
use geoscript_eval::{eval_source, CompileError, Delegate, EvalError, Scene};

use crate::cache::GeometryCache;

/// The outcome of [`compile`]: either a fully-built scene (every
/// top-level child's mesh has been computed, through the cache), or a
/// diagnostic. Cancellation surfaces as `Ok(None)`-shaped via the
/// `Result<_, CompileOutcome>`-free signature below would hide it, so we
/// keep the three-way split `geoscript-eval::CompileError` already
/// defines and add nothing new here.
pub fn compile(
    source: &str,
    cache: &GeometryCache,
    cancel: &dyn CancelToken,
    delegate: &dyn Delegate,
) -> Result<Scene, CompileError> {
    let scene = eval_source(source, cancel, delegate)?;
    let cancel_fn = || cancel.is_cancelled();
    for child in &scene.children {
        match cache.build(child, &cancel_fn) {
            Ok(_) => {}
            Err(EvalError::Cancelled) => return Err(CompileError::Cancelled),
            Err(other) => return Err(CompileError::Diagnostic(other.into_diagnostic(Span::point(0)))),
        }
    }
    Ok(scene)
}

/// Convenience for hosts that don't want to own a long-lived cache (tests,
/// one-shot CLI invocations): builds a fresh, empty [`GeometryCache`] for
/// this single compile.
pub fn compile_once(source: &str, cancel: &dyn CancelToken, delegate: &dyn Delegate) -> Result<Scene, CompileError> {
    compile(source, &GeometryCache::new(), cancel, delegate)
}

/// Converts a [`CompileError`] into the shared [`Diagnostic`] currency for
/// hosts that treat cancellation as "no diagnostic to show" rather than a
/// distinct branch.
pub fn into_diagnostic(err: CompileError) -> Option<Diagnostic> {
    match err {
        CompileError::Diagnostic(d) => Some(d),
        CompileError::Cancelled => None,
    }
}

/// An owned, shareable compile job, used by the wasm bridge to keep a
/// cache alive across repeated edits to the same document without
/// standing up a full `BuildScheduler`/tokio runtime.
#[derive(Clone)]
pub struct Document {
    cache: Arc<GeometryCache>,
}

impl Document {
    pub fn new() -> Self {
        Document { cache: Arc::new(GeometryCache::new()) }
    }

    pub fn compile(&self, source: &str, cancel: &dyn CancelToken, delegate: &dyn Delegate) -> Result<Scene, CompileError> {
        compile(source, &self.cache, cancel, delegate)
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_diagnostics::NeverCancel;
    use geoscript_eval::NullDelegate;

    #[test]
    fn compile_once_builds_top_level_meshes() {
        let scene = compile_once("cube { size 2 }", &NeverCancel, &NullDelegate).expect("compiles");
        assert_eq!(scene.children.len(), 1);
        let mesh = scene.children[0].build(&|| false).unwrap();
        assert_eq!(mesh.polygon_count(), 6);
    }

    #[test]
    fn document_reuses_cache_across_compiles() {
        let doc = Document::new();
        doc.compile("cube { size 2 }", &NeverCancel, &NullDelegate).expect("first compile");
        doc.compile("cube { size 2 }\ncube { size 2 }", &NeverCancel, &NullDelegate).expect("second compile");
        assert_eq!(doc.cache().len(), 1);
    }
}
