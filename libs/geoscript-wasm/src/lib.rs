//! # geoscript-wasm
//!
//! Browser-safe WebAssembly bridge exposing the geoscript pipeline
//! (lexer → parser → eval → kernel → engine) through `wasm-bindgen`
//!.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { Document } from './geoscript_wasm';
//!
//! await init();
//! const doc = new Document();
//! try {
//!     const mesh = doc.compile("cube { size 2 }");
//!     console.log(mesh.vertex_count, mesh.triangle_count);
//! } catch (error) {
//!     for (const diag of error.diagnostics) console.error(diag.message);
//! }
//! ```

use wasm_bindgen::prelude::*;

pub mod delegate;
pub mod diagnostics;
pub mod mesh_handle;
pub mod persist;

pub use delegate::JsDelegate;
pub use diagnostics::Diagnostic;
pub use mesh_handle::MeshHandle;

use geoscript_diagnostics::NeverCancel;
use geoscript_eval::NullDelegate;
use geoscript_engine::{compile_once, CompileError};
use geoscript_kernel::Mesh;

/// Initializes the WASM module: panic hook for readable stack traces in
/// debug builds. Call once before anything else.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Merges a scene's top-level children into one render mesh (the implicit
/// top-level union a flat script describes) — the shape a single
/// `MeshHandle` can represent.
fn merge_scene(scene: &geoscript_engine::Scene) -> Mesh {
    scene.children.iter().fold(Mesh::empty(), |acc, g| match g.build(&|| false) {
        Ok(m) => acc.merge(&m),
        Err(_) => acc,
    })
}

/// One-shot compile: parse, evaluate, build every top-level node, and
/// return a single merged [`MeshHandle`]. No cancellation and no
/// cross-call cache — use [`Document`] for an editor/live-preview host
/// that recompiles the same source repeatedly.
#[wasm_bindgen]
pub fn render(source: &str) -> Result<MeshHandle, JsValue> {
    let scene = compile_once(source, &NeverCancel, &NullDelegate).map_err(to_js_error)?;
    Ok(MeshHandle::from_mesh(&merge_scene(&scene)))
}

fn to_js_error(err: CompileError) -> JsValue {
    match err {
        CompileError::Diagnostic(d) => diagnostics::build_error_payload(&d),
        // Cancellation never happens on this synchronous, never-cancelled
        // path, but keep the branch exhaustive and honest about the
        // sentinel.
        CompileError::Cancelled => JsValue::from_str("cancelled"),
    }
}

/// A long-lived document: keeps a [`geoscript_engine::compile::Document`]'s
/// cache alive across repeated `compile` calls on edited source — identical
/// subgraphs across edits compute once — and optionally a host-supplied
/// [`JsDelegate`] for `import`/`print`.
#[wasm_bindgen]
pub struct Document {
    inner: geoscript_engine::compile::Document,
    delegate: Option<JsDelegate>,
}

#[wasm_bindgen]
impl Document {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Document {
        Document { inner: geoscript_engine::compile::Document::new(), delegate: None }
    }

    /// Registers a host delegate for `import`/`print`. Replaces any
    /// previously set delegate.
    pub fn set_delegate(&mut self, delegate: JsDelegate) {
        self.delegate = Some(delegate);
    }

    pub fn compile(&self, source: &str) -> Result<MeshHandle, JsValue> {
        let scene = match &self.delegate {
            Some(d) => self.inner.compile(source, &NeverCancel, d),
            None => self.inner.compile(source, &NeverCancel, &NullDelegate),
        }
        .map_err(to_js_error)?;
        Ok(MeshHandle::from_mesh(&merge_scene(&scene)))
    }

    /// Number of distinct geometry subtrees cached so far, surfaced for a
    /// host's debug panel.
    pub fn cache_size(&self) -> usize {
        self.inner.cache().len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}
