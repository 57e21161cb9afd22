//! # geoscript-engine
//!
//! Document/build orchestration: `compile(source)`, the
//! content-addressed geometry cache, and the cooperative background
//! build scheduler. Everything below this crate (`geoscript-lexer`
//! through `geoscript-kernel`) is pure, synchronous, host-agnostic Rust;
//! this crate is where a host (the wasm bridge, a desktop shell, a test
//! harness) plugs a document's lifecycle in.

pub mod cache;
pub mod compile;
pub mod scheduler;

pub use cache::{CacheKey, GeometryCache};
pub use compile::{compile, compile_once, Document};
pub use scheduler::{BuildScheduler, BuildStatus};

pub use geoscript_diagnostics::{CancelToken, Diagnostic, NeverCancel, Severity, Span, Stage};
pub use geoscript_eval::{CompileError, Delegate, EvalError, Geometry, NullDelegate, Scene};
