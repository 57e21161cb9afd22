//! Evaluator scope stack.

use std::collections::HashMap;

use geoscript_kernel::{Color, Material, PathPoint, Rotation, Transform, Vector};

use crate::rng::Rng;
use crate::value::Value;

/// How a name resolves in the static, built-in part of the symbol table.
/// The evaluator's dispatcher (`evaluator::blocks`/`commands`/`builtins`)
/// is the concrete implementation of each kind; this enum is the
/// classification a scope's symbol table exposes for a bare identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Side-effecting, returns void (`translate`, `print`, `assert`).
    Command,
    /// Pure, returns a value (`sin`, `sqrt`, `rnd`).
    Function,
    /// Bound to a field of the current scope (`color`, `detail`).
    Property,
    /// Child-accepting construct (`cube`, `union`, `path`).
    Block,
    /// A fixed value (`pi`, `true`, `false`).
    Constant,
    /// Declared but not yet bound — reserved names without an
    /// implementation in this build (`text`, `svgpath`, `font` glyph
    /// lookup), which degrade to a fallback value rather than failing
    /// evaluation.
    Placeholder,
}

/// One nested evaluation scope: carries the current `transform`,
/// `childTransform`, `material`, `opacity`, `detail`, `smoothing`, `font`,
/// `name`, `background` and `random` state, a symbol table, and whatever a
/// block body accumulates for its parent to consume.
#[derive(Debug, Clone)]
pub struct ScopeState {
    pub transform: Transform,
    pub child_transform: Transform,
    pub material: Material,
    pub opacity: f64,
    pub detail: u32,
    pub smoothing: f64,
    pub font: Option<String>,
    pub name: Option<String>,
    pub background: Option<Color>,
    pub random: Rng,
    /// `.mesh`/`.path`/`.point`/`.polygon` values produced by nested block
    /// calls, consumed by the enclosing block to build its result.
    pub children: Vec<Value>,
    /// Set by the `size`/`position`/`orientation` commands; not
    /// not one of a scope's core transform/material fields, but required to
    /// carry `cube { size 2 }`-style parameters from a block's body back to
    /// the block itself. Reset per child scope, like `children`.
    pub size: Option<Vector>,
    pub position: Option<Vector>,
    pub orientation: Option<Rotation>,
    /// Accumulates `point`/`curve` command output while a `path` block body
    /// runs.
    pub path_points: Vec<PathPoint>,
    symbols: HashMap<String, Value>,
}

impl ScopeState {
    pub fn root() -> Self {
        ScopeState {
            transform: Transform::IDENTITY,
            child_transform: Transform::IDENTITY,
            material: Material::default(),
            opacity: 1.0,
            detail: config::constants::DEFAULT_DETAIL,
            smoothing: 0.0,
            font: None,
            name: None,
            background: None,
            random: Rng::default(),
            children: Vec::new(),
            size: None,
            position: None,
            orientation: None,
            path_points: Vec::new(),
            symbols: HashMap::new(),
        }
    }

    /// A child scope inherits the ambient-default fields from its parent
    /// (material, opacity, detail, smoothing, font) but starts
    /// fresh on the fields that describe *this* block rather than an
    /// ancestor: `transform`/`child_transform` reset to identity since a
    /// nested block's own `translate`/`rotate`/`scale` commands accumulate
    /// into the `Geometry` node's own (parent-relative) transform field,
    /// which `Geometry::build` composes with the already-built, already
    /// world-positioned children — inheriting the parent's cumulative
    /// transform here would apply it twice. `children`/`size`/`position`/
    /// `orientation`/`path_points`/the user symbol table are likewise
    /// per-block, not ambient, so they also reset.
    pub fn child(&self) -> Self {
        ScopeState {
            transform: Transform::IDENTITY,
            child_transform: Transform::IDENTITY,
            children: Vec::new(),
            size: None,
            position: None,
            orientation: None,
            path_points: Vec::new(),
            symbols: HashMap::new(),
            ..self.clone()
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.symbols.get(name)
    }
}

/// The evaluator's scope stack: innermost last.
#[derive(Debug, Clone)]
pub struct Scopes {
    stack: Vec<ScopeState>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes { stack: vec![ScopeState::root()] }
    }

    pub fn push_child(&mut self) {
        let child = self.current().child();
        self.stack.push(child);
    }

    pub fn pop(&mut self) -> ScopeState {
        assert!(self.stack.len() > 1, "cannot pop the root scope");
        self.stack.pop().unwrap()
    }

    pub fn current(&self) -> &ScopeState {
        self.stack.last().expect("scope stack is never empty")
    }

    pub fn current_mut(&mut self) -> &mut ScopeState {
        self.stack.last_mut().expect("scope stack is never empty")
    }

    /// Looks a user-defined name up from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.stack.iter().rev().find_map(|s| s.get_local(name))
    }

    /// Appends `value` to the *parent* scope's `children` — called when a
    /// nested block finishes and should contribute its result to the
    /// scope it was called from, not the one it pushed for its own body.
    pub fn push_child_value(&mut self, value: Value) {
        self.current_mut().children.push(value);
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_inherits_detail() {
        let mut scopes = Scopes::new();
        scopes.current_mut().detail = 16;
        scopes.push_child();
        assert_eq!(scopes.current().detail, 16);
    }

    #[test]
    fn define_shadows_in_child_without_leaking_up() {
        let mut scopes = Scopes::new();
        scopes.current_mut().define("x", Value::Number(1.0));
        scopes.push_child();
        scopes.current_mut().define("x", Value::Number(2.0));
        assert!(matches!(scopes.get("x"), Some(Value::Number(n)) if *n == 2.0));
        scopes.pop();
        assert!(matches!(scopes.get("x"), Some(Value::Number(n)) if *n == 1.0));
    }

    #[test]
    fn children_accumulate_independently_per_scope() {
        let mut scopes = Scopes::new();
        scopes.push_child_value(Value::Number(1.0));
        scopes.push_child();
        assert!(scopes.current().children.is_empty());
    }
}
