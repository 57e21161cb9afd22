//! AST-to-scene evaluator.

mod blocks;
mod builtins;
mod commands;

use config::constants::{STACK_GROWTH_BYTES, STACK_RED_ZONE_BYTES};
use geoscript_diagnostics::CancelToken;
use geoscript_parser::ast::{Arg, BinaryOp, CallExpr, Expr, Stmt, UnaryOp};
use stacker::maybe_grow;

use crate::error::EvalError;
use crate::geometry::{Geometry, Scene};
use crate::scope::Scopes;
use crate::value::Value;

/// Host-supplied hooks the evaluator calls out to. A no-op `Delegate` is
/// enough for tests and headless builds.
pub trait Delegate {
    fn resolve_url(&self, path: &str) -> Option<String> {
        let _ = path;
        None
    }
    fn import_geometry(&self, url: &str) -> Option<Value> {
        let _ = url;
        None
    }
    fn debug_log(&self, values: &[Value]) {
        let _ = values;
    }
}

/// A delegate that resolves nothing and logs nowhere — the default for
/// tests and any host that doesn't need imports or debug output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDelegate;
impl Delegate for NullDelegate {}

pub struct Evaluator<'a> {
    pub(crate) scopes: Scopes,
    pub(crate) cancel: &'a dyn CancelToken,
    pub(crate) delegate: &'a dyn Delegate,
    pub(crate) log: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(cancel: &'a dyn CancelToken, delegate: &'a dyn Delegate) -> Self {
        Evaluator { scopes: Scopes::new(), cancel, delegate, log: Vec::new() }
    }

    /// Evaluates a full program into a [`Scene`]. Uses
    /// `stacker::maybe_grow` since nested blocks and `if`/`for` bodies
    /// recurse through `eval_stmt`/`eval_expr` with no explicit depth cap
    /// beyond the kernel's own recursion guard.
    pub fn eval_program(&mut self, stmts: &[Stmt]) -> Result<Scene, EvalError> {
        maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROWTH_BYTES, || self.eval_program_inner(stmts))
    }

    fn eval_program_inner(&mut self, stmts: &[Stmt]) -> Result<Scene, EvalError> {
        self.eval_stmts(stmts)?;
        let background = self.scopes.current().background;
        let children = self.drain_geometry_children();
        Ok(Scene::new(background, children))
    }

    fn drain_geometry_children(&mut self) -> Vec<Geometry> {
        std::mem::take(&mut self.scopes.current_mut().children)
            .into_iter()
            .filter_map(|v| match v {
                Value::Geometry(g) => Some(*g),
                _ => None,
            })
            .collect()
    }

    fn checkpoint(&self) -> Result<(), EvalError> {
        if self.cancel.is_cancelled() {
            Err(EvalError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn eval_stmts(&mut self, stmts: &[Stmt]) -> Result<(), EvalError> {
        for stmt in stmts {
            self.checkpoint()?;
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<(), EvalError> {
        match stmt {
            Stmt::Define { name, value, .. } => {
                let v = self.eval_expr(value)?;
                self.scopes.current_mut().define(name.clone(), v);
                Ok(())
            }
            Stmt::For { name, range, body, .. } => self.eval_for(name, range, body),
            Stmt::If { condition, then_branch, else_branch, .. } => {
                if self.eval_expr(condition)?.as_boolean() {
                    self.eval_stmts(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_stmts(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::Import { path, .. } => self.eval_import(path),
            Stmt::Call(call) => {
                let v = self.eval_call(call)?;
                if !matches!(v, Value::Void) {
                    self.scopes.push_child_value(v);
                }
                Ok(())
            }
        }
    }

    fn eval_for(&mut self, name: &str, range: &Expr, body: &[Stmt]) -> Result<(), EvalError> {
        let (start, end, step) = self.eval_range(range)?;
        let mut i = start;
        while (step > 0.0 && i < end) || (step < 0.0 && i > end) {
            self.checkpoint()?;
            self.scopes.push_child();
            self.scopes.current_mut().define(name, Value::Number(i));
            let result = self.eval_stmts(body);
            let child = self.scopes.pop();
            for v in child.children {
                self.scopes.push_child_value(v);
            }
            result?;
            i += step;
        }
        Ok(())
    }

    /// Evaluates a `to`/`step` expression into `(start, end, step)`.
    fn eval_range(&mut self, expr: &Expr) -> Result<(f64, f64, f64), EvalError> {
        match expr {
            Expr::Binary { op: BinaryOp::Step, left, right, .. } => {
                let (start, end, _) = self.eval_range(left)?;
                let step = self.eval_expr(right)?.as_number()?;
                Ok((start, end, step))
            }
            Expr::Binary { op: BinaryOp::To, left, right, .. } => {
                let start = self.eval_expr(left)?.as_number()?;
                let end = self.eval_expr(right)?.as_number()?;
                Ok((start, end, 1.0))
            }
            other => {
                let start = self.eval_expr(other)?.as_number()?;
                Ok((start, start, 1.0))
            }
        }
    }

    fn eval_import(&mut self, path: &str) -> Result<(), EvalError> {
        let url = self.delegate.resolve_url(path).unwrap_or_else(|| path.to_string());
        match self.delegate.import_geometry(&url) {
            Some(v) => {
                self.scopes.push_child_value(v);
                Ok(())
            }
            None => Err(EvalError::FileNotFound(path.to_string())),
        }
    }

    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::StringLit(s, _) => Ok(Value::String(s.clone())),
            Expr::HexColor(s, _) => {
                crate::value::parse_color(s).map(Value::Color).ok_or_else(|| EvalError::InvalidColor(s.clone()))
            }
            Expr::Identifier(name, _) => self.eval_identifier(name),
            Expr::Unary { op, operand, .. } => {
                let v = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Negate => Ok(Value::Number(-v.as_number()?)),
                    UnaryOp::Not => Ok(Value::Boolean(!v.as_boolean())),
                }
            }
            Expr::Binary { op, left, right, .. } => self.eval_binary(*op, left, right),
            Expr::Call(call) => self.eval_call(call),
        }
    }

    fn eval_identifier(&mut self, name: &str) -> Result<Value, EvalError> {
        if let Some(v) = self.scopes.get(name) {
            return Ok(v.clone());
        }
        if let Some(v) = builtins::constant(name) {
            return Ok(v);
        }
        Err(EvalError::UnknownSymbol(name.to_string()))
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, EvalError> {
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = self.eval_expr(left)?.as_boolean();
            return Ok(Value::Boolean(match op {
                BinaryOp::And => l && self.eval_expr(right)?.as_boolean(),
                BinaryOp::Or => l || self.eval_expr(right)?.as_boolean(),
                _ => unreachable!(),
            }));
        }
        if op == BinaryOp::To {
            let start = self.eval_expr(left)?.as_number()?;
            let end = self.eval_expr(right)?.as_number()?;
            return Ok(Value::Tuple(vec![Value::Number(start), Value::Number(end), Value::Number(1.0)]));
        }
        if op == BinaryOp::Step {
            let range = self.eval_expr(left)?;
            let step = self.eval_expr(right)?.as_number()?;
            return match range {
                Value::Tuple(items) if items.len() == 3 => {
                    Ok(Value::Tuple(vec![items[0].clone(), items[1].clone(), Value::Number(step)]))
                }
                other => Err(EvalError::TypeMismatch { expected: "range", found: other.type_name() }),
            };
        }

        let l = self.eval_expr(left)?;
        let r = self.eval_expr(right)?;
        match op {
            BinaryOp::Add if matches!((&l, &r), (Value::String(_), Value::String(_))) => {
                Ok(Value::String(format!("{}{}", l.as_string()?, r.as_string()?)))
            }
            BinaryOp::Add => numeric_or_vector(&l, &r, |a, b| a + b, |a, b| a + b),
            BinaryOp::Subtract => numeric_or_vector(&l, &r, |a, b| a - b, |a, b| a - b),
            BinaryOp::Multiply => numeric_or_vector(&l, &r, |a, b| a * b, |a, b| a * b),
            BinaryOp::Divide => numeric_or_vector(&l, &r, |a, b| a / b, |a, b| a / b),
            BinaryOp::Lt => Ok(Value::Boolean(l.as_number()? < r.as_number()?)),
            BinaryOp::Gt => Ok(Value::Boolean(l.as_number()? > r.as_number()?)),
            BinaryOp::LtEq => Ok(Value::Boolean(l.as_number()? <= r.as_number()?)),
            BinaryOp::GtEq => Ok(Value::Boolean(l.as_number()? >= r.as_number()?)),
            BinaryOp::Eq => Ok(Value::Boolean(values_equal(&l, &r))),
            BinaryOp::NotEq => Ok(Value::Boolean(!values_equal(&l, &r))),
            BinaryOp::And | BinaryOp::Or | BinaryOp::To | BinaryOp::Step => unreachable!(),
        }
    }

    /// Dispatches a call to a block, command, or function/constant
    ///. Blocks push a child scope and return a
    /// value; commands mutate the current scope and return `Value::Void`;
    /// functions/constants are pure.
    pub(crate) fn eval_call(&mut self, call: &CallExpr) -> Result<Value, EvalError> {
        // `rnd` is a pure-looking function but mutates the current scope's
        // PRNG, so it can't be dispatched through `builtins::call`, which
        // only ever sees already-evaluated argument values.
        if call.name == "rnd" {
            return Ok(Value::Number(self.scopes.current_mut().random.next_f64()));
        }
        // `polygon` is ambiguous at the syntax level: with only positional
        // number arguments it's the vertex-loop command; with a
        // named `sides`/`radius` argument or a body it's the regular-polygon
        // path block.
        if call.name == "polygon" && call.block.is_none() && call.args.iter().all(|a| a.name.is_none()) {
            commands::eval_command(self, call)?;
            return Ok(Value::Void);
        }
        if blocks::is_block(&call.name) {
            return blocks::eval_block(self, call);
        }
        if commands::is_command(&call.name) {
            commands::eval_command(self, call)?;
            return Ok(Value::Void);
        }
        let args = self.eval_args(&call.args)?;
        builtins::call(&call.name, &args)
    }

    pub(crate) fn eval_args(&mut self, args: &[Arg]) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|a| self.eval_expr(&a.value)).collect()
    }

    pub(crate) fn eval_positional_numbers(&mut self, args: &[Arg]) -> Result<Vec<f64>, EvalError> {
        self.eval_args(args)?.iter().map(Value::as_number).collect()
    }

    pub(crate) fn named_arg(&mut self, args: &[Arg], name: &str) -> Result<Option<Value>, EvalError> {
        for a in args {
            if a.name.as_deref() == Some(name) {
                return Ok(Some(self.eval_expr(&a.value)?));
            }
        }
        Ok(None)
    }
}

fn numeric_or_vector(
    l: &Value,
    r: &Value,
    num: impl Fn(f64, f64) -> f64,
    vec: impl Fn(geoscript_kernel::Vector, geoscript_kernel::Vector) -> geoscript_kernel::Vector,
) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(num(*a, *b))),
        _ if matches!(l, Value::Vector(_) | Value::Size(_) | Value::Point(_))
            || matches!(r, Value::Vector(_) | Value::Size(_) | Value::Point(_)) =>
        {
            Ok(Value::Vector(vec(l.as_vector()?, r.as_vector()?)))
        }
        _ => Err(EvalError::TypeMismatch { expected: "number or vector", found: l.type_name() }),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => (a - b).abs() <= config::constants::EPSILON,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Vector(a), Value::Vector(b)) | (Value::Point(a), Value::Point(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_diagnostics::NeverCancel;
    use geoscript_lexer::Lexer;
    use geoscript_parser::Parser;

    fn eval(src: &str) -> Scene {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let stmts = Parser::new(tokens).parse_program().unwrap();
        let mut ev = Evaluator::new(&NeverCancel, &NullDelegate);
        ev.eval_program(&stmts).unwrap()
    }

    #[test]
    fn cube_seed_test() {
        let scene = eval("cube { size 2 }");
        assert_eq!(scene.children.len(), 1);
        let mesh = scene.children[0].build(&|| false).unwrap();
        assert_eq!(mesh.polygon_count(), 6);
        assert!(mesh.is_watertight());
        assert!(mesh.is_convex());
    }

    #[test]
    fn for_loop_prints_even_numbers() {
        let tokens = Lexer::new("for i in 0 to 5 step 2 { print i }").tokenize().unwrap();
        let stmts = Parser::new(tokens).parse_program().unwrap();
        let mut ev = Evaluator::new(&NeverCancel, &NullDelegate);
        ev.eval_program(&stmts).unwrap();
        assert_eq!(ev.log, vec!["0", "2", "4"]);
    }

    #[test]
    fn difference_of_cube_and_sphere() {
        let scene = eval("difference { cube { size 2 }; sphere { size 1.2 } }");
        let mesh = scene.children[0].build(&|| false).unwrap().make_watertight();
        assert!(mesh.is_watertight());
        assert!(!mesh.contains_point(geoscript_kernel::Vector::ZERO));
        assert!(mesh.contains_point(geoscript_kernel::Vector::new(0.95, 0.0, 0.0)));
    }
}
