//! Math/logic/string builtins and named constants. Pure functions only — `rnd`/`seed` are stateful and handled
//! directly by the evaluator (see `evaluator::mod::eval_call`) since they
//! need to mutate the current scope's PRNG rather than just read arguments.

use std::f64::consts::PI;

use crate::error::EvalError;
use crate::value::Value;

/// A fixed, non-scope-dependent value an identifier resolves to without a
/// call: `pi`, `true`, `false`.
pub fn constant(name: &str) -> Option<Value> {
    Some(match name {
        "pi" => Value::Number(PI),
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => return None,
    })
}

/// Dispatches a pure builtin function call by name.
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "round" => unary_num(args, f64::round).map(Value::Number),
        "floor" => unary_num(args, f64::floor).map(Value::Number),
        "ceil" => unary_num(args, f64::ceil).map(Value::Number),
        "abs" => unary_num(args, f64::abs).map(Value::Number),
        "sqrt" => unary_num(args, f64::sqrt).map(Value::Number),
        "cos" => unary_num(args, f64::cos).map(Value::Number),
        "sin" => unary_num(args, f64::sin).map(Value::Number),
        "tan" => unary_num(args, f64::tan).map(Value::Number),
        "acos" => unary_num(args, f64::acos).map(Value::Number),
        "asin" => unary_num(args, f64::asin).map(Value::Number),
        "atan" => unary_num(args, f64::atan).map(Value::Number),
        "pow" => binary_num(args, f64::powf).map(Value::Number),
        "atan2" => binary_num(args, f64::atan2).map(Value::Number),
        "max" => variadic_num(args, f64::max).map(Value::Number),
        "min" => variadic_num(args, f64::min).map(Value::Number),
        "not" => Ok(Value::Boolean(!one(args)?.as_boolean())),
        "and" => Ok(Value::Boolean(args.iter().all(Value::as_boolean))),
        "or" => Ok(Value::Boolean(args.iter().any(Value::as_boolean))),
        "split" => split(args),
        "join" => join(args),
        "trim" => Ok(Value::String(one(args)?.as_string()?.trim().to_string())),
        other => Err(EvalError::UnknownSymbol(other.to_string())),
    }
}

fn one(args: &[Value]) -> Result<&Value, EvalError> {
    args.first().ok_or_else(|| EvalError::MissingArgument("expected at least one argument".to_string()))
}

fn unary_num(args: &[Value], f: impl Fn(f64) -> f64) -> Result<f64, EvalError> {
    Ok(f(one(args)?.as_number()?))
}

fn binary_num(args: &[Value], f: impl Fn(f64, f64) -> f64) -> Result<f64, EvalError> {
    let a = args.first().ok_or_else(|| EvalError::MissingArgument("expected two arguments".to_string()))?;
    let b = args.get(1).ok_or_else(|| EvalError::MissingArgument("expected two arguments".to_string()))?;
    Ok(f(a.as_number()?, b.as_number()?))
}

fn variadic_num(args: &[Value], f: impl Fn(f64, f64) -> f64) -> Result<f64, EvalError> {
    let mut nums = args.iter().map(Value::as_number);
    let first = nums.next().ok_or_else(|| EvalError::MissingArgument("expected at least one argument".to_string()))??;
    nums.try_fold(first, |acc, n| Ok(f(acc, n?)))
}

fn split(args: &[Value]) -> Result<Value, EvalError> {
    let s = one(args)?.as_string()?;
    let sep = match args.get(1) {
        Some(v) => v.as_string()?.to_string(),
        None => " ".to_string(),
    };
    Ok(Value::List(s.split(sep.as_str()).map(|part| Value::String(part.to_string())).collect()))
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    let items = one(args)?.clone().into_list();
    let sep = match args.get(1) {
        Some(v) => v.as_string()?.to_string(),
        None => String::new(),
    };
    let parts: Vec<String> = items.iter().map(Value::display).collect();
    Ok(Value::String(parts.join(&sep)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pi_constant_matches_std() {
        assert!(matches!(constant("pi"), Some(Value::Number(n)) if (n - std::f64::consts::PI).abs() < 1e-12));
    }

    #[test]
    fn max_min_variadic() {
        let args = vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)];
        assert!(matches!(call("max", &args), Ok(Value::Number(n)) if n == 3.0));
        assert!(matches!(call("min", &args), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn split_default_separator_is_whitespace() {
        let v = split(&[Value::String("a b c".to_string())]).unwrap();
        assert!(matches!(v, Value::List(items) if items.len() == 3));
    }

    #[test]
    fn join_round_trips_split() {
        let list = split(&[Value::String("a,b,c".to_string()), Value::String(",".to_string())]).unwrap();
        let joined = join(&[list, Value::String(",".to_string())]).unwrap();
        assert!(matches!(joined, Value::String(s) if s == "a,b,c"));
    }

    #[test]
    fn unknown_builtin_is_unknown_symbol() {
        assert!(matches!(call("not-a-builtin", &[]), Err(EvalError::UnknownSymbol(_))));
    }
}
