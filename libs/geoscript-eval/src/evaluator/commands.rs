//! Side-effecting commands that mutate the current scope. A command
//! always returns `Value::Void` to its caller;
//! `eval_call` enforces that uniformly.

use geoscript_kernel::{PathPoint, Rotation, Transform};
use geoscript_parser::ast::CallExpr;

use super::Evaluator;
use crate::error::EvalError;
use crate::value::{tuple_to_vector, Value};

pub fn is_command(name: &str) -> bool {
    matches!(
        name,
        "translate"
            | "rotate"
            | "scale"
            | "color"
            | "opacity"
            | "texture"
            | "background"
            | "name"
            | "position"
            | "orientation"
            | "size"
            | "detail"
            | "smoothing"
            | "font"
            | "print"
            | "assert"
            | "point"
            | "curve"
            | "polygon"
            | "seed"
    )
}

pub fn eval_command(ev: &mut Evaluator, call: &CallExpr) -> Result<(), EvalError> {
    match call.name.as_str() {
        "translate" => {
            let v = eval_vector(ev, call)?;
            let t = Transform::translation(v);
            let scope = ev.scopes.current_mut();
            scope.transform = scope.transform.then(&t);
        }
        "rotate" => {
            let r = eval_rotation(ev, call)?;
            let t = Transform::rotation(r);
            let scope = ev.scopes.current_mut();
            scope.transform = scope.transform.then(&t);
        }
        "scale" => {
            let v = eval_vector(ev, call)?;
            let t = Transform::scaling(v);
            let scope = ev.scopes.current_mut();
            scope.transform = scope.transform.then(&t);
        }
        "color" => {
            let c = eval_one(ev, call)?.as_color()?;
            ev.scopes.current_mut().material.color = c;
        }
        "opacity" => {
            let n = eval_one(ev, call)?.as_number()?;
            ev.scopes.current_mut().opacity = n;
        }
        "texture" => {
            let s = eval_one(ev, call)?.as_string()?.to_string();
            ev.scopes.current_mut().material.texture = Some(s);
        }
        "background" => {
            let v = eval_one(ev, call)?;
            let scope = ev.scopes.current_mut();
            match v.as_color() {
                Ok(c) => scope.background = Some(c),
                Err(_) => scope.material.texture = Some(v.as_string()?.to_string()),
            }
        }
        "name" => {
            let s = eval_one(ev, call)?.as_string()?.to_string();
            ev.scopes.current_mut().name = Some(s);
        }
        "position" => {
            let v = eval_vector(ev, call)?;
            ev.scopes.current_mut().position = Some(v);
        }
        "orientation" => {
            let r = eval_rotation(ev, call)?;
            ev.scopes.current_mut().orientation = Some(r);
        }
        "size" => {
            let v = eval_vector(ev, call)?;
            ev.scopes.current_mut().size = Some(v);
        }
        "detail" => {
            let n = eval_one(ev, call)?.as_number()?;
            ev.scopes.current_mut().detail = config::constants::clamp_detail(n.round().max(0.0) as u32);
        }
        "smoothing" => {
            let n = eval_one(ev, call)?.as_number()?;
            ev.scopes.current_mut().smoothing = n;
        }
        "font" => {
            let s = eval_one(ev, call)?.as_string()?.to_string();
            ev.scopes.current_mut().font = Some(s);
        }
        "print" => {
            let values = ev.eval_args(&call.args)?;
            let line = values.iter().map(Value::display).collect::<Vec<_>>().join(" ");
            ev.delegate.debug_log(&values);
            ev.log.push(line);
        }
        "assert" => {
            let ok = eval_one(ev, call)?.as_boolean();
            if !ok {
                return Err(EvalError::AssertionFailure(format!("{:?}", call.args)));
            }
        }
        "point" => {
            let v = eval_vector(ev, call)?;
            ev.scopes.current_mut().path_points.push(PathPoint::sharp(v));
        }
        "curve" => {
            let v = eval_vector(ev, call)?;
            ev.scopes.current_mut().path_points.push(PathPoint::curved(v));
        }
        "polygon" => {
            // `polygon x1 y1 z1  x2 y2 z2 ...`: the flat number
            // list is re-chunked into per-vertex triples.
            let values = ev.eval_args(&call.args)?;
            let loop_points = values
                .chunks(3)
                .map(tuple_to_vector)
                .collect::<Result<Vec<_>, _>>()?;
            ev.scopes.current_mut().children.push(Value::Polygon(loop_points));
        }
        "seed" => {
            let n = eval_one(ev, call)?.as_number()?;
            ev.scopes.current_mut().random = crate::rng::Rng::new(n as u64);
        }
        other => return Err(EvalError::UnknownSymbol(other.to_string())),
    }
    Ok(())
}

fn eval_one(ev: &mut Evaluator, call: &CallExpr) -> Result<Value, EvalError> {
    let values = ev.eval_args(&call.args)?;
    values
        .into_iter()
        .next()
        .ok_or_else(|| EvalError::MissingArgument(format!("'{}' requires an argument", call.name)))
}

fn eval_vector(ev: &mut Evaluator, call: &CallExpr) -> Result<geoscript_kernel::Vector, EvalError> {
    let values = ev.eval_args(&call.args)?;
    if values.is_empty() {
        return Err(EvalError::MissingArgument(format!("'{}' requires an argument", call.name)));
    }
    if values.len() == 1 {
        values[0].as_vector()
    } else {
        tuple_to_vector(&values)
    }
}

fn eval_rotation(ev: &mut Evaluator, call: &CallExpr) -> Result<Rotation, EvalError> {
    let values = ev.eval_args(&call.args)?;
    if values.is_empty() {
        return Err(EvalError::MissingArgument(format!("'{}' requires an argument", call.name)));
    }
    if values.len() == 1 {
        values[0].as_rotation()
    } else {
        let v = tuple_to_vector(&values)?;
        Ok(Rotation::from_euler_radians(v.x, v.y, v.z))
    }
}
