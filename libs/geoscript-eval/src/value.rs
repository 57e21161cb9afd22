//! Runtime value domain: a tagged union with explicit,
//! documented implicit conversions rather than a dynamically extensible
//! object system.

use geoscript_kernel::{Color, Path, Rotation, Vector};

use crate::error::EvalError;
use crate::geometry::Geometry;

/// A runtime value. `Size` and `Point` share `Vector`'s representation but
/// keep a distinct tag so commands that only accept one (`size`, `point`)
/// can reject the other at the type-check boundary.
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    Boolean(bool),
    Number(f64),
    String(String),
    Color(Color),
    Vector(Vector),
    Size(Vector),
    Rotation(Rotation),
    Texture(String),
    Font(String),
    Path(Path),
    Point(Vector),
    /// A raw, as-yet-unplaned vertex loop built by a `polygon` command
    /// inside a `path`/`mesh` block body.
    Polygon(Vec<Vector>),
    Geometry(Box<Geometry>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Color(_) => "color",
            Value::Vector(_) => "vector",
            Value::Size(_) => "size",
            Value::Rotation(_) => "rotation",
            Value::Texture(_) => "texture",
            Value::Font(_) => "font",
            Value::Path(_) => "path",
            Value::Point(_) => "point",
            Value::Polygon(_) => "polygon",
            Value::Geometry(_) => "mesh",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
        }
    }

    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(EvalError::TypeMismatch { expected: "number", found: other.type_name() }),
        }
    }

    pub fn as_boolean(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) | Value::Tuple(l) => !l.is_empty(),
            _ => true,
        }
    }

    pub fn as_string(&self) -> Result<&str, EvalError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(EvalError::TypeMismatch { expected: "string", found: other.type_name() }),
        }
    }

    /// Number → vector broadcast: a bare
    /// scalar fills all three components.
    pub fn as_vector(&self) -> Result<Vector, EvalError> {
        match self {
            Value::Vector(v) | Value::Size(v) | Value::Point(v) => Ok(*v),
            Value::Number(n) => Ok(Vector::splat(*n)),
            Value::Tuple(items) | Value::List(items) => tuple_to_vector(items),
            other => Err(EvalError::TypeMismatch { expected: "vector", found: other.type_name() }),
        }
    }

    /// `vector → size`: identical representation, different
    /// tag, so this conversion can never fail once `as_vector` succeeds.
    pub fn as_size(&self) -> Result<Vector, EvalError> {
        self.as_vector()
    }

    pub fn as_rotation(&self) -> Result<Rotation, EvalError> {
        match self {
            Value::Rotation(r) => Ok(*r),
            Value::Vector(v) => Ok(Rotation::from_euler_radians(v.x, v.y, v.z)),
            Value::Tuple(items) | Value::List(items) => {
                let v = tuple_to_vector(items)?;
                Ok(Rotation::from_euler_radians(v.x, v.y, v.z))
            }
            other => Err(EvalError::TypeMismatch { expected: "rotation", found: other.type_name() }),
        }
    }

    pub fn as_color(&self) -> Result<Color, EvalError> {
        match self {
            Value::Color(c) => Ok(*c),
            Value::String(s) => parse_color(s).ok_or_else(|| EvalError::InvalidColor(s.clone())),
            other => Err(EvalError::TypeMismatch { expected: "color", found: other.type_name() }),
        }
    }

    pub fn as_path(&self) -> Result<&Path, EvalError> {
        match self {
            Value::Path(p) => Ok(p),
            other => Err(EvalError::TypeMismatch { expected: "path", found: other.type_name() }),
        }
    }

    pub fn as_geometry(&self) -> Result<&Geometry, EvalError> {
        match self {
            Value::Geometry(g) => Ok(g),
            other => Err(EvalError::TypeMismatch { expected: "mesh", found: other.type_name() }),
        }
    }

    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) | Value::Tuple(items) => items,
            other => vec![other],
        }
    }

    /// Renders a value for `print`/`debugLog`. Numbers print
    /// without a trailing `.0` for whole values so `print i` inside a
    /// `for i in 0 to 5 step 2` loop prints `0`, `2`, `4`.
    pub fn display(&self) -> String {
        match self {
            Value::Void => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::String(s) => s.clone(),
            Value::Vector(v) | Value::Size(v) | Value::Point(v) => {
                format!("({}, {}, {})", v.x, v.y, v.z)
            }
            Value::Color(c) => format!("#{:?}", c.to_array()),
            Value::List(items) | Value::Tuple(items) => {
                items.iter().map(Value::display).collect::<Vec<_>>().join(", ")
            }
            other => other.type_name().to_string(),
        }
    }
}

pub(crate) fn tuple_to_vector(items: &[Value]) -> Result<Vector, EvalError> {
    let nums: Result<Vec<f64>, EvalError> = items.iter().map(Value::as_number).collect();
    let nums = nums?;
    match nums.len() {
        1 => Ok(Vector::splat(nums[0])),
        2 => Ok(Vector::new(nums[0], nums[1], 0.0)),
        3 => Ok(Vector::new(nums[0], nums[1], nums[2])),
        n => Err(EvalError::InvalidVectorArity(n)),
    }
}

/// Parses a hex color literal (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`) or a
/// named color.
pub fn parse_color(text: &str) -> Option<Color> {
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    named_color(text)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let expand = |c: char| -> Option<u8> {
        let s: String = [c, c].iter().collect();
        u8::from_str_radix(&s, 16).ok()
    };
    let channel = |s: &str| -> Option<f32> { u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0) };

    match hex.len() {
        3 => {
            let chars: Vec<char> = hex.chars().collect();
            let r = expand(chars[0])? as f32 / 255.0;
            let g = expand(chars[1])? as f32 / 255.0;
            let b = expand(chars[2])? as f32 / 255.0;
            Some(Color::new(r, g, b, 1.0))
        }
        4 => {
            let chars: Vec<char> = hex.chars().collect();
            let r = expand(chars[0])? as f32 / 255.0;
            let g = expand(chars[1])? as f32 / 255.0;
            let b = expand(chars[2])? as f32 / 255.0;
            let a = expand(chars[3])? as f32 / 255.0;
            Some(Color::new(r, g, b, a))
        }
        6 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            Some(Color::new(r, g, b, 1.0))
        }
        8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = channel(&hex[6..8])?;
            Some(Color::new(r, g, b, a))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    Some(match name {
        "white" => Color::new(1.0, 1.0, 1.0, 1.0),
        "black" => Color::new(0.0, 0.0, 0.0, 1.0),
        "gray" | "grey" => Color::new(0.5, 0.5, 0.5, 1.0),
        "red" => Color::new(1.0, 0.0, 0.0, 1.0),
        "green" => Color::new(0.0, 1.0, 0.0, 1.0),
        "blue" => Color::new(0.0, 0.0, 1.0, 1.0),
        "yellow" => Color::new(1.0, 1.0, 0.0, 1.0),
        "cyan" => Color::new(0.0, 1.0, 1.0, 1.0),
        "magenta" => Color::new(1.0, 0.0, 1.0, 1.0),
        "orange" => Color::new(1.0, 0.647, 0.0, 1.0),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_broadcasts_to_vector() {
        let v = Value::Number(2.0).as_vector().unwrap();
        assert_eq!(v, Vector::splat(2.0));
    }

    #[test]
    fn hex_shorthand_and_full_agree() {
        let short = parse_color("#f00").unwrap();
        let long = parse_color("#ff0000").unwrap();
        assert_eq!(short.to_array(), long.to_array());
    }

    #[test]
    fn named_color_resolves() {
        assert_eq!(parse_color("red").unwrap().to_array(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_named_color_is_none() {
        assert!(parse_color("not-a-color").is_none());
    }

    #[test]
    fn tuple_of_three_becomes_vector() {
        let t = Value::Tuple(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]);
        assert_eq!(t.as_vector().unwrap(), Vector::new(1.0, 2.0, 3.0));
    }
}
