//! Block dispatch: constructs that push a child scope,
//! evaluate a body, and fold the popped scope into either a `Geometry` or a
//! `Path` value. Solid/CSG blocks and path blocks share the push/eval/pop
//! shape but partition their popped children differently, so they get
//! separate builders below.

use geoscript_kernel::{Material, Mesh, Path, Polygon, Vector, Vertex};
use geoscript_parser::ast::CallExpr;

use super::Evaluator;
use crate::error::EvalError;
use crate::geometry::{Along, CameraParams, CsgOp, Geometry, GeometryKind, LightParams};
use crate::primitives::regular_polygon;
use crate::scope::ScopeState;
use crate::value::Value;

const GEOMETRY_BLOCKS: &[&str] = &[
    "group",
    "union",
    "difference",
    "intersection",
    "xor",
    "stencil",
    "cube",
    "sphere",
    "cylinder",
    "cone",
    "pyramid",
    "prism",
    "extrude",
    "lathe",
    "loft",
    "fill",
    "hull",
    "mesh",
    "camera",
    "light",
    "debug",
];

const PATH_BLOCKS: &[&str] = &["path", "circle", "square", "polygon", "roundrect", "text", "svgpath"];

pub fn is_block(name: &str) -> bool {
    GEOMETRY_BLOCKS.contains(&name) || PATH_BLOCKS.contains(&name)
}

pub fn eval_block(ev: &mut Evaluator, call: &CallExpr) -> Result<Value, EvalError> {
    if PATH_BLOCKS.contains(&call.name.as_str()) {
        eval_path_block(ev, call)
    } else {
        Ok(Value::Geometry(Box::new(eval_geometry_block(ev, call)?)))
    }
}

/// Pushes a child scope, evaluates the block body (if any), pops, and
/// surfaces any error raised mid-body only after the scope is off the
/// stack — leaving a scope pushed on an early return would corrupt every
/// sibling call after this one.
fn eval_body_scope(ev: &mut Evaluator, call: &CallExpr) -> Result<ScopeState, EvalError> {
    ev.scopes.push_child();
    let result = match &call.block {
        Some(body) => ev.eval_stmts(body),
        None => Ok(()),
    };
    let scope = ev.scopes.pop();
    result?;
    Ok(scope)
}

fn named_number(ev: &mut Evaluator, call: &CallExpr, name: &str) -> Result<Option<f64>, EvalError> {
    match ev.named_arg(&call.args, name)? {
        Some(v) => Ok(Some(v.as_number()?)),
        None => Ok(None),
    }
}

fn named_vector(ev: &mut Evaluator, call: &CallExpr, name: &str) -> Result<Option<Vector>, EvalError> {
    match ev.named_arg(&call.args, name)? {
        Some(v) => Ok(Some(v.as_vector()?)),
        None => Ok(None),
    }
}

fn named_color(
    ev: &mut Evaluator,
    call: &CallExpr,
    name: &str,
) -> Result<Option<geoscript_kernel::Color>, EvalError> {
    match ev.named_arg(&call.args, name)? {
        Some(v) => Ok(Some(v.as_color()?)),
        None => Ok(None),
    }
}

/// Children a block body contributed, split by what they're useful for:
/// fully-built sub-geometry, guide/profile paths, and flattened vertex
/// clouds (raw `polygon` loops, bare `point`s, or path control points —
/// whatever `hull`/`mesh` want to consume as plain vectors).
struct PoppedChildren {
    geometry: Vec<Geometry>,
    paths: Vec<Path>,
    polygon_loops: Vec<Vec<Vector>>,
    points: Vec<Vector>,
}

fn partition_children(scope: &mut ScopeState) -> PoppedChildren {
    let mut out = PoppedChildren {
        geometry: Vec::new(),
        paths: Vec::new(),
        polygon_loops: Vec::new(),
        points: Vec::new(),
    };
    for pt in &scope.path_points {
        out.points.push(pt.position);
    }
    for v in std::mem::take(&mut scope.children) {
        match v {
            Value::Geometry(g) => out.geometry.push(*g),
            Value::Path(p) => {
                out.points.extend(p.points.iter().map(|pt| pt.position));
                out.paths.push(p);
            }
            Value::Point(v) => out.points.push(v),
            Value::Polygon(loop_points) => {
                out.points.extend(loop_points.iter().copied());
                out.polygon_loops.push(loop_points);
            }
            _ => {}
        }
    }
    out
}

fn eval_geometry_block(ev: &mut Evaluator, call: &CallExpr) -> Result<Geometry, EvalError> {
    let sides = named_number(ev, call, "sides")?;
    let fov = named_number(ev, call, "fov")?;
    let width = named_number(ev, call, "width")?;
    let height = named_number(ev, call, "height")?;
    let spread = named_number(ev, call, "spread")?;
    let penumbra = named_number(ev, call, "penumbra")?;
    let along_arg = ev.named_arg(&call.args, "along")?;
    let color_arg = named_color(ev, call, "color")?;

    let mut scope = eval_body_scope(ev, call)?;
    let children = partition_children(&mut scope);

    let size = scope.size.unwrap_or(Vector::splat(1.0));
    let detail = scope.detail;
    let mut material = scope.material.clone();
    material.opacity = scope.opacity;

    let kind = match call.name.as_str() {
        "group" => GeometryKind::Group,
        "union" => GeometryKind::Csg(CsgOp::Union),
        "difference" => GeometryKind::Csg(CsgOp::Difference),
        "intersection" => GeometryKind::Csg(CsgOp::Intersection),
        "xor" => GeometryKind::Csg(CsgOp::Xor),
        "stencil" => GeometryKind::Csg(CsgOp::Stencil),
        "cube" => GeometryKind::Cube { size },
        "sphere" => GeometryKind::Sphere { size, detail },
        "cylinder" => GeometryKind::Cylinder { size, detail },
        "cone" => GeometryKind::Cone { size, detail },
        "pyramid" => {
            GeometryKind::Pyramid { sides: sides.map(|n| n.round().max(3.0) as u32).unwrap_or(4), size }
        }
        "prism" => GeometryKind::Prism { sides: sides.map(|n| n.round().max(3.0) as u32).unwrap_or(6), size },
        "extrude" => {
            let along = match along_arg {
                Some(Value::Path(p)) => Along::Guide(p),
                _ => Along::Axis(Vector::new(0.0, 0.0, size.z)),
            };
            GeometryKind::Extrude { paths: children.paths, along }
        }
        "lathe" => GeometryKind::Lathe { paths: children.paths, segments: detail.max(3) },
        "loft" => GeometryKind::Loft { paths: children.paths },
        "fill" => GeometryKind::Fill { paths: children.paths },
        "hull" => GeometryKind::Hull { points: children.points },
        "mesh" => {
            let polys: Vec<Polygon> = children
                .polygon_loops
                .iter()
                .flat_map(|pts| {
                    Polygon::build(pts.iter().map(|&p| Vertex::at(p)).collect(), Some(material.clone()))
                })
                .collect();
            GeometryKind::RawMesh(Mesh::new(polys))
        }
        "camera" => GeometryKind::Camera(CameraParams {
            position: scope.position,
            orientation: scope.orientation.map(|r| r.to_euler_radians()),
            size: scope.size,
            background: scope.background,
            fov,
            width,
            height,
        }),
        "light" => GeometryKind::Light(LightParams {
            position: scope.position,
            orientation: scope.orientation.map(|r| r.to_euler_radians()),
            color: color_arg.or(Some(material.color)),
            spread,
            penumbra,
        }),
        "debug" => GeometryKind::Debug,
        other => unreachable!("{other} is not a registered geometry block"),
    };

    Ok(Geometry::new(kind, scope.name.clone(), scope.transform, material, scope.smoothing, children.geometry, call.span))
}

fn eval_path_block(ev: &mut Evaluator, call: &CallExpr) -> Result<Value, EvalError> {
    let sides = named_number(ev, call, "sides")?;
    let radius_arg = named_number(ev, call, "radius")?;
    let size_arg = named_vector(ev, call, "size")?;

    let scope = eval_body_scope(ev, call)?;
    let size = scope.size.or(size_arg).unwrap_or(Vector::splat(1.0));
    let detail = scope.detail.max(3);

    let path = match call.name.as_str() {
        "path" => Path::new(scope.path_points).subdivide_curves(detail),
        "circle" => {
            let r = radius_arg.unwrap_or(size.x.max(size.y) * 0.5);
            regular_polygon(detail, r)
        }
        "polygon" => {
            let n = sides.map(|n| n.round().max(3.0) as u32).unwrap_or(detail);
            let r = radius_arg.unwrap_or(size.x.max(size.y) * 0.5);
            regular_polygon(n, r)
        }
        "square" => rectangle_path(size.x, size.y),
        "roundrect" => {
            let r = radius_arg.unwrap_or((size.x.min(size.y) * 0.1).max(0.0));
            rounded_rectangle_path(size.x, size.y, r, detail)
        }
        // Neither a font engine nor an SVG parser is part of this build
        //: both degrade to an empty path rather than failing.
        "text" | "svgpath" => Path::new(Vec::new()),
        other => unreachable!("{other} is not a registered path block"),
    };
    Ok(Value::Path(path))
}

fn rectangle_path(width: f64, height: f64) -> Path {
    use geoscript_kernel::PathPoint;
    let hw = width * 0.5;
    let hh = height * 0.5;
    let corners = [
        Vector::new(-hw, -hh, 0.0),
        Vector::new(hw, -hh, 0.0),
        Vector::new(hw, hh, 0.0),
        Vector::new(-hw, hh, 0.0),
        Vector::new(-hw, -hh, 0.0),
    ];
    Path::new(corners.into_iter().map(PathPoint::sharp).collect())
}

/// A rectangle with its four corners replaced by quarter-circle fillets of
/// `radius`, `segments_per_corner` points each (min 1, so `roundrect` never
/// degrades to a plain rectangle unless the caller asked for `radius 0`).
fn rounded_rectangle_path(width: f64, height: f64, radius: f64, detail: u32) -> Path {
    use geoscript_kernel::PathPoint;
    let r = radius.min(width.abs() * 0.5).min(height.abs() * 0.5).max(0.0);
    if r <= config::constants::EPSILON {
        return rectangle_path(width, height);
    }
    let hw = width * 0.5;
    let hh = height * 0.5;
    let segments = detail.max(1);
    let centers = [
        (Vector::new(hw - r, hh - r, 0.0), 0.0),
        (Vector::new(-hw + r, hh - r, 0.0), std::f64::consts::FRAC_PI_2),
        (Vector::new(-hw + r, -hh + r, 0.0), std::f64::consts::PI),
        (Vector::new(hw - r, -hh + r, 0.0), std::f64::consts::PI + std::f64::consts::FRAC_PI_2),
    ];
    let mut points = Vec::with_capacity(centers.len() * (segments as usize + 1));
    for &(center, start_angle) in &centers {
        for i in 0..=segments {
            let angle = start_angle + std::f64::consts::FRAC_PI_2 * (i as f64) / (segments as f64);
            let p = center + Vector::new(r * angle.cos(), r * angle.sin(), 0.0);
            points.push(PathPoint::curved(p));
        }
    }
    points.push(points[0]);
    Path::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_diagnostics::NeverCancel;
    use geoscript_lexer::Lexer;
    use geoscript_parser::Parser;

    use crate::evaluator::{Evaluator, NullDelegate};

    fn eval(src: &str) -> crate::geometry::Scene {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let stmts = Parser::new(tokens).parse_program().unwrap();
        let mut ev = Evaluator::new(&NeverCancel, &NullDelegate);
        ev.eval_program(&stmts).unwrap()
    }

    #[test]
    fn group_collects_multiple_children() {
        let scene = eval("group { cube; sphere }");
        assert_eq!(scene.children.len(), 1);
        assert_eq!(scene.children[0].children.len(), 2);
    }

    #[test]
    fn nested_translate_does_not_double_apply() {
        // The inner cube's own translation must land at (5, 0, 0) in world
        // space, not (10, 0, 0) — see `ScopeState::child`'s transform reset.
        let scene = eval("group { translate 5 0 0; cube { size 1 } }");
        let mesh = scene.children[0].build(&|| false).unwrap();
        let b = mesh.bounds();
        assert!((b.min.x - 4.5).abs() < 1e-6, "min.x was {}", b.min.x);
        assert!((b.max.x - 5.5).abs() < 1e-6, "max.x was {}", b.max.x);
    }

    #[test]
    fn circle_path_matches_detail_segment_count() {
        let scene = eval("path { }"); // smoke: path block with no points is legal
        let _ = scene;
        let circle = regular_polygon(4, 1.0);
        assert_eq!(circle.points.len(), 5);
        let edges = circle.edge_vertices(Vector::new(0.0, 0.0, 1.0));
        assert_eq!(edges.len(), 4);
        let texcoord_ys: Vec<f64> = edges
            .iter()
            .flat_map(|(a, b)| [a.texcoord.y, b.texcoord.y])
            .collect();
        let expected = [0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0];
        for (got, want) in texcoord_ys.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9, "{:?} vs {:?}", texcoord_ys, expected);
        }
    }

    #[test]
    fn hull_collects_points_from_point_commands() {
        let scene = eval("hull { point 0 0 0; point 1 0 0; point 0 1 0 }");
        let mesh = scene.children[0].build(&|| false).unwrap();
        assert!(!mesh.is_empty());
    }

    #[test]
    fn square_path_is_closed_rectangle() {
        let p = rectangle_path(2.0, 4.0);
        assert!(p.is_closed());
        assert_eq!(p.bounds().min, Vector::new(-1.0, -2.0, 0.0));
        assert_eq!(p.bounds().max, Vector::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn roundrect_with_zero_radius_matches_square() {
        let rounded = rounded_rectangle_path(2.0, 2.0, 0.0, 8);
        let square = rectangle_path(2.0, 2.0);
        assert_eq!(rounded.bounds(), square.bounds());
    }

    #[test]
    fn text_block_degrades_to_empty_path() {
        let scene = eval("extrude { text }");
        let mesh = scene.children[0].build(&|| false).unwrap();
        assert!(mesh.is_empty());
    }
}
