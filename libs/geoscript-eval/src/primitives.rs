//! Solid primitive builders (`cone`, `cylinder`, `sphere`, `cube`,
//! `pyramid`, `prism`), expressed in terms of the geometry kernel's
//! `lathe`/`extrude` builders plus a few hand-built face lists, the way the
//! builder modules themselves build meshes from paths.

use std::f64::consts::PI;

use geoscript_kernel::builders::{self, Along};
use geoscript_kernel::{Mesh, Path, PathPoint, Polygon, Vector, Vertex};

const NO_CANCEL: geoscript_kernel::Cancel = &|| false;

pub fn cube(size: Vector) -> Mesh {
    let h = size * 0.5;
    let faces: [[Vector; 4]; 6] = [
        [
            Vector::new(-h.x, -h.y, -h.z),
            Vector::new(-h.x, h.y, -h.z),
            Vector::new(-h.x, h.y, h.z),
            Vector::new(-h.x, -h.y, h.z),
        ],
        [
            Vector::new(h.x, -h.y, -h.z),
            Vector::new(h.x, -h.y, h.z),
            Vector::new(h.x, h.y, h.z),
            Vector::new(h.x, h.y, -h.z),
        ],
        [
            Vector::new(-h.x, -h.y, -h.z),
            Vector::new(h.x, -h.y, -h.z),
            Vector::new(h.x, -h.y, h.z),
            Vector::new(-h.x, -h.y, h.z),
        ],
        [
            Vector::new(-h.x, h.y, -h.z),
            Vector::new(-h.x, h.y, h.z),
            Vector::new(h.x, h.y, h.z),
            Vector::new(h.x, h.y, -h.z),
        ],
        [
            Vector::new(-h.x, -h.y, -h.z),
            Vector::new(-h.x, h.y, -h.z),
            Vector::new(h.x, h.y, -h.z),
            Vector::new(h.x, -h.y, -h.z),
        ],
        [
            Vector::new(-h.x, -h.y, h.z),
            Vector::new(h.x, -h.y, h.z),
            Vector::new(h.x, h.y, h.z),
            Vector::new(-h.x, h.y, h.z),
        ],
    ];
    let polys: Vec<Polygon> = faces
        .into_iter()
        .flat_map(|face| Polygon::build(face.into_iter().map(Vertex::at).collect(), None))
        .collect();
    Mesh::with_known_convexity(polys, Some(true))
}

/// `sphere(size, detail)`: lathes a half-circle profile (pole-to-pole)
/// around Y. `size` broadcasts a uniform diameter; non-uniform sizes scale
/// the unit sphere per axis in the caller's transform, not here.
pub fn sphere(size: Vector, detail: u32) -> Mesh {
    let r = size.x.max(size.y).max(size.z) * 0.5;
    let detail = detail.max(2);
    let mut points = Vec::with_capacity(detail as usize + 1);
    for i in 0..=detail {
        let t = -std::f64::consts::FRAC_PI_2 + PI * (i as f64) / (detail as f64);
        points.push(PathPoint::curved(Vector::new(-r * t.cos(), r * t.sin(), 0.0)));
    }
    let profile = Path::new(points);
    builders::lathe(&[profile], detail.max(3))
}

/// `cylinder(size, detail)`: revolves a rectangular profile, which
/// collapses to disk caps at both poles for free.
pub fn cylinder(size: Vector, detail: u32) -> Mesh {
    let r = size.x.max(size.z) * 0.5;
    let half_h = size.y * 0.5;
    let profile = Path::new(vec![
        PathPoint::sharp(Vector::new(0.0, -half_h, 0.0)),
        PathPoint::sharp(Vector::new(-r, -half_h, 0.0)),
        PathPoint::sharp(Vector::new(-r, half_h, 0.0)),
        PathPoint::sharp(Vector::new(0.0, half_h, 0.0)),
    ]);
    builders::lathe(&[profile], detail.max(3))
}

/// `cone(size, detail)`: revolves a triangular profile — base disk
/// collapsing directly to an apex pole.
pub fn cone(size: Vector, detail: u32) -> Mesh {
    let r = size.x.max(size.z) * 0.5;
    let half_h = size.y * 0.5;
    let profile = Path::new(vec![
        PathPoint::sharp(Vector::new(0.0, -half_h, 0.0)),
        PathPoint::sharp(Vector::new(-r, -half_h, 0.0)),
        PathPoint::sharp(Vector::new(0.0, half_h, 0.0)),
    ]);
    builders::lathe(&[profile], detail.max(3))
}

pub(crate) fn regular_polygon(sides: u32, radius: f64) -> Path {
    let sides = sides.max(3);
    let mut points = Vec::with_capacity(sides as usize + 1);
    for i in 0..sides {
        let angle = std::f64::consts::TAU * i as f64 / sides as f64;
        points.push(PathPoint::sharp(Vector::new(radius * angle.cos(), radius * angle.sin(), 0.0)));
    }
    points.push(points[0]);
    Path::new(points)
}

/// `prism(sides, size)`: an N-gon extruded along Z.
pub fn prism(sides: u32, size: Vector) -> Mesh {
    let base = regular_polygon(sides, size.x.max(size.y) * 0.5);
    builders::extrude(&[base], &Along::Axis(Vector::new(0.0, 0.0, size.z)), NO_CANCEL)
        .unwrap_or_else(|_| Mesh::empty())
}

/// `pyramid(sides, size)`: apex directly above an N-gon base, built
/// face-by-face since it isn't a ruled sweep of one cross-section.
pub fn pyramid(sides: u32, size: Vector) -> Mesh {
    let sides = sides.max(3);
    let r = size.x.max(size.y) * 0.5;
    let half_h = size.z * 0.5;
    let apex = Vector::new(0.0, 0.0, half_h);
    let base: Vec<Vector> = (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            Vector::new(r * angle.cos(), r * angle.sin(), -half_h)
        })
        .collect();

    let mut polys = Vec::new();
    for i in 0..sides as usize {
        let a = base[i];
        let b = base[(i + 1) % sides as usize];
        polys.extend(Polygon::build(vec![Vertex::at(a), Vertex::at(b), Vertex::at(apex)], None));
    }
    let mut base_loop: Vec<Vertex> = base.iter().map(|&p| Vertex::at(p)).collect();
    base_loop.reverse();
    polys.extend(Polygon::build(base_loop, None));

    Mesh::new(polys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_expected_bounds() {
        let m = cube(Vector::splat(2.0));
        assert_eq!(m.bounds().min, Vector::new(-1.0, -1.0, -1.0));
        assert_eq!(m.bounds().max, Vector::new(1.0, 1.0, 1.0));
        assert_eq!(m.polygon_count(), 6);
        assert!(m.is_watertight());
    }

    #[test]
    fn sphere_is_watertight_and_roughly_spherical() {
        let m = sphere(Vector::splat(2.0), 12);
        assert!(m.is_watertight());
        let b = m.bounds();
        assert!((b.max.x - 1.0).abs() < 0.05);
    }

    #[test]
    fn cylinder_is_watertight() {
        let m = cylinder(Vector::new(2.0, 3.0, 2.0), 16);
        assert!(m.is_watertight());
    }

    #[test]
    fn cone_is_watertight() {
        let m = cone(Vector::new(2.0, 3.0, 2.0), 16);
        assert!(m.is_watertight());
    }

    #[test]
    fn prism_is_watertight() {
        let m = prism(6, Vector::new(2.0, 2.0, 3.0));
        assert!(m.is_watertight());
    }

    #[test]
    fn pyramid_is_watertight() {
        let m = pyramid(4, Vector::new(2.0, 2.0, 2.0));
        assert!(m.is_watertight());
    }
}
