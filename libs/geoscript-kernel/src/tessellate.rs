//! Ear-clipping tessellation, shared by [`crate::polygon::Polygon`]
//! construction (admitting only convex polygons) and
//! [`crate::path::Path::face_vertices`].

use config::constants::EPSILON;

use crate::vector::Vector;

/// Builds an orthonormal in-plane basis `(u, v)` for `normal`, used to
/// project 3D polygon vertices into 2D for ear-clipping.
pub fn plane_basis(normal: Vector) -> (Vector, Vector) {
    let n = normal.normalized();
    let helper = if n.x.abs() < 0.9 { Vector::X } else { Vector::Y };
    let u = helper.cross(n).normalized();
    let v = n.cross(u);
    (u, v)
}

pub fn project_to_plane(points: &[Vector], origin: Vector, u: Vector, v: Vector) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&p| {
            let d = p - origin;
            (d.dot(u), d.dot(v))
        })
        .collect()
}

fn signed_area(poly: &[(f64, f64)]) -> f64 {
    let n = poly.len();
    let mut area = 0.0;
    for i in 0..n {
        let (x0, y0) = poly[i];
        let (x1, y1) = poly[(i + 1) % n];
        area += x0 * y1 - x1 * y0;
    }
    area * 0.5
}

fn is_convex_corner(a: (f64, f64), b: (f64, f64), c: (f64, f64), ccw: bool) -> bool {
    let cross = (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0);
    if ccw {
        cross >= -EPSILON
    } else {
        cross <= EPSILON
    }
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = cross2(p, a, b);
    let d2 = cross2(p, b, c);
    let d3 = cross2(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn cross2(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Ear-clipping triangulation of a simple (non-self-intersecting) polygon
/// given in 2D. Returns index triples into `points`, wound the same way as
/// the input. Returns an empty list for degenerate (&lt;3 vertex) input.
pub fn ear_clip(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let ccw = signed_area(points) >= 0.0;
    let mut indices: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    let mut guard = 0usize;
    while indices.len() > 3 && guard < n * n + 8 {
        guard += 1;
        let m = indices.len();
        let mut clipped = false;
        for i in 0..m {
            let ia = indices[(i + m - 1) % m];
            let ib = indices[i];
            let ic = indices[(i + 1) % m];
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            if !is_convex_corner(a, b, c, ccw) {
                continue;
            }
            let mut ear = true;
            for &ij in &indices {
                if ij == ia || ij == ib || ij == ic {
                    continue;
                }
                if point_in_triangle(points[ij], a, b, c) {
                    ear = false;
                    break;
                }
            }
            if ear {
                triangles.push([ia, ib, ic]);
                indices.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            // Numerically degenerate remainder: fan-triangulate rather than loop forever.
            break;
        }
    }
    if indices.len() == 3 {
        triangles.push([indices[0], indices[1], indices[2]]);
    } else if indices.len() > 3 {
        for w in 1..indices.len() - 1 {
            triangles.push([indices[0], indices[w], indices[w + 1]]);
        }
    }
    triangles
}

/// Whether a simple 2D polygon (given in winding order) is convex.
pub fn is_convex_2d(points: &[(f64, f64)]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let ccw = signed_area(points) >= 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        if !is_convex_corner(a, b, c, ccw) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_is_one_ear() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
        assert_eq!(ear_clip(&pts), vec![[0, 1, 2]]);
    }

    #[test]
    fn square_gives_two_triangles() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert_eq!(ear_clip(&pts).len(), 2);
    }

    #[test]
    fn concave_l_shape_tessellates() {
        let pts = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ];
        let tris = ear_clip(&pts);
        assert_eq!(tris.len(), pts.len() - 2);
    }

    #[test]
    fn square_is_convex() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert!(is_convex_2d(&pts));
    }

    #[test]
    fn l_shape_is_not_convex() {
        let pts = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ];
        assert!(!is_convex_2d(&pts));
    }
}
