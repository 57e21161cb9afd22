//! Coplanar-polygon merging after CSG.
//!
//! Naive coplanar merging is conditional and occasionally hole-introducing.
//! This implementation takes the conservative reading instead: two polygons
//! only merge when they share the same `id`, lie on the same plane, share
//! exactly one full edge, and the merged loop is itself still convex (a
//! non-convex merge result is left unmerged rather than admitted, since
//! [`crate::polygon::Polygon`] never stores non-convex loops).

use config::constants::EPSILON;

use crate::plane::Plane;
use crate::polygon::Polygon;
use crate::tessellate::{is_convex_2d, plane_basis, project_to_plane};
use crate::vertex::Vertex;

fn planes_equal(a: &Plane, b: &Plane) -> bool {
    a.normal == b.normal && (a.w - b.w).abs() <= EPSILON
}

/// Splices two simple vertex loops that share exactly one edge (traversed
/// in opposite directions, as any two CCW-wound adjacent polygons do) into
/// their combined outer boundary.
fn splice_shared_edge(a: &[Vertex], b: &[Vertex]) -> Option<Vec<Vertex>> {
    let (na, nb) = (a.len(), b.len());
    for i in 0..na {
        let (p, q) = (a[i].position, a[(i + 1) % na].position);
        for j in 0..nb {
            let (q2, p2) = (b[j].position, b[(j + 1) % nb].position);
            if q2 == q && p2 == p {
                let mut rot_a: Vec<Vertex> = (0..na).map(|k| a[(i + 1 + k) % na]).collect();
                rot_a.pop(); // drop trailing copy of p
                let mut rot_b: Vec<Vertex> = (0..nb).map(|k| b[(j + 1 + k) % nb]).collect();
                rot_b.pop(); // drop trailing copy of q
                rot_a.extend(rot_b);
                return Some(rot_a);
            }
        }
    }
    None
}

fn is_convex_loop(vertices: &[Vertex], normal: crate::vector::Vector) -> bool {
    let (u, v) = plane_basis(normal);
    let positions: Vec<_> = vertices.iter().map(|vx| vx.position).collect();
    let projected = project_to_plane(&positions, positions[0], u, v);
    is_convex_2d(&projected)
}

/// Scans once for a mergeable pair; returns `true` (and mutates `polys`)
/// if it found and merged one.
fn try_merge_once(polys: &mut Vec<Polygon>) -> bool {
    let n = polys.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if polys[i].id != polys[j].id {
                continue;
            }
            if !planes_equal(&polys[i].plane, &polys[j].plane) {
                continue;
            }
            if let Some(merged_verts) = splice_shared_edge(&polys[i].vertices, &polys[j].vertices) {
                if merged_verts.len() < 3 || !is_convex_loop(&merged_verts, polys[i].plane.normal) {
                    continue;
                }
                let merged = Polygon::from_convex_loop(merged_verts, polys[i].plane, polys[i].material.clone(), polys[i].id);
                polys[i] = merged;
                polys.remove(j);
                return true;
            }
        }
    }
    false
}

/// Merges coplanar, same-`id`, edge-adjacent polygon fragments until no
/// further merge is possible.
pub fn detessellate(mut polys: Vec<Polygon>) -> Vec<Polygon> {
    let guard = polys.len() + 8;
    for _ in 0..guard {
        if !try_merge_once(&mut polys) {
            break;
        }
    }
    polys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    #[test]
    fn merges_two_triangles_into_square() {
        // Two right triangles sharing the diagonal, same id.
        let id = crate::polygon::next_polygon_id();
        let plane = Plane::new(Vector::Z, 0.0);
        let a = Polygon::from_convex_loop(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)).with_normal(Vector::Z),
                Vertex::at(Vector::new(1.0, 0.0, 0.0)).with_normal(Vector::Z),
                Vertex::at(Vector::new(1.0, 1.0, 0.0)).with_normal(Vector::Z),
            ],
            plane,
            None,
            id,
        );
        let b = Polygon::from_convex_loop(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)).with_normal(Vector::Z),
                Vertex::at(Vector::new(1.0, 1.0, 0.0)).with_normal(Vector::Z),
                Vertex::at(Vector::new(0.0, 1.0, 0.0)).with_normal(Vector::Z),
            ],
            plane,
            None,
            id,
        );
        let merged = detessellate(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].vertices.len(), 4);
    }

    #[test]
    fn different_ids_never_merge() {
        let plane = Plane::new(Vector::Z, 0.0);
        let a = Polygon::from_convex_loop(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)),
                Vertex::at(Vector::new(1.0, 0.0, 0.0)),
                Vertex::at(Vector::new(1.0, 1.0, 0.0)),
            ],
            plane,
            None,
            1,
        );
        let b = Polygon::from_convex_loop(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)),
                Vertex::at(Vector::new(1.0, 1.0, 0.0)),
                Vertex::at(Vector::new(0.0, 1.0, 0.0)),
            ],
            plane,
            None,
            2,
        );
        let result = detessellate(vec![a, b]);
        assert_eq!(result.len(), 2);
    }
}
