//! Watertightness checking and best-effort T-junction repair.

use std::collections::HashMap;

use config::constants::WATERTIGHT_EPSILON;

use crate::line_segment::LineSegment;
use crate::polygon::Polygon;
use crate::vector::Vector;
use crate::vertex::Vertex;

fn polygon_edges(poly: &Polygon) -> Vec<LineSegment> {
    let n = poly.vertices.len();
    (0..n)
        .map(|i| LineSegment::new(poly.vertices[i].position, poly.vertices[(i + 1) % n].position))
        .collect()
}

/// True when every undirected edge has even multiplicity — each edge is
/// shared by exactly two polygons, with no holes.
pub fn is_watertight(polys: &[Polygon]) -> bool {
    let mut counts: HashMap<LineSegment, u32> = HashMap::new();
    for poly in polys {
        for e in polygon_edges(poly) {
            *counts.entry(e).or_insert(0) += 1;
        }
    }
    counts.values().all(|&c| c % 2 == 0)
}

/// Distance from `p` to segment `(a, b)`, and the interpolation parameter
/// of its closest point, clamped to `[0, 1]`.
fn point_segment(p: Vector, a: Vector, b: Vector) -> (f64, f64) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-20 {
        return (p.distance(a), 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let closest = a.lerp(b, t);
    (p.distance(closest), t)
}

/// Inserts `point` into `poly`'s vertex loop wherever an existing edge
/// passes through it strictly between its endpoints; returns
/// `true` if a T-junction vertex was inserted.
fn try_insert_t_junction(poly: &mut Polygon, point: Vector) -> bool {
    let n = poly.vertices.len();
    for i in 0..n {
        let a = poly.vertices[i];
        let b = poly.vertices[(i + 1) % n];
        if point == a.position || point == b.position {
            continue;
        }
        let (dist, t) = point_segment(point, a.position, b.position);
        if dist <= WATERTIGHT_EPSILON && t > 0.0 && t < 1.0 {
            let interpolated: Vertex = a.lerp(b, t);
            let new_vertex = Vertex { position: point, ..interpolated };
            poly.vertices.insert(i + 1, new_vertex);
            return true;
        }
    }
    false
}

/// Best-effort watertight repair: for every odd-multiplicity
/// (hole) edge, looks for a polygon edge elsewhere in the mesh whose line
/// passes through one of the hole edge's endpoints and splices a vertex
/// in. Not guaranteed to fully close every hole — callers must re-check
/// [`is_watertight`] afterward to confirm the repair succeeded.
pub fn make_watertight(mut polys: Vec<Polygon>) -> Vec<Polygon> {
    let mut counts: HashMap<LineSegment, u32> = HashMap::new();
    for poly in &polys {
        for e in polygon_edges(poly) {
            *counts.entry(e).or_insert(0) += 1;
        }
    }
    let hole_points: Vec<Vector> = counts
        .iter()
        .filter(|(_, &c)| c % 2 != 0)
        .flat_map(|(seg, _)| [seg.start, seg.end])
        .collect();

    if hole_points.is_empty() {
        return polys;
    }

    for point in hole_points {
        for poly in &mut polys {
            try_insert_t_junction(poly, point);
        }
    }
    polys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Vertex;

    #[test]
    fn detects_open_edge() {
        let verts = vec![
            Vertex::at(Vector::new(0.0, 0.0, 0.0)),
            Vertex::at(Vector::new(1.0, 0.0, 0.0)),
            Vertex::at(Vector::new(0.0, 1.0, 0.0)),
        ];
        let poly = Polygon::build(verts, None).remove(0);
        assert!(!is_watertight(&[poly]));
    }

    #[test]
    fn inserts_t_junction_vertex() {
        // A long edge (0,0,0)-(2,0,0) on one polygon, split in two on the
        // abutting polygon via a vertex at (1,0,0) that doesn't appear on
        // the first polygon's edge yet.
        let long_edge_tri = Polygon::build(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)),
                Vertex::at(Vector::new(2.0, 0.0, 0.0)),
                Vertex::at(Vector::new(0.0, 2.0, 0.0)),
            ],
            None,
        )
        .remove(0);
        let split_tri_a = Polygon::build(
            vec![
                Vertex::at(Vector::new(0.0, 0.0, 0.0)),
                Vertex::at(Vector::new(1.0, 0.0, 0.1)),
                Vertex::at(Vector::new(0.0, 1.0, 0.1)),
            ],
            None,
        )
        .remove(0);
        let mut p = long_edge_tri.clone();
        assert!(try_insert_t_junction(&mut p, Vector::new(1.0, 0.0, 0.0)));
        assert_eq!(p.vertices.len(), 4);
        let _ = split_tri_a;
    }
}
