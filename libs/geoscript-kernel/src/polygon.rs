//! Planar convex polygon.

use std::sync::atomic::{AtomicU64, Ordering};

use config::constants::EPSILON;

use crate::color::Material;
use crate::plane::{Plane, PolygonSide};
use crate::tessellate::{ear_clip, is_convex_2d, plane_basis, project_to_plane};
use crate::vector::{Side, Vector};
use crate::vertex::Vertex;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a fresh polygon id, used both for brand-new polygons and for
/// the shared id a split polygon's two halves both inherit.
pub fn next_polygon_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A convex, planar, non-self-intersecting polygon.
///
/// The public constructors tessellate any non-convex input before
/// admission, so every live `Polygon` satisfies invariant (ii) by
/// construction — `from_triangle_fan` is the only escape hatch and is used
/// internally by the tessellator itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    pub material: Option<Material>,
    pub id: u64,
}

impl Polygon {
    /// Builds one or more convex polygons from an arbitrary (possibly
    /// concave, but simple and coplanar) vertex loop, assigning all
    /// resulting polygons a shared `id` since they all descend from the
    /// one source loop.
    pub fn build(vertices: Vec<Vertex>, material: Option<Material>) -> Vec<Polygon> {
        if vertices.len() < 3 {
            return Vec::new();
        }
        let plane = match Self::infer_plane(&vertices) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let id = next_polygon_id();
        let vertices = Self::fill_normals(vertices, plane);

        let (u, v) = plane_basis(plane.normal);
        let positions: Vec<Vector> = vertices.iter().map(|vx| vx.position).collect();
        let projected = project_to_plane(&positions, positions[0], u, v);

        if is_convex_2d(&projected) {
            return vec![Polygon { vertices, plane, material, id }];
        }

        ear_clip(&projected)
            .into_iter()
            .map(|[a, b, c]| Polygon {
                vertices: vec![vertices[a], vertices[b], vertices[c]],
                plane,
                material: material.clone(),
                id,
            })
            .collect()
    }

    /// Builds a single polygon directly without convexity/tessellation
    /// checks — for internal use where the caller already guarantees
    /// convexity (BSP split output, builder triangle emission).
    pub(crate) fn from_convex_loop(vertices: Vec<Vertex>, plane: Plane, material: Option<Material>, id: u64) -> Self {
        Polygon { vertices, plane, material, id }
    }

    fn fill_normals(vertices: Vec<Vertex>, plane: Plane) -> Vec<Vertex> {
        vertices
            .into_iter()
            .map(|vx| {
                if vx.needs_normal_recompute() {
                    vx.with_normal(plane.normal)
                } else {
                    vx
                }
            })
            .collect()
    }

    /// Newell's method: robust even when the first three vertices are
    /// near-collinear, as long as the loop overall is planar.
    fn infer_plane(vertices: &[Vertex]) -> Option<Plane> {
        let mut normal = Vector::ZERO;
        let n = vertices.len();
        let mut centroid = Vector::ZERO;
        for i in 0..n {
            let a = vertices[i].position;
            let b = vertices[(i + 1) % n].position;
            normal = normal
                + Vector::new(
                    (a.y - b.y) * (a.z + b.z),
                    (a.z - b.z) * (a.x + b.x),
                    (a.x - b.x) * (a.y + b.y),
                );
            centroid = centroid + a;
        }
        if normal.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let normal = normal.normalized();
        centroid = centroid * (1.0 / n as f64);
        Some(Plane::new(normal, normal.dot(centroid)))
    }

    pub fn area(&self) -> f64 {
        let (u, v) = plane_basis(self.plane.normal);
        let origin = self.vertices[0].position;
        let pts = project_to_plane(
            &self.vertices.iter().map(|vx| vx.position).collect::<Vec<_>>(),
            origin,
            u,
            v,
        );
        let n = pts.len();
        let mut area = 0.0;
        for i in 0..n {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % n];
            area += x0 * y1 - x1 * y0;
        }
        (area * 0.5).abs()
    }

    /// Fan-triangulates this (always-convex) polygon for rendering/export,
    /// emitting `vertices.len() - 2` triangles as index triples into
    /// `self.vertices`.
    pub fn triangle_fan(&self) -> Vec<[u32; 3]> {
        let n = self.vertices.len();
        if n < 3 {
            return Vec::new();
        }
        (1..n - 1).map(|i| [0u32, i as u32, (i + 1) as u32]).collect()
    }

    pub fn flip(&self) -> Polygon {
        let mut vertices: Vec<Vertex> = self.vertices.iter().map(|v| v.flipped(None)).collect();
        vertices.reverse();
        Polygon {
            vertices,
            plane: self.plane.flip(),
            material: self.material.clone(),
            id: self.id,
        }
    }

    pub fn classify(&self, plane: &Plane) -> PolygonSide {
        let points: Vec<Vector> = self.vertices.iter().map(|v| v.position).collect();
        match plane.classify_points(&points) {
            PolygonSide::CoplanarFront if self.plane.normal.dot(plane.normal) > 0.0 => PolygonSide::CoplanarFront,
            PolygonSide::CoplanarFront => PolygonSide::CoplanarBack,
            other => other,
        }
    }

    /// Splits a spanning polygon. Both halves inherit a single
    /// freshly allocated id so later detessellation/tie-break logic can
    /// recognize them as a pair descended from this split.
    pub fn split_spanning(&self, plane: &Plane) -> (Option<Polygon>, Option<Polygon>) {
        let n = self.vertices.len();
        let mut front: Vec<Vertex> = Vec::with_capacity(n + 1);
        let mut back: Vec<Vertex> = Vec::with_capacity(n + 1);

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let sa = a.position.compare(plane);
            let sb = b.position.compare(plane);

            match sa {
                Side::Front => front.push(a),
                Side::Back => back.push(a),
                Side::Coplanar => {
                    front.push(a);
                    back.push(a);
                }
            }

            let crosses = matches!((sa, sb), (Side::Front, Side::Back) | (Side::Back, Side::Front));
            if crosses {
                let da = plane.signed_distance(a.position);
                let db = plane.signed_distance(b.position);
                let t = (da / (da - db)).clamp(0.0, 1.0);
                let mid = a.lerp(b, t);
                front.push(mid);
                back.push(mid);
            }
        }

        let id = next_polygon_id();
        let make = |verts: Vec<Vertex>| -> Option<Polygon> {
            if verts.len() < 3 {
                return None;
            }
            Some(Polygon::from_convex_loop(verts, self.plane, self.material.clone(), id))
        };
        (make(front), make(back))
    }

    pub fn centroid(&self) -> Vector {
        let mut c = Vector::ZERO;
        for v in &self.vertices {
            c = c + v.position;
        }
        c * (1.0 / self.vertices.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64) -> Polygon {
        let verts = vec![
            Vertex::at(Vector::new(0.0, 0.0, z)),
            Vertex::at(Vector::new(1.0, 0.0, z)),
            Vertex::at(Vector::new(1.0, 1.0, z)),
            Vertex::at(Vector::new(0.0, 1.0, z)),
        ];
        Polygon::build(verts, None).remove(0)
    }

    #[test]
    fn build_assigns_outward_normal() {
        let p = square(0.0);
        assert_eq!(p.plane.normal, Vector::Z);
        assert_eq!(p.vertices[0].normal, Vector::Z);
    }

    #[test]
    fn flip_reverses_winding_and_normal() {
        let p = square(0.0);
        let f = p.flip();
        assert_eq!(f.plane.normal, -Vector::Z);
        assert_eq!(f.vertices[0].position, p.vertices[p.vertices.len() - 1].position);
    }

    #[test]
    fn classify_spanning_splits() {
        let verts = vec![
            Vertex::at(Vector::new(0.0, 0.0, -1.0)),
            Vertex::at(Vector::new(1.0, 0.0, 1.0)),
            Vertex::at(Vector::new(0.0, 1.0, 1.0)),
        ];
        let poly = Polygon::build(verts, None).remove(0);
        let plane = Plane::new(Vector::Z, 0.0);
        assert_eq!(poly.classify(&plane), PolygonSide::Spanning);
        let (front, back) = poly.split_spanning(&plane);
        assert!(front.is_some());
        assert!(back.is_some());
        assert_eq!(front.as_ref().unwrap().id, back.as_ref().unwrap().id);
    }

    #[test]
    fn non_convex_quad_tessellates_to_triangles() {
        let verts = vec![
            Vertex::at(Vector::new(0.0, 0.0, 0.0)),
            Vertex::at(Vector::new(2.0, 0.0, 0.0)),
            Vertex::at(Vector::new(0.5, 0.5, 0.0)),
            Vertex::at(Vector::new(0.0, 2.0, 0.0)),
        ];
        let polys = Polygon::build(verts, None);
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0].id, polys[1].id);
    }
}
