//! Immutable, reference-counted mesh handle.

use std::sync::{Arc, OnceLock};

use crate::bounds::Bounds;
use crate::color::Material;
use crate::line_segment::LineSegment;
use crate::polygon::Polygon;
use crate::vector::Vector;

struct Storage {
    polygons: Vec<Polygon>,
    bounds: OnceLock<Bounds>,
    is_convex: OnceLock<bool>,
    is_watertight: OnceLock<bool>,
    submeshes: OnceLock<Vec<Vec<usize>>>,
    materials: OnceLock<Vec<Material>>,
}

/// A handle to shared, immutable polygon storage. Cloning a `Mesh` is an
/// `Arc` bump, not a polygon copy; lazy fields (bounds, watertightness,
/// submeshes, materials) are computed once per `Storage` block and shared
/// by every clone.
#[derive(Clone)]
pub struct Mesh {
    inner: Arc<Storage>,
    /// Set by a constructor that already knows the answer (hull output,
    /// primitive builders) so `is_convex()` need not recompute it.
    known_convex: Option<bool>,
}

impl Mesh {
    pub fn empty() -> Self {
        Mesh {
            inner: Arc::new(Storage {
                polygons: Vec::new(),
                bounds: OnceLock::new(),
                is_convex: OnceLock::new(),
                is_watertight: OnceLock::new(),
                submeshes: OnceLock::new(),
                materials: OnceLock::new(),
            }),
            known_convex: Some(true),
        }
    }

    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self::with_known_convexity(polygons, None)
    }

    pub fn with_known_convexity(polygons: Vec<Polygon>, known_convex: Option<bool>) -> Self {
        if polygons.is_empty() {
            return Mesh::empty();
        }
        Mesh {
            inner: Arc::new(Storage {
                polygons,
                bounds: OnceLock::new(),
                is_convex: OnceLock::new(),
                is_watertight: OnceLock::new(),
                submeshes: OnceLock::new(),
                materials: OnceLock::new(),
            }),
            known_convex,
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.inner.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.inner.polygons.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.inner.polygons.len()
    }

    pub fn bounds(&self) -> Bounds {
        *self.inner.bounds.get_or_init(|| {
            let mut b = Bounds::EMPTY;
            for poly in &self.inner.polygons {
                for v in &poly.vertices {
                    b = b.inserting(v.position);
                }
            }
            b
        })
    }

    /// Whether every vertex of every polygon lies on the inside half-space
    /// of every other polygon's plane — the brute-force definition of
    /// convexity for an arbitrary polygon soup. A convex mesh has at most
    /// one submesh.
    pub fn is_convex(&self) -> bool {
        if let Some(known) = self.known_convex {
            return known;
        }
        *self.inner.is_convex.get_or_init(|| {
            let polys = &self.inner.polygons;
            if polys.len() <= 1 {
                return true;
            }
            for poly in polys {
                for other in polys {
                    for v in &other.vertices {
                        if poly.plane.signed_distance(v.position) > config::constants::EPSILON {
                            return false;
                        }
                    }
                }
            }
            true
        })
    }

    pub fn is_watertight(&self) -> bool {
        *self.inner.is_watertight.get_or_init(|| edge_multiplicities_even(&self.inner.polygons))
    }

    /// Maximal connected components under edge-sharing, returned as groups
    /// of polygon indices.
    pub fn submeshes(&self) -> &[Vec<usize>] {
        self.inner.submeshes.get_or_init(|| connected_components(&self.inner.polygons))
    }

    pub fn materials(&self) -> &[Material] {
        self.inner.materials.get_or_init(|| {
            let mut out: Vec<Material> = Vec::new();
            for poly in &self.inner.polygons {
                if let Some(m) = &poly.material {
                    if !out.iter().any(|existing| existing == m) {
                        out.push(m.clone());
                    }
                }
            }
            out
        })
    }

    /// Builds a BSP tree on demand and tests containment.
    /// Not cached: this builds a fresh BSP tree per call rather than
    /// joining the mesh's other lazily cached invariants.
    pub fn contains_point(&self, p: Vector) -> bool {
        if self.is_empty() {
            return false;
        }
        let cancel: crate::error::Cancel = &|| false;
        match crate::bsp::BspNode::build(self.inner.polygons.clone(), cancel) {
            Ok(tree) => tree.contains_point(p),
            Err(_) => false,
        }
    }

    /// Best-effort watertight repair: inserts T-junction
    /// vertices for every odd-multiplicity edge. Callers must re-check
    /// [`Mesh::is_watertight`] afterward — repair is not guaranteed to
    /// close every hole.
    pub fn make_watertight(&self) -> Mesh {
        Mesh::new(crate::watertight::make_watertight(self.inner.polygons.clone()))
    }

    /// Concatenates polygons from two non-overlapping meshes without
    /// running CSG, mirroring the fast path the CSG operators take when
    /// bounding boxes don't intersect.
    pub fn merge(&self, other: &Mesh) -> Mesh {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut polys = self.inner.polygons.clone();
        polys.extend(other.inner.polygons.iter().cloned());
        Mesh::new(polys)
    }

    /// Flattens every polygon's fan-triangulation into plain vertex/index
    /// buffers for a renderer
    /// — the host-agnostic half of what `geoscript-wasm`'s `MeshHandle`
    /// hands a browser as typed arrays. Per-vertex colors are included
    /// only when at least one vertex in the mesh carries one, matching
    /// the optional-attribute shape a host buffer layout expects.
    pub fn render_buffers(&self) -> RenderBuffers {
        let has_color = self.inner.polygons.iter().any(|p| p.vertices.iter().any(|v| v.color.is_some()));
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut colors = has_color.then(Vec::new);
        let mut indices = Vec::new();

        for poly in &self.inner.polygons {
            let base = (positions.len() / 3) as u32;
            for v in &poly.vertices {
                positions.extend_from_slice(&[v.position.x as f32, v.position.y as f32, v.position.z as f32]);
                normals.extend_from_slice(&[v.normal.x as f32, v.normal.y as f32, v.normal.z as f32]);
                if let Some(colors) = colors.as_mut() {
                    let c = v.color.unwrap_or_default().to_array();
                    colors.extend_from_slice(&c);
                }
            }
            for tri in poly.triangle_fan() {
                indices.extend(tri.iter().map(|i| base + i));
            }
        }

        RenderBuffers { positions, normals, colors, indices }
    }
}

/// Flattened render-ready buffers produced by [`Mesh::render_buffers`].
#[derive(Debug, Clone, Default)]
pub struct RenderBuffers {
    /// `[x, y, z, ...]`, length `3 * vertex_count`.
    pub positions: Vec<f32>,
    /// `[nx, ny, nz, ...]`, length `3 * vertex_count`.
    pub normals: Vec<f32>,
    /// `[r, g, b, a, ...]` when any vertex carries a color, else `None`.
    pub colors: Option<Vec<f32>>,
    /// Triangle indices into the position/normal/color buffers.
    pub indices: Vec<u32>,
}

impl RenderBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Mesh::empty()
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.inner.polygons.len() == other.inner.polygons.len()
            && self
                .inner
                .polygons
                .iter()
                .zip(other.inner.polygons.iter())
                .all(|(a, b)| a == b)
    }
}

fn polygon_edges(poly: &Polygon) -> Vec<LineSegment> {
    let n = poly.vertices.len();
    (0..n)
        .map(|i| LineSegment::new(poly.vertices[i].position, poly.vertices[(i + 1) % n].position))
        .collect()
}

fn edge_multiplicities_even(polys: &[Polygon]) -> bool {
    use std::collections::HashMap;
    let mut counts: HashMap<LineSegment, u32> = HashMap::new();
    for poly in polys {
        for e in polygon_edges(poly) {
            *counts.entry(e).or_insert(0) += 1;
        }
    }
    counts.values().all(|&c| c % 2 == 0)
}

fn connected_components(polys: &[Polygon]) -> Vec<Vec<usize>> {
    use std::collections::HashMap;

    let n = polys.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }
    fn union(parent: &mut [usize], a: usize, b: usize) {
        let (ra, rb) = (find(parent, a), find(parent, b));
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut edge_owner: HashMap<LineSegment, usize> = HashMap::new();
    for (i, poly) in polys.iter().enumerate() {
        for e in polygon_edges(poly) {
            if let Some(&owner) = edge_owner.get(&e) {
                union(&mut parent, owner, i);
            } else {
                edge_owner.insert(e, i);
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }
    let mut out: Vec<Vec<usize>> = groups.into_values().collect();
    out.sort_by_key(|g| g[0]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;
    use crate::vertex::Vertex;

    fn square(z: f64, flip: bool) -> Polygon {
        let mut verts = vec![
            Vertex::at(Vector::new(-1.0, -1.0, z)),
            Vertex::at(Vector::new(1.0, -1.0, z)),
            Vertex::at(Vector::new(1.0, 1.0, z)),
            Vertex::at(Vector::new(-1.0, 1.0, z)),
        ];
        if flip {
            verts.reverse();
        }
        Polygon::build(verts, None).remove(0)
    }

    #[test]
    fn empty_mesh_invariants() {
        let m = Mesh::empty();
        assert!(m.is_convex());
        assert!(m.is_watertight());
        assert!(m.submeshes().is_empty());
    }

    #[test]
    fn bounds_of_two_squares() {
        let m = Mesh::new(vec![square(0.0, false), square(1.0, true)]);
        let b = m.bounds();
        assert_eq!(b.min, Vector::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, Vector::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn disjoint_squares_form_two_submeshes() {
        let m = Mesh::new(vec![square(0.0, false), square(5.0, false)]);
        assert_eq!(m.submeshes().len(), 2);
    }

    #[test]
    fn clone_shares_storage() {
        let m = Mesh::new(vec![square(0.0, false)]);
        let n = m.clone();
        let _ = n.bounds();
        assert!(m.inner.bounds.get().is_some());
    }

    #[test]
    fn materials_dedup_by_value() {
        let plane = Plane::new(Vector::Z, 0.0);
        let mat = Material::default();
        let verts = vec![
            Vertex::at(Vector::new(0.0, 0.0, 0.0)),
            Vertex::at(Vector::new(1.0, 0.0, 0.0)),
            Vertex::at(Vector::new(0.0, 1.0, 0.0)),
        ];
        let p1 = Polygon::from_convex_loop(verts.clone(), plane, Some(mat.clone()), 1);
        let p2 = Polygon::from_convex_loop(verts, plane, Some(mat), 2);
        let m = Mesh::new(vec![p1, p2]);
        assert_eq!(m.materials().len(), 1);
    }

    #[test]
    fn render_buffers_triangulate_a_quad_into_two_triangles() {
        let m = Mesh::new(vec![square(0.0, false)]);
        let buf = m.render_buffers();
        assert_eq!(buf.vertex_count(), 4);
        assert_eq!(buf.triangle_count(), 2);
        assert!(buf.colors.is_none());
    }
}
