//! Content-addressed geometry cache: the cache
//! key is a structural hash of a geometry node — type, canonicalized
//! children keys, transform, material, smoothing — so that two documents
//! (or two sibling subtrees of one document) building structurally
//! identical geometry compute the mesh once and share it by `Arc`-backed
//! clone (`Mesh` is already a cheap reference-counted handle).

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use geoscript_eval::{Geometry, GeometryKind};
use geoscript_kernel::{Mesh, Rotation, Transform, Vector};

/// A structural hash of a [`Geometry`] node and its subtree. Two nodes
/// built from the same script text (same primitive kind, parameters,
/// transform, material, smoothing and — recursively — the same children)
/// hash equal; this is a digest, not a guarantee of no collisions, but a
/// 64-bit SipHash over every field that actually affects the resulting
/// mesh makes an accidental collision astronomically unlikely for a
/// geometry cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

fn hash_f64(h: &mut impl Hasher, v: f64) {
    v.to_bits().hash(h);
}

fn hash_vector(h: &mut impl Hasher, v: Vector) {
    hash_f64(h, v.x);
    hash_f64(h, v.y);
    hash_f64(h, v.z);
}

/// Hashes a rotation by its effect on the three basis axes rather than
/// reaching into the private quaternion representation — two rotations
/// that act identically on `X`/`Y`/`Z` are, for caching purposes, the
/// same rotation.
fn hash_rotation(h: &mut impl Hasher, r: Rotation) {
    hash_vector(h, r.apply(Vector::X));
    hash_vector(h, r.apply(Vector::Y));
    hash_vector(h, r.apply(Vector::Z));
}

fn hash_transform(h: &mut impl Hasher, t: &Transform) {
    hash_vector(h, t.translation);
    hash_rotation(h, t.rotation);
    hash_vector(h, t.scale);
}

fn hash_material(h: &mut impl Hasher, m: &geoscript_kernel::Material) {
    for c in m.color.to_array() {
        c.to_bits().hash(h);
    }
    m.texture.hash(h);
    hash_f64(h, m.opacity);
}

fn hash_path(h: &mut impl Hasher, p: &geoscript_kernel::Path) {
    p.points.len().hash(h);
    for pt in &p.points {
        hash_vector(h, pt.position);
        pt.is_curved.hash(h);
    }
}

/// Computes the structural cache key for a whole subtree rooted at `g`.
/// Deliberately ignores `g.name` and `g.source_location`: renaming a node
/// or moving it in the source without changing its shape should still hit
/// the cache.
pub fn structural_key(g: &Geometry) -> CacheKey {
    let mut h = std::collections::hash_map::DefaultHasher::new();
    hash_node(g, &mut h);
    CacheKey(h.finish())
}

fn hash_node(g: &Geometry, h: &mut impl Hasher) {
    std::mem::discriminant(&g.kind).hash(h);
    hash_kind_payload(&g.kind, h);
    hash_transform(h, &g.transform);
    hash_material(h, &g.material);
    hash_f64(h, g.smoothing);
    g.children.len().hash(h);
    for child in &g.children {
        hash_node(child, h);
    }
}

fn hash_kind_payload(kind: &GeometryKind, h: &mut impl Hasher) {
    match kind {
        GeometryKind::Group | GeometryKind::Debug => {}
        GeometryKind::Csg(op) => {
            std::mem::discriminant(op).hash(h);
        }
        GeometryKind::Cube { size } | GeometryKind::Sphere { size, .. } | GeometryKind::Cylinder { size, .. } | GeometryKind::Cone { size, .. } => {
            hash_vector(h, *size);
            if let GeometryKind::Sphere { detail, .. } | GeometryKind::Cylinder { detail, .. } | GeometryKind::Cone { detail, .. } = kind {
                detail.hash(h);
            }
        }
        GeometryKind::Pyramid { sides, size } | GeometryKind::Prism { sides, size } => {
            sides.hash(h);
            hash_vector(h, *size);
        }
        GeometryKind::Extrude { paths, along } => {
            paths.len().hash(h);
            for p in paths {
                hash_path(h, p);
            }
            match along {
                geoscript_eval::Along::Axis(v) => {
                    0u8.hash(h);
                    hash_vector(h, *v);
                }
                geoscript_eval::Along::Guide(p) => {
                    1u8.hash(h);
                    hash_path(h, p);
                }
            }
        }
        GeometryKind::Lathe { paths, segments } => {
            for p in paths {
                hash_path(h, p);
            }
            segments.hash(h);
        }
        GeometryKind::Loft { paths } | GeometryKind::Fill { paths } => {
            for p in paths {
                hash_path(h, p);
            }
        }
        GeometryKind::Hull { points } => {
            points.len().hash(h);
            for p in points {
                hash_vector(h, *p);
            }
        }
        GeometryKind::RawMesh(mesh) => {
            // Identity, not content: two distinct literal `mesh` blocks
            // are never worth treating as the same cache entry, even if
            // their polygons happen to coincide.
            (mesh.polygon_count(), mesh as *const _ as usize).hash(h);
        }
        GeometryKind::Camera(_) | GeometryKind::Light(_) => {
            // Cameras/lights never contribute mesh geometry; no
            // payload worth hashing since `build_local` always returns
            // `Mesh::empty()` for them.
        }
    }
}

/// Per-key lock so that concurrent builds of identical subgraphs compute
/// the mesh at most once.
#[derive(Default)]
pub struct GeometryCache {
    meshes: Mutex<HashMap<CacheKey, Mesh>>,
    locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock-free read path.
    pub fn get(&self, key: CacheKey) -> Option<Mesh> {
        self.meshes.lock().unwrap().get(&key).cloned()
    }

    fn lock_for(&self, key: CacheKey) -> Arc<Mutex<()>> {
        self.locks.lock().unwrap().entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub fn insert(&self, key: CacheKey, mesh: Mesh) {
        self.meshes.lock().unwrap().insert(key, mesh);
    }

    /// Number of distinct subgraphs cached, surfaced for diagnostics/tests.
    pub fn len(&self) -> usize {
        self.meshes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.meshes.lock().unwrap().clear();
        self.locks.lock().unwrap().clear();
    }

    /// Builds (and memoizes) the mesh for `g` and its whole subtree,
    /// consulting the cache at every node so structurally identical
    /// children across documents short-circuit. Children are built before
    /// parents — this
    /// recursion also happens to be the thing that primes each child's
    /// own lazy `OnceLock` so the subsequent `g.build()` call hits the
    /// already-computed fast path instead of recomputing.
    pub fn build(&self, g: &Geometry, cancel: geoscript_kernel::Cancel) -> Result<Mesh, geoscript_eval::EvalError> {
        if cancel() {
            return Err(geoscript_eval::EvalError::Cancelled);
        }
        let key = structural_key(g);
        if let Some(mesh) = self.get(key) {
            g.set_cached_mesh(mesh.clone());
            return Ok(mesh);
        }
        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap();
        if let Some(mesh) = self.get(key) {
            g.set_cached_mesh(mesh.clone());
            return Ok(mesh);
        }
        for child in &g.children {
            self.build(child, cancel)?;
        }
        let mesh = g.build(cancel)?;
        self.insert(key, mesh.clone());
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_diagnostics::NeverCancel;
    use geoscript_eval::{eval_source, NullDelegate};

    fn build_scene(src: &str) -> geoscript_eval::Scene {
        eval_source(src, &NeverCancel, &NullDelegate).expect("evaluates")
    }

    #[test]
    fn identical_subtrees_share_one_cache_entry() {
        let scene = build_scene("cube { size 2 }\ncube { size 2 }\ncube { size 3 }");
        let cache = GeometryCache::new();
        for g in &scene.children {
            cache.build(g, &|| false).expect("builds");
        }
        // two `size 2` cubes share one entry, the `size 3` cube gets its own.
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_hit_sets_node_mesh() {
        let scene = build_scene("cube { size 2 }\ncube { size 2 }");
        let cache = GeometryCache::new();
        let first = cache.build(&scene.children[0], &|| false).unwrap();
        let second = cache.build(&scene.children[1], &|| false).unwrap();
        assert_eq!(first.polygon_count(), second.polygon_count());
    }

    #[test]
    fn different_transforms_hash_differently() {
        let scene = build_scene("cube { size 2 }\ntranslate 1 0 0\ncube { size 2 }");
        let key_a = structural_key(&scene.children[0]);
        let key_b = structural_key(&scene.children[1]);
        assert_ne!(key_a.0, key_b.0);
    }
}
