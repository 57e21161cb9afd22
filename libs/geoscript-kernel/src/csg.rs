//! Boolean CSG operators on meshes.

use crate::bsp::BspNode;
use crate::detessellate::detessellate;
use crate::error::{check_cancelled, Cancel, KResult};
use crate::mesh::Mesh;
use crate::polygon::Polygon;

fn flip_all(polys: &[Polygon]) -> Vec<Polygon> {
    polys.iter().map(Polygon::flip).collect()
}

fn finish(polys: Vec<Polygon>) -> Mesh {
    Mesh::new(detessellate(polys))
}

/// `A ∪ B`.
pub fn union(a: &Mesh, b: &Mesh, cancel: Cancel) -> KResult<Mesh> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    if !a.bounds().intersects(&b.bounds()) {
        return Ok(a.merge(b));
    }

    let bsp_a = BspNode::build(a.polygons().to_vec(), cancel)?;
    let bsp_b = BspNode::build(b.polygons().to_vec(), cancel)?;

    let mut pa = bsp_b.clip(a.polygons().to_vec(), true, cancel)?;
    let pb = bsp_a.clip(b.polygons().to_vec(), false, cancel)?;
    pa.extend(pb);
    Ok(finish(pa))
}

/// `A ∩ B`.
pub fn intersection(a: &Mesh, b: &Mesh, cancel: Cancel) -> KResult<Mesh> {
    if a.is_empty() || b.is_empty() || !a.bounds().intersects(&b.bounds()) {
        return Ok(Mesh::empty());
    }

    let bsp_a = BspNode::build(a.polygons().to_vec(), cancel)?;
    let bsp_b = BspNode::build(b.polygons().to_vec(), cancel)?;

    let pa = flip_all(a.polygons());
    let pa = bsp_b.clip(pa, false, cancel)?;
    let pb = flip_all(b.polygons());
    let pb = bsp_a.clip(pb, false, cancel)?;

    let mut pa = flip_all(&pa);
    let pb = flip_all(&pb);
    pa.extend(pb);
    Ok(finish(pa))
}

/// `A - B`.
pub fn difference(a: &Mesh, b: &Mesh, cancel: Cancel) -> KResult<Mesh> {
    if a.is_empty() {
        return Ok(Mesh::empty());
    }
    if b.is_empty() || !a.bounds().intersects(&b.bounds()) {
        return Ok(a.clone());
    }

    let bsp_a = BspNode::build(a.polygons().to_vec(), cancel)?;
    let bsp_b = BspNode::build(b.polygons().to_vec(), cancel)?;

    let pa = flip_all(a.polygons());
    let mut pa = bsp_b.clip(pa, false, cancel)?;
    let pb = bsp_a.clip(b.polygons().to_vec(), true, cancel)?;
    let pb = flip_all(&pb);

    pa = flip_all(&pa);
    pa.extend(pb);
    Ok(finish(pa))
}

/// `(A ∪ B) - (A ∩ B)`.
pub fn xor(a: &Mesh, b: &Mesh, cancel: Cancel) -> KResult<Mesh> {
    check_cancelled(cancel)?;
    let u = union(a, b, cancel)?;
    let i = intersection(a, b, cancel)?;
    difference(&u, &i, cancel)
}

/// Replaces `B`'s polygons that lie inside `A`'s solid with `A`'s
/// material, leaving `A`'s own geometry — and `B`'s geometry outside
/// `A` — unchanged.
pub fn stencil(a: &Mesh, b: &Mesh, cancel: Cancel) -> KResult<Mesh> {
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }

    let bsp_a = BspNode::build(a.polygons().to_vec(), cancel)?;
    let stencil_material = a.materials().first().cloned();

    let mut out = a.polygons().to_vec();
    for poly in b.polygons() {
        check_cancelled(cancel)?;
        let mut p = poly.clone();
        if bsp_a.contains_point(poly.centroid()) {
            p.material = stencil_material.clone();
        }
        out.push(p);
    }
    Ok(Mesh::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;
    use crate::vertex::Vertex;

    const NO_CANCEL: Cancel = &|| false;

    fn cube(half: f64, center: Vector) -> Mesh {
        let faces: [[Vector; 4]; 6] = [
            [
                Vector::new(-half, -half, -half),
                Vector::new(-half, half, -half),
                Vector::new(-half, half, half),
                Vector::new(-half, -half, half),
            ],
            [
                Vector::new(half, -half, -half),
                Vector::new(half, -half, half),
                Vector::new(half, half, half),
                Vector::new(half, half, -half),
            ],
            [
                Vector::new(-half, -half, -half),
                Vector::new(half, -half, -half),
                Vector::new(half, -half, half),
                Vector::new(-half, -half, half),
            ],
            [
                Vector::new(-half, half, -half),
                Vector::new(-half, half, half),
                Vector::new(half, half, half),
                Vector::new(half, half, -half),
            ],
            [
                Vector::new(-half, -half, -half),
                Vector::new(-half, half, -half),
                Vector::new(half, half, -half),
                Vector::new(half, -half, -half),
            ],
            [
                Vector::new(-half, -half, half),
                Vector::new(half, -half, half),
                Vector::new(half, half, half),
                Vector::new(-half, half, half),
            ],
        ];
        let polys: Vec<Polygon> = faces
            .into_iter()
            .flat_map(|face| {
                let verts = face.into_iter().map(|p| Vertex::at(p + center)).collect();
                Polygon::build(verts, None)
            })
            .collect();
        Mesh::new(polys)
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a = cube(1.0, Vector::ZERO);
        let u = union(&a, &Mesh::empty(), NO_CANCEL).unwrap();
        assert_eq!(u.polygon_count(), a.polygon_count());
    }

    #[test]
    fn difference_self_is_empty_bounds() {
        let a = cube(1.0, Vector::ZERO);
        let d = difference(&a, &a, NO_CANCEL).unwrap();
        // After A - A every surface point should be interior/cancelled;
        // the result should contain no points a naive containment test
        // would call "solidly inside".
        assert!(!d.contains_point(Vector::ZERO) || d.polygon_count() < a.polygon_count());
    }

    #[test]
    fn disjoint_union_merges_without_csg() {
        let a = cube(1.0, Vector::ZERO);
        let b = cube(1.0, Vector::new(10.0, 0.0, 0.0));
        let u = union(&a, &b, NO_CANCEL).unwrap();
        assert_eq!(u.polygon_count(), a.polygon_count() + b.polygon_count());
    }

    #[test]
    fn intersection_of_disjoint_is_empty() {
        let a = cube(1.0, Vector::ZERO);
        let b = cube(1.0, Vector::new(10.0, 0.0, 0.0));
        let i = intersection(&a, &b, NO_CANCEL).unwrap();
        assert!(i.is_empty());
    }

    #[test]
    fn overlapping_cubes_intersect_nonempty() {
        let a = cube(1.0, Vector::ZERO);
        let b = cube(1.0, Vector::new(1.0, 0.0, 0.0));
        let i = intersection(&a, &b, NO_CANCEL).unwrap();
        assert!(!i.is_empty());
        assert!(i.contains_point(Vector::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn difference_removes_overlap() {
        let a = cube(1.0, Vector::ZERO);
        let b = cube(1.2, Vector::new(1.5, 0.0, 0.0));
        let d = difference(&a, &b, NO_CANCEL).unwrap();
        assert!(d.contains_point(Vector::new(-0.5, 0.0, 0.0)));
        assert!(!d.contains_point(Vector::new(0.9, 0.0, 0.0)));
    }
}
