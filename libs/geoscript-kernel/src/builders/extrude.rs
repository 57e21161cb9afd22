//! Straight or guide-path extrusion.

use crate::builders::loft::loft;
use crate::error::{check_cancelled, Cancel, KResult};
use crate::mesh::Mesh;
use crate::path::{Path, PathPoint};
use crate::polygon::Polygon;
use crate::vector::Vector;
use crate::vertex::Vertex;

/// How an `extrude` sweeps its cross-section paths.
pub enum Along {
    /// A straight displacement vector; its length is the extrusion
    /// distance.
    Axis(Vector),
    /// A guide path: the cross-section is duplicated at each guide point
    /// and the results are lofted together.
    Guide(Path),
}

impl Default for Along {
    fn default() -> Self {
        Along::Axis(Vector::new(0.0, 0.0, 1.0))
    }
}

fn extrude_along_axis(path: &Path, axis: Vector) -> Mesh {
    let edges = path.edge_vertices(axis.normalized());
    let mut polys: Vec<Polygon> = Vec::new();
    for (a, b) in edges {
        let a1 = Vertex { position: a.position + axis, ..a };
        let b1 = Vertex { position: b.position + axis, ..b };
        polys.extend(Polygon::build(vec![a, b, b1, a1], None));
    }

    let watertight_caps = path.is_closed() && path.plane().is_some();
    if watertight_caps {
        let bottom = path.face_vertices();
        polys.extend(flip_triangles(bottom.clone()));
        let top: Vec<Vertex> = bottom
            .into_iter()
            .map(|v| Vertex { position: v.position + axis, ..v })
            .collect();
        polys.extend(from_triangles(top));
    }

    Mesh::with_known_convexity(polys, None)
}

fn from_triangles(verts: Vec<Vertex>) -> Vec<Polygon> {
    verts
        .chunks(3)
        .filter(|c| c.len() == 3)
        .flat_map(|c| Polygon::build(c.to_vec(), None))
        .collect()
}

fn flip_triangles(verts: Vec<Vertex>) -> Vec<Polygon> {
    from_triangles(verts).iter().map(Polygon::flip).collect()
}

fn extrude_along_guide(path: &Path, guide: &Path) -> Mesh {
    let profiles: Vec<Path> = guide
        .points
        .iter()
        .map(|gp| {
            Path::new(
                path.points
                    .iter()
                    .map(|pp| PathPoint { position: pp.position + gp.position, ..*pp })
                    .collect(),
            )
        })
        .collect();
    loft(&profiles)
}

/// Extrudes every path in `paths`: side walls from
/// `edgeVertices`, caps from `faceVertices` when the path is closed and
/// planar, producing a watertight mesh in that case.
pub fn extrude(paths: &[Path], along: &Along, cancel: Cancel) -> KResult<Mesh> {
    let mut result = Mesh::empty();
    for path in paths {
        check_cancelled(cancel)?;
        let piece = match along {
            Along::Axis(v) => extrude_along_axis(path, *v),
            Along::Guide(guide) => extrude_along_guide(path, guide),
        };
        result = result.merge(&piece);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CANCEL: Cancel = &|| false;

    fn square() -> Path {
        Path::new(vec![
            PathPoint::sharp(Vector::new(-1.0, -1.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, -1.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(-1.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(-1.0, -1.0, 0.0)),
        ])
    }

    #[test]
    fn extrude_closed_square_is_watertight() {
        let along = Along::Axis(Vector::new(0.0, 0.0, 2.0));
        let mesh = extrude(&[square()], &along, NO_CANCEL).unwrap();
        assert!(mesh.is_watertight());
        assert!(mesh.bounds().max.z - mesh.bounds().min.z > 1.9);
    }

    #[test]
    fn extrude_along_guide_produces_nonempty_mesh() {
        let guide = Path::new(vec![PathPoint::sharp(Vector::ZERO), PathPoint::sharp(Vector::new(0.0, 0.0, 3.0))]);
        let mesh = extrude(&[square()], &Along::Guide(guide), NO_CANCEL).unwrap();
        assert!(!mesh.is_empty());
    }
}
