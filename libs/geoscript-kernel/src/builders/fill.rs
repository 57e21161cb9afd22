//! Planar face fill.

use crate::mesh::Mesh;
use crate::path::Path;
use crate::polygon::Polygon;
use crate::vertex::Vertex;

/// Builds a flat face mesh from each path's `faceVertices` with no side
/// walls — the degenerate case of a planar face with no extrusion at all.
/// Open or non-planar paths contribute nothing.
pub fn fill(paths: &[Path]) -> Mesh {
    let mut polys: Vec<Polygon> = Vec::new();
    for path in paths {
        polys.extend(from_triangles(path.face_vertices()));
    }
    Mesh::new(polys)
}

fn from_triangles(verts: Vec<Vertex>) -> Vec<Polygon> {
    verts
        .chunks(3)
        .filter(|c| c.len() == 3)
        .flat_map(|c| Polygon::build(c.to_vec(), None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathPoint;
    use crate::vector::Vector;

    fn square() -> Path {
        Path::new(vec![
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn fill_square_has_two_triangles_no_walls() {
        let mesh = fill(&[square()]);
        assert_eq!(mesh.polygon_count(), 2);
    }

    #[test]
    fn fill_open_path_is_empty() {
        let mut pts = square().points;
        pts.pop();
        let open = Path::new(pts);
        assert!(fill(&[open]).is_empty());
    }
}
