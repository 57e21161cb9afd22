//! Ruled surface between successive paths.

use crate::mesh::Mesh;
use crate::path::Path;
use crate::polygon::Polygon;
use crate::vertex::Vertex;

/// Triangulates ruled surfaces connecting successive paths in `paths`, in
/// order, adding end caps where the first/last path is closed and planar
///. Successive paths are connected point-for-point; a path
/// with a different point count than its neighbor is resampled by index
/// modulo its own length, a reasonable approximation absent an explicit
/// canonical resampling rule for mismatched point counts.
pub fn loft(paths: &[Path]) -> Mesh {
    if paths.len() < 2 {
        return Mesh::empty();
    }

    let mut polys: Vec<Polygon> = Vec::new();
    for pair in paths.windows(2) {
        let (pa, pb) = (&pair[0], &pair[1]);
        let na = pa.points.len();
        let nb = pb.points.len();
        if na < 2 || nb < 2 {
            continue;
        }
        let n = na.max(nb) - 1;
        for i in 0..n {
            let a0 = pa.points[i % na].position;
            let a1 = pa.points[(i + 1) % na].position;
            let b0 = pb.points[i % nb].position;
            let b1 = pb.points[(i + 1) % nb].position;
            polys.extend(Polygon::build(
                vec![Vertex::at(a0), Vertex::at(a1), Vertex::at(b1), Vertex::at(b0)],
                None,
            ));
        }
    }

    if let Some(first) = paths.first() {
        if first.is_closed() && first.plane().is_some() {
            polys.extend(flip_triangles(first.face_vertices()));
        }
    }
    if let Some(last) = paths.last() {
        if last.is_closed() && last.plane().is_some() {
            polys.extend(from_triangles(last.face_vertices()));
        }
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

fn flip_triangles(verts: Vec<Vertex>) -> Vec<Polygon> {
    from_triangles(verts).iter().map(Polygon::flip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathPoint;
    use crate::vector::Vector;

    fn square_at(z: f64) -> Path {
        Path::new(vec![
            PathPoint::sharp(Vector::new(-1.0, -1.0, z)),
            PathPoint::sharp(Vector::new(1.0, -1.0, z)),
            PathPoint::sharp(Vector::new(1.0, 1.0, z)),
            PathPoint::sharp(Vector::new(-1.0, 1.0, z)),
            PathPoint::sharp(Vector::new(-1.0, -1.0, z)),
        ])
    }

    #[test]
    fn loft_between_two_squares_has_walls_and_caps() {
        let mesh = loft(&[square_at(0.0), square_at(1.0)]);
        assert!(!mesh.is_empty());
        assert!(mesh.is_watertight());
    }

    #[test]
    fn single_path_lofts_to_nothing() {
        assert!(loft(&[square_at(0.0)]).is_empty());
    }
}
