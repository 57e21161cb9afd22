//! Revolve-around-Y builder.

use crate::mesh::Mesh;
use crate::path::Path;
use crate::polygon::Polygon;
use crate::rotation::Rotation;
use crate::vector::Vector;
use crate::vertex::Vertex;

/// Clips each path to the `x <= 0` half-space, then sweeps it around the Y
/// axis in `segments` angular steps, quadding adjacent points on adjacent
/// slices. The last slice wraps back to the first, so the seam is an
/// ordinary shared edge rather than a duplicated one.
pub fn lathe(paths: &[Path], segments: u32) -> Mesh {
    let segments = segments.max(3);
    let mut result = Mesh::empty();
    for path in paths {
        let clipped = path.clip_to_y_axis();
        if clipped.points.len() < 2 {
            continue;
        }
        result = result.merge(&revolve(&clipped, segments));
    }
    result
}

fn revolve(path: &Path, segments: u32) -> Mesh {
    let n = path.points.len();
    let rings: Vec<Vec<Vector>> = (0..segments)
        .map(|k| {
            let angle = std::f64::consts::TAU * k as f64 / segments as f64;
            let rot = Rotation::from_axis_angle(Vector::Y, angle);
            path.points.iter().map(|p| rot.apply(p.position)).collect()
        })
        .collect();

    let segments = segments as usize;
    let mut polys: Vec<Polygon> = Vec::new();
    for k in 0..segments {
        let k2 = (k + 1) % segments;
        for i in 0..n - 1 {
            let a0 = rings[k][i];
            let a1 = rings[k][i + 1];
            let b0 = rings[k2][i];
            let b1 = rings[k2][i + 1];
            polys.extend(Polygon::build(
                vec![Vertex::at(a0), Vertex::at(a1), Vertex::at(b1), Vertex::at(b0)],
                None,
            ));
        }
    }
    Mesh::new(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathPoint;

    fn vertical_line() -> Path {
        Path::new(vec![
            PathPoint::sharp(Vector::new(-1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(-1.0, 1.0, 0.0)),
        ])
    }

    #[test]
    fn lathe_cylinder_wall_is_watertight() {
        let mesh = lathe(&[vertical_line()], 8);
        assert_eq!(mesh.polygon_count(), 8);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn lathe_radius_matches_clipped_profile() {
        let mesh = lathe(&[vertical_line()], 4);
        let b = mesh.bounds();
        assert!((b.max.x - 1.0).abs() < 1e-9);
        assert!((b.min.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn lathe_drops_degenerate_paths() {
        let single = Path::new(vec![PathPoint::sharp(Vector::new(-1.0, 0.0, 0.0))]);
        assert!(lathe(&[single], 8).is_empty());
    }

    #[test]
    fn lathe_clamps_tiny_segment_counts() {
        let mesh = lathe(&[vertical_line()], 1);
        assert_eq!(mesh.polygon_count(), 3);
    }
}
