//! Ordered 3D control-point path.

use config::constants::EPSILON;

use crate::color::Color;
use crate::plane::Plane;
use crate::tessellate::{ear_clip, is_convex_2d, plane_basis, project_to_plane};
use crate::vector::Vector;
use crate::vertex::Vertex;

/// A single control point on a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Vector,
    /// `curve` points get smoothed normals at shared joints; `point`
    /// (sharp) endpoints keep hard-edge duplicate normals.
    pub is_curved: bool,
    pub color: Option<Color>,
    pub texcoord: Option<Vector>,
}

impl PathPoint {
    pub fn sharp(position: Vector) -> Self {
        Self { position, is_curved: false, color: None, texcoord: None }
    }

    pub fn curved(position: Vector) -> Self {
        Self { position, is_curved: true, color: None, texcoord: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<PathPoint>,
}

impl Path {
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points[0].position == self.points[self.points.len() - 1].position
    }

    pub fn bounds(&self) -> crate::bounds::Bounds {
        crate::bounds::Bounds::from_points(self.points.iter().map(|p| p.position))
    }

    /// Effective loop of positions: for a closed path, drop the duplicate
    /// closing point so callers iterate each vertex once.
    fn loop_positions(&self) -> Vec<Vector> {
        let mut pts: Vec<Vector> = self.points.iter().map(|p| p.position).collect();
        if self.is_closed() && pts.len() > 1 {
            pts.pop();
        }
        pts
    }

    /// Newell's-method plane inference for a closed, planar path; `None`
    /// for open or non-planar paths.
    pub fn plane(&self) -> Option<Plane> {
        if !self.is_closed() {
            return None;
        }
        let pts = self.loop_positions();
        if pts.len() < 3 {
            return None;
        }
        let mut normal = Vector::ZERO;
        let mut centroid = Vector::ZERO;
        let n = pts.len();
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
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
        let plane = Plane::new(normal, normal.dot(centroid));
        // Planarity check: every point must actually lie on the inferred plane.
        if pts.iter().all(|&p| plane.contains(p)) {
            Some(plane)
        } else {
            None
        }
    }

    /// Whether the path's edges cross each other, checked in its own
    /// plane; non-planar or open paths are reported simple (no general
    /// 3D self-intersection test is attempted).
    pub fn is_simple(&self) -> bool {
        let Some(plane) = self.plane() else {
            return true;
        };
        let pts = self.loop_positions();
        let (u, v) = plane_basis(plane.normal);
        let proj = project_to_plane(&pts, pts[0], u, v);
        let n = proj.len();
        for i in 0..n {
            let (a0, a1) = (proj[i], proj[(i + 1) % n]);
            for j in (i + 1)..n {
                if j == i || (j + 1) % n == i {
                    continue;
                }
                let (b0, b1) = (proj[j], proj[(j + 1) % n]);
                if segments_cross(a0, a1, b0, b1) {
                    return false;
                }
            }
        }
        true
    }

    /// Splits the point sequence into subpaths at self-touching joints
    ///: whenever a point repeats an earlier non-adjacent
    /// point, a subpath closes there and a new one continues.
    pub fn subpaths(&self) -> Vec<Path> {
        let mut result = Vec::new();
        let mut current: Vec<PathPoint> = Vec::new();

        for &pt in &self.points {
            if let Some(idx) = current.iter().position(|p| p.position == pt.position) {
                current.push(pt);
                if idx > 0 {
                    result.push(Path::new(current[idx..].to_vec()));
                }
                current.truncate(idx + 1);
            } else {
                current.push(pt);
            }
        }
        if current.len() > 1 {
            result.push(Path::new(current));
        } else if result.is_empty() {
            result.push(Path::new(current));
        }
        result
    }

    /// Triangulated fill for a simple, closed, planar path.
    pub fn face_vertices(&self) -> Vec<Vertex> {
        let Some(plane) = self.plane() else {
            return Vec::new();
        };
        if !self.is_simple() {
            return Vec::new();
        }
        let pts = self.loop_positions();
        if pts.len() < 3 {
            return Vec::new();
        }
        let (u, v) = plane_basis(plane.normal);
        let proj = project_to_plane(&pts, pts[0], u, v);
        let triangles = if is_convex_2d(&proj) {
            fan_triangles(pts.len())
        } else {
            ear_clip(&proj)
        };

        let mut out = Vec::with_capacity(triangles.len() * 3);
        for [a, b, c] in triangles {
            for idx in [a, b, c] {
                out.push(Vertex::at(pts[idx]).with_normal(plane.normal));
            }
        }
        out
    }

    /// Side-wall vertex pairs for extrusion/lofting: one `(start, end)`
    /// pair per segment, with normals
    /// computed from each segment's tangent crossed with `sweep_direction`
    /// (the extrusion axis, or a lathe slice's tangential direction), and
    /// smoothed at `curve` joints versus duplicated (hard-edge) at `point`
    /// joints. The `v` texcoord is cumulative arc length normalized to
    /// `[0, 1]`.
    pub fn edge_vertices(&self, sweep_direction: Vector) -> Vec<(Vertex, Vertex)> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        let closed = self.is_closed();
        let segment_count = if closed { n - 1 } else { n - 1 };

        let mut lengths = vec![0.0; n];
        for i in 1..n {
            lengths[i] = lengths[i - 1] + self.points[i].position.distance(self.points[i - 1].position);
        }
        let total = lengths[n - 1].max(EPSILON);

        let tangent = |i: usize| -> Vector {
            let a = self.points[i].position;
            let b = self.points[(i + 1).min(n - 1)].position;
            (b - a).normalized()
        };

        let mut out = Vec::with_capacity(segment_count);
        for i in 0..segment_count {
            let a = self.points[i];
            let b = self.points[i + 1];
            let seg_normal = tangent(i).cross(sweep_direction).normalized();

            let normal_at = |pt: PathPoint, neighbor_tangent: Option<Vector>| -> Vector {
                match neighbor_tangent {
                    Some(other_tangent) if pt.is_curved => {
                        let other_normal = other_tangent.cross(sweep_direction).normalized();
                        (seg_normal + other_normal).normalized()
                    }
                    _ => seg_normal,
                }
            };

            let prev_tangent = if i > 0 { Some(tangent(i - 1)) } else { None };
            let next_tangent = if i + 2 < n { Some(tangent(i + 1)) } else { None };

            let va = Vertex::at(a.position)
                .with_normal(normal_at(a, prev_tangent))
                .with_texcoord(Vector::new(0.0, lengths[i] / total, 0.0));
            let vb = Vertex::at(b.position)
                .with_normal(normal_at(b, next_tangent))
                .with_texcoord(Vector::new(0.0, lengths[i + 1] / total, 0.0));
            out.push((va, vb));
        }
        out
    }

    /// Expands `curve` control points into `detail` quadratic-bezier
    /// sub-segments each, so that a smooth point actually bends the path
    /// instead of only flagging its joint for normal smoothing. An
    /// interior point `points[i]` with `is_curved` is treated as the
    /// off-curve control of a quadratic bezier anchored at its straight
    /// neighbors `points[i-1]`/`points[i+1]`; both of the raw segments it
    /// joins are replaced by `detail` sampled sub-segments apiece (`detail
    /// 4` on a single curve point between two plain points therefore
    /// yields `2 * 4 = 8` edges, matching the two raw segments it
    /// touches). Runs of consecutive curve points are walked one control
    /// point at a time against their immediate raw neighbors, which is
    /// only exact for isolated curve points but never panics or drops a
    /// point for longer runs. `point`-only paths are returned unchanged.
    pub fn subdivide_curves(&self, detail: u32) -> Path {
        let steps = detail.max(1) as usize;
        let pts = &self.points;
        if pts.len() < 3 {
            return self.clone();
        }
        let n = pts.len();
        let mut out = Vec::with_capacity(n * steps);
        out.push(pts[0]);
        let mut i = 0;
        while i < n - 1 {
            if pts[i + 1].is_curved && i + 2 < n {
                let (a, control, b) = (pts[i], pts[i + 1], pts[i + 2]);
                for k in 1..=(2 * steps) {
                    let t = k as f64 / (2 * steps) as f64;
                    let position = quadratic_bezier(a.position, control.position, b.position, t);
                    out.push(PathPoint { position, is_curved: true, color: control.color, texcoord: None });
                }
                i += 2;
            } else {
                out.push(pts[i + 1]);
                i += 1;
            }
        }
        Path::new(out)
    }

    /// Clips the path to the `x <= 0` half-space, used by the `lathe`
    /// builder before rotating around Y.
    pub fn clip_to_y_axis(&self) -> Path {
        let plane = Plane::new(Vector::X, 0.0);
        let mut out: Vec<PathPoint> = Vec::new();
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            out_push_clipped(&mut out, a, plane);
            if i + 1 < n {
                let b = self.points[i + 1];
                let da = a.position.distance_to_plane(&plane);
                let db = b.position.distance_to_plane(&plane);
                if (da > EPSILON && db < -EPSILON) || (da < -EPSILON && db > EPSILON) {
                    let t = da / (da - db);
                    let mut mid = a;
                    mid.position = a.position.lerp(b.position, t);
                    out.push(mid);
                }
            }
        }
        Path::new(out)
    }
}

/// De Casteljau evaluation of the quadratic bezier through `p0`, `p1`,
/// `p2` at parameter `t` — `p1` is an off-curve control, not a point the
/// curve passes through.
fn quadratic_bezier(p0: Vector, p1: Vector, p2: Vector, t: f64) -> Vector {
    p0.lerp(p1, t).lerp(p1.lerp(p2, t), t)
}

fn out_push_clipped(out: &mut Vec<PathPoint>, p: PathPoint, plane: Plane) {
    if p.position.distance_to_plane(&plane) <= EPSILON {
        out.push(p);
    }
}

fn fan_triangles(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

fn cross2(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn segments_cross(a0: (f64, f64), a1: (f64, f64), b0: (f64, f64), b1: (f64, f64)) -> bool {
    let d1 = cross2(b0, b1, a0);
    let d2 = cross2(b0, b1, a1);
    let d3 = cross2(a0, a1, b0);
    let d4 = cross2(a0, a1, b1);
    ((d1 > 0.0) != (d2 > 0.0)) && ((d3 > 0.0) != (d4 > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_path() -> Path {
        Path::new(vec![
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn closed_square_has_plane() {
        let p = square_path();
        assert!(p.is_closed());
        let plane = p.plane().unwrap();
        assert_eq!(plane.normal, Vector::Z);
    }

    #[test]
    fn open_path_has_no_plane() {
        let mut pts = square_path().points;
        pts.pop();
        let p = Path::new(pts);
        assert!(p.plane().is_none());
    }

    #[test]
    fn face_vertices_square_two_triangles() {
        let p = square_path();
        let verts = p.face_vertices();
        assert_eq!(verts.len(), 6);
    }

    #[test]
    fn edge_vertices_count_matches_segments() {
        let p = square_path();
        let edges = p.edge_vertices(Vector::Z);
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn subpaths_single_loop_is_one_subpath() {
        let p = square_path();
        assert_eq!(p.subpaths().len(), 1);
    }

    #[test]
    fn figure_eight_splits_into_two_subpaths() {
        let p = Path::new(vec![
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)), // touches start: closes a subpath
            PathPoint::sharp(Vector::new(-1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(0.0, 0.0, 0.0)),
        ]);
        assert_eq!(p.subpaths().len(), 2);
    }

    #[test]
    fn subdivide_curves_expands_both_flanking_segments() {
        let p = Path::new(vec![
            PathPoint::sharp(Vector::new(-1.0, 0.0, 0.0)),
            PathPoint::curved(Vector::new(0.0, 1.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 0.0, 0.0)),
        ]);
        let expanded = p.subdivide_curves(4);
        assert_eq!(expanded.points.len(), 9);
        let edges = expanded.edge_vertices(Vector::new(0.0, 0.0, 1.0));
        assert_eq!(edges.len(), 8);
        assert_eq!(expanded.points[0].position, Vector::new(-1.0, 0.0, 0.0));
        assert_eq!(expanded.points[8].position, Vector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn subdivide_curves_leaves_sharp_only_paths_unchanged() {
        let p = square_path();
        let expanded = p.subdivide_curves(8);
        assert_eq!(expanded, p);
    }

    #[test]
    fn clip_to_y_axis_drops_positive_x() {
        let p = Path::new(vec![
            PathPoint::sharp(Vector::new(-1.0, 0.0, 0.0)),
            PathPoint::sharp(Vector::new(1.0, 0.0, 0.0)),
        ]);
        let clipped = p.clip_to_y_axis();
        assert!(clipped.points.iter().all(|pt| pt.position.x <= EPSILON));
    }
}
