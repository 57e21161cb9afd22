//! 3D convex hull, QuickHull (Barber/Dobkin/Huhdanpaa) implementation.

use std::collections::{HashMap, HashSet};

use config::constants::EPSILON;

use crate::error::{GeometryError, KResult};
use crate::mesh::Mesh;
use crate::polygon::Polygon;
use crate::vector::Vector;
use crate::vertex::Vertex;

#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: Vector,
    distance: f64,
    outside_points: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[Vector]) -> Self {
        let (p0, p1, p2) = (points[v0], points[v1], points[v2]);
        let normal = (p1 - p0).cross(p2 - p0).normalized();
        let distance = normal.dot(p0);
        Self { vertices: [v0, v1, v2], normal, distance, outside_points: Vec::new() }
    }

    fn signed_distance(&self, point: Vector) -> f64 {
        self.normal.dot(point) - self.distance
    }

    fn is_outside(&self, point: Vector) -> bool {
        self.signed_distance(point) > EPSILON
    }

    fn farthest_point(&self, points: &[Vector]) -> Option<usize> {
        self.outside_points
            .iter()
            .max_by(|&&a, &&b| {
                self.signed_distance(points[a])
                    .partial_cmp(&self.signed_distance(points[b]))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }
}

fn remove_duplicates(points: &[Vector]) -> Vec<Vector> {
    let mut unique = Vec::with_capacity(points.len());
    for &p in points {
        if !unique.iter().any(|&u: &Vector| u.distance(p) < EPSILON) {
            unique.push(p);
        }
    }
    unique
}

fn create_face_outward(v0: usize, v1: usize, v2: usize, centroid: Vector, points: &[Vector]) -> HullFace {
    let face = HullFace::new(v0, v1, v2, points);
    let face_center = (points[v0] + points[v1] + points[v2]) * (1.0 / 3.0);
    if face.normal.dot(centroid - face_center) > 0.0 {
        HullFace::new(v0, v2, v1, points)
    } else {
        face
    }
}

fn find_farthest_pair(indices: &[usize], points: &[Vector]) -> (usize, usize) {
    let mut best = (indices[0], indices[1]);
    let mut max_dist = 0.0;
    for (i, &a) in indices.iter().enumerate() {
        for &b in indices.iter().skip(i + 1) {
            let dist = points[a].distance(points[b]);
            if dist > max_dist {
                max_dist = dist;
                best = (a, b);
            }
        }
    }
    best
}

fn find_farthest_from_line(p0: usize, p1: usize, points: &[Vector]) -> Option<usize> {
    let dir = (points[p1] - points[p0]).normalized();
    let mut best = None;
    let mut max_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        if i == p0 || i == p1 {
            continue;
        }
        let v = p - points[p0];
        let proj = dir * v.dot(dir);
        let dist = (v - proj).length();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }
    best
}

fn find_farthest_from_plane(p0: usize, p1: usize, p2: usize, points: &[Vector]) -> Option<usize> {
    let normal = (points[p1] - points[p0]).cross(points[p2] - points[p0]).normalized();
    let mut best = None;
    let mut max_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        if i == p0 || i == p1 || i == p2 {
            continue;
        }
        let dist = normal.dot(p - points[p0]).abs();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }
    best
}

fn build_initial_simplex(points: &[Vector]) -> Option<(Vec<HullFace>, Vec<usize>)> {
    let mut min_x = 0;
    let mut max_x = 0;
    let mut min_y = 0;
    let mut max_y = 0;
    let mut min_z = 0;
    let mut max_z = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x < points[min_x].x {
            min_x = i;
        }
        if p.x > points[max_x].x {
            max_x = i;
        }
        if p.y < points[min_y].y {
            min_y = i;
        }
        if p.y > points[max_y].y {
            max_y = i;
        }
        if p.z < points[min_z].z {
            min_z = i;
        }
        if p.z > points[max_z].z {
            max_z = i;
        }
    }
    let extremes = [min_x, max_x, min_y, max_y, min_z, max_z];
    let (p0, p1) = find_farthest_pair(&extremes, points);
    let p2 = find_farthest_from_line(p0, p1, points)?;
    let p3 = find_farthest_from_plane(p0, p1, p2, points)?;

    let centroid = (points[p0] + points[p1] + points[p2] + points[p3]) * 0.25;
    let mut faces = vec![
        create_face_outward(p0, p1, p2, centroid, points),
        create_face_outward(p0, p2, p3, centroid, points),
        create_face_outward(p0, p3, p1, centroid, points),
        create_face_outward(p1, p3, p2, centroid, points),
    ];

    let used: HashSet<usize> = [p0, p1, p2, p3].into_iter().collect();
    let remaining: Vec<usize> = (0..points.len()).filter(|i| !used.contains(i)).collect();
    for &idx in &remaining {
        let point = points[idx];
        for face in &mut faces {
            if face.is_outside(point) {
                face.outside_points.push(idx);
                break;
            }
        }
    }
    Some((faces, remaining))
}

fn find_horizon_edges(faces: &[HullFace], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
    for &idx in visible {
        let v = faces[idx].vertices;
        for (a, b) in [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(key).or_insert(0) += 1;
        }
    }
    let mut horizon = Vec::new();
    for &idx in visible {
        let v = faces[idx].vertices;
        for (a, b) in [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            if edge_count[&key] == 1 {
                horizon.push((a, b));
            }
        }
    }
    horizon
}

fn compute_centroid(faces: &[HullFace], points: &[Vector]) -> Vector {
    let mut sum = Vector::ZERO;
    let mut count = 0;
    let mut seen: HashSet<usize> = HashSet::new();
    for face in faces {
        for &v in &face.vertices {
            if seen.insert(v) {
                sum = sum + points[v];
                count += 1;
            }
        }
    }
    if count > 0 {
        sum * (1.0 / count as f64)
    } else {
        Vector::ZERO
    }
}

fn quickhull_iterate(mut faces: Vec<HullFace>, points: &[Vector]) -> Vec<HullFace> {
    let max_iterations = points.len() * 2 + 16;
    let mut iteration = 0;
    loop {
        iteration += 1;
        if iteration > max_iterations {
            break;
        }
        let Some(face_idx) = faces.iter().position(|f| !f.outside_points.is_empty()) else {
            break;
        };
        let Some(farthest) = faces[face_idx].farthest_point(points) else {
            continue;
        };
        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_outside(points[farthest]))
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            continue;
        }
        let horizon = find_horizon_edges(&faces, &visible);

        let mut reassign: Vec<usize> = Vec::new();
        for &idx in &visible {
            reassign.extend(&faces[idx].outside_points);
        }
        reassign.retain(|&p| p != farthest);

        let mut visible_sorted = visible.clone();
        visible_sorted.sort_by(|a, b| b.cmp(a));
        for idx in visible_sorted {
            faces.swap_remove(idx);
        }

        let centroid = compute_centroid(&faces, points);
        for (e0, e1) in horizon {
            faces.push(create_face_outward(e0, e1, farthest, centroid, points));
        }

        for &idx in &reassign {
            let point = points[idx];
            for face in &mut faces {
                if face.is_outside(point) {
                    face.outside_points.push(idx);
                    break;
                }
            }
        }
    }
    faces
}

fn faces_to_mesh(faces: &[HullFace], points: &[Vector]) -> Mesh {
    let polys: Vec<Polygon> = faces
        .iter()
        .map(|f| {
            let verts = f.vertices.map(|i| Vertex::at(points[i]).with_normal(f.normal)).to_vec();
            Polygon::from_convex_loop(verts, crate::plane::Plane::new(f.normal, f.distance), None, crate::polygon::next_polygon_id())
        })
        .collect();
    Mesh::with_known_convexity(polys, Some(true))
}

/// Degenerate flat-fan hull for &le;3 non-collinear points.
fn flat_fan(points: &[Vector]) -> KResult<Mesh> {
    let verts: Vec<Vertex> = points.iter().map(|&p| Vertex::at(p)).collect();
    let front = Polygon::build(verts.clone(), None);
    if front.is_empty() {
        return Err(GeometryError::HullDegenerate);
    }
    let mut polys = front.clone();
    polys.extend(front.iter().map(Polygon::flip));
    Ok(Mesh::with_known_convexity(polys, Some(true)))
}

/// Convex hull of `points`: a full 3D QuickHull for
/// &ge;4 non-coplanar points, or a double-sided flat fan for smaller or
/// coplanar input.
pub fn hull(points: &[Vector]) -> KResult<Mesh> {
    if points.len() < 3 {
        return Err(GeometryError::HullDegenerate);
    }
    let unique = remove_duplicates(points);
    if unique.len() < 4 {
        return flat_fan(&unique);
    }
    match build_initial_simplex(&unique) {
        Some((faces, _remaining)) => {
            let faces = quickhull_iterate(faces, &unique);
            Ok(faces_to_mesh(&faces, &unique))
        }
        None => flat_fan(&unique),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_hull() {
        let points = vec![
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.5, 1.0, 0.0),
            Vector::new(0.5, 0.5, 1.0),
        ];
        let mesh = hull(&points).unwrap();
        assert_eq!(mesh.polygon_count(), 4);
        assert!(mesh.is_convex());
    }

    #[test]
    fn cube_vertices_hull() {
        let points = vec![
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(1.0, 0.0, 1.0),
            Vector::new(1.0, 1.0, 1.0),
            Vector::new(0.0, 1.0, 1.0),
        ];
        let mesh = hull(&points).unwrap();
        assert_eq!(mesh.polygon_count(), 12);
    }

    #[test]
    fn interior_point_does_not_grow_hull() {
        let mut points = vec![
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(1.0, 0.0, 1.0),
            Vector::new(1.0, 1.0, 1.0),
            Vector::new(0.0, 1.0, 1.0),
        ];
        points.push(Vector::new(0.5, 0.5, 0.5));
        let mesh = hull(&points).unwrap();
        assert_eq!(mesh.polygon_count(), 12);
    }

    #[test]
    fn three_points_give_flat_fan() {
        let points = vec![
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
        ];
        let mesh = hull(&points).unwrap();
        assert_eq!(mesh.polygon_count(), 2);
    }

    #[test]
    fn two_points_is_degenerate() {
        let points = vec![Vector::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0)];
        assert!(hull(&points).is_err());
    }
}
