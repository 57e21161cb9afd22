//! Binary space partition tree.

use config::constants::{BSP_PLANE_SAMPLE_LIMIT, BSP_SPLIT_PENALTY, EPSILON};

use crate::error::{check_cancelled, Cancel, KResult};
use crate::plane::{Plane, PolygonSide};
use crate::polygon::Polygon;
use crate::vector::Vector;

/// A node in the BSP tree. An empty tree is represented by `plane: None`
/// with no children and no coplanar polygons.
#[derive(Debug, Clone)]
pub struct BspNode {
    pub plane: Option<Plane>,
    pub coplanar: Vec<Polygon>,
    pub front: Option<Box<BspNode>>,
    pub back: Option<Box<BspNode>>,
}

impl BspNode {
    pub fn empty() -> Self {
        BspNode { plane: None, coplanar: Vec::new(), front: None, back: None }
    }

    pub fn is_empty(&self) -> bool {
        self.plane.is_none()
    }

    /// Builds a BSP tree from `polygons`.
    pub fn build(polygons: Vec<Polygon>, cancel: Cancel) -> KResult<BspNode> {
        if polygons.is_empty() {
            return Ok(BspNode::empty());
        }
        check_cancelled(cancel)?;

        let plane = choose_split_plane(&polygons);
        let mut coplanar = Vec::new();
        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for poly in polygons {
            match poly.classify(&plane) {
                PolygonSide::CoplanarFront | PolygonSide::CoplanarBack => coplanar.push(poly),
                PolygonSide::Front => front_list.push(poly),
                PolygonSide::Back => back_list.push(poly),
                PolygonSide::Spanning => {
                    let (front, back) = poly.split_spanning(&plane);
                    if let Some(f) = front {
                        front_list.push(f);
                    }
                    if let Some(b) = back {
                        back_list.push(b);
                    }
                }
            }
        }

        let front = if front_list.is_empty() {
            None
        } else {
            Some(Box::new(BspNode::build(front_list, cancel)?))
        };
        let back = if back_list.is_empty() {
            None
        } else {
            Some(Box::new(BspNode::build(back_list, cancel)?))
        };

        Ok(BspNode { plane: Some(plane), coplanar, front, back })
    }

    /// Inverts the solid this tree represents: flips every plane and
    /// coplanar polygon, and swaps front/back children.
    pub fn invert(&mut self) {
        if let Some(plane) = &mut self.plane {
            *plane = plane.flip();
        }
        for poly in &mut self.coplanar {
            *poly = poly.flip();
        }
        std::mem::swap(&mut self.front, &mut self.back);
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
    }

    /// Clips `polygons` against this tree: pieces
    /// inside the solid this tree represents are discarded, pieces
    /// outside survive. Coplanar pieces are routed by the sign of
    /// `self.plane.normal · poly.plane.normal`; true ties (near-zero dot,
    /// only reachable through numerical degeneracy) fall back to
    /// `keep_coplanar_front` plus polygon-id parity so that identical
    /// coplanar fragments from two operands cancel deterministically.
    pub fn clip(&self, polygons: Vec<Polygon>, keep_coplanar_front: bool, cancel: Cancel) -> KResult<Vec<Polygon>> {
        let Some(plane) = self.plane else {
            return Ok(polygons);
        };

        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for poly in polygons {
            check_cancelled(cancel)?;
            match poly.classify(&plane) {
                PolygonSide::Front => front_list.push(poly),
                PolygonSide::Back => back_list.push(poly),
                PolygonSide::Spanning => {
                    let (front, back) = poly.split_spanning(&plane);
                    if let Some(f) = front {
                        front_list.push(f);
                    }
                    if let Some(b) = back {
                        back_list.push(b);
                    }
                }
                PolygonSide::CoplanarFront | PolygonSide::CoplanarBack => {
                    let dot = poly.plane.normal.dot(plane.normal);
                    let goes_front = if dot.abs() < EPSILON {
                        keep_coplanar_front == (poly.id % 2 == 0)
                    } else {
                        dot > 0.0
                    };
                    if goes_front {
                        front_list.push(poly);
                    } else {
                        back_list.push(poly);
                    }
                }
            }
        }

        let front_result = match &self.front {
            Some(node) => node.clip(front_list, keep_coplanar_front, cancel)?,
            None => front_list,
        };
        let back_result = match &self.back {
            Some(node) => node.clip(back_list, keep_coplanar_front, cancel)?,
            None => Vec::new(),
        };

        let mut out = front_result;
        out.extend(back_result);
        Ok(out)
    }

    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.coplanar.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    /// Point-in-solid test: descend by signed distance; a point in
    /// the back half-space at a leaf with no back child is inside the
    /// solid.
    pub fn contains_point(&self, p: Vector) -> bool {
        let Some(plane) = self.plane else {
            return false;
        };
        let d = plane.signed_distance(p);
        if d > EPSILON {
            self.front.as_ref().is_some_and(|n| n.contains_point(p))
        } else if d < -EPSILON {
            self.back.as_ref().map_or(true, |n| n.contains_point(p))
        } else {
            true
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.coplanar.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }
}

/// Scores candidate planes by `|frontCount - backCount| + K * splitCount`
/// over a bounded sample of the input polygons' own planes,
/// keeping construction near-linear on large inputs.
fn choose_split_plane(polygons: &[Polygon]) -> Plane {
    if polygons.len() == 1 {
        return polygons[0].plane;
    }

    let step = (polygons.len() / BSP_PLANE_SAMPLE_LIMIT).max(1);
    let candidates: Vec<Plane> = polygons.iter().step_by(step).map(|p| p.plane).collect();

    let mut best = candidates[0];
    let mut best_score = f64::INFINITY;

    for &plane in &candidates {
        let mut front = 0i64;
        let mut back = 0i64;
        let mut splits = 0i64;
        for poly in polygons {
            match poly.classify(&plane) {
                PolygonSide::Front => front += 1,
                PolygonSide::Back => back += 1,
                PolygonSide::CoplanarFront | PolygonSide::CoplanarBack => {}
                PolygonSide::Spanning => splits += 1,
            }
        }
        let score = (front - back).unsigned_abs() as f64 + BSP_SPLIT_PENALTY * splits as f64;
        if score < best_score {
            best_score = score;
            best = plane;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Vertex;

    fn square(z: f64) -> Polygon {
        let verts = vec![
            Vertex::at(Vector::new(-1.0, -1.0, z)),
            Vertex::at(Vector::new(1.0, -1.0, z)),
            Vertex::at(Vector::new(1.0, 1.0, z)),
            Vertex::at(Vector::new(-1.0, 1.0, z)),
        ];
        Polygon::build(verts, None).remove(0)
    }

    const NO_CANCEL: Cancel = &|| false;

    #[test]
    fn build_single_polygon() {
        let tree = BspNode::build(vec![square(0.0)], NO_CANCEL).unwrap();
        assert_eq!(tree.polygon_count(), 1);
    }

    #[test]
    fn clip_keeps_front_polygon() {
        let tree = BspNode::build(vec![square(0.0)], NO_CANCEL).unwrap();
        let result = tree.clip(vec![square(1.0)], false, NO_CANCEL).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn clip_discards_back_polygon() {
        let tree = BspNode::build(vec![square(0.0)], NO_CANCEL).unwrap();
        let result = tree.clip(vec![square(-1.0)], false, NO_CANCEL).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn invert_flips_normals() {
        let mut tree = BspNode::build(vec![square(0.0)], NO_CANCEL).unwrap();
        let before = tree.coplanar[0].plane.normal;
        tree.invert();
        assert_eq!(tree.coplanar[0].plane.normal, -before);
    }

    #[test]
    fn contains_point_inside_convex_box() {
        // Build a degenerate single-plane tree: only the top face, so
        // "contains" means "below the plane" (no front child, has no back
        // child either — so purely based on plane side).
        let tree = BspNode::build(vec![square(1.0)], NO_CANCEL).unwrap();
        assert!(tree.contains_point(Vector::new(0.0, 0.0, 0.0)));
        assert!(!tree.contains_point(Vector::new(0.0, 0.0, 2.0)));
    }
}
