//! Combined translate/rotate/scale transform; the `translate`, `rotate`
//! and `scale` commands compose these per scope.

use crate::plane::Plane;
use crate::rotation::Rotation;
use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector,
    pub rotation: Rotation,
    pub scale: Vector,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vector { x: 0.0, y: 0.0, z: 0.0 },
        rotation: Rotation::IDENTITY,
        scale: Vector { x: 1.0, y: 1.0, z: 1.0 },
    };

    pub fn translation(v: Vector) -> Self {
        Transform { translation: v, ..Transform::IDENTITY }
    }

    pub fn rotation(r: Rotation) -> Self {
        Transform { rotation: r, ..Transform::IDENTITY }
    }

    pub fn scaling(v: Vector) -> Self {
        Transform { scale: v, ..Transform::IDENTITY }
    }

    /// Applies this transform to a point: scale, then rotate, then
    /// translate — the same order child transforms compose in.
    pub fn apply_point(&self, p: Vector) -> Vector {
        let scaled = Vector::new(p.x * self.scale.x, p.y * self.scale.y, p.z * self.scale.z);
        self.rotation.apply(scaled) + self.translation
    }

    /// Applies this transform to a direction (normal): scale by the
    /// reciprocal on each axis then rotate, skipping translation.
    pub fn apply_normal(&self, n: Vector) -> Vector {
        let inv_scale = Vector::new(
            if self.scale.x.abs() > 0.0 { 1.0 / self.scale.x } else { 0.0 },
            if self.scale.y.abs() > 0.0 { 1.0 / self.scale.y } else { 0.0 },
            if self.scale.z.abs() > 0.0 { 1.0 / self.scale.z } else { 0.0 },
        );
        let scaled = Vector::new(n.x * inv_scale.x, n.y * inv_scale.y, n.z * inv_scale.z);
        self.rotation.apply(scaled).normalized()
    }

    pub fn apply_plane(&self, plane: &Plane) -> Plane {
        let normal = self.apply_normal(plane.normal);
        let point_on_plane = self.apply_point(plane.normal * plane.w);
        Plane::new(normal, normal.dot(point_on_plane))
    }

    /// Composes `self` as the parent and `child` as a further, nested
    /// transform, matching the scope-stack "current transform" chaining
    /// of an evaluator scope's current transform.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.apply_point(child.translation),
            rotation: self.rotation.compose(child.rotation),
            scale: Vector::new(
                self.scale.x * child.scale.x,
                self.scale.y * child.scale.y,
                self.scale.z * child.scale.z,
            ),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.translation == Vector::ZERO && self.rotation.is_identity() && self.scale == Vector::splat(1.0)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_moves_point() {
        let t = Transform::translation(Vector::new(1.0, 2.0, 3.0));
        assert_eq!(t.apply_point(Vector::ZERO), Vector::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn scale_then_translate() {
        let t = Transform {
            translation: Vector::new(10.0, 0.0, 0.0),
            scale: Vector::splat(2.0),
            ..Transform::IDENTITY
        };
        assert_eq!(t.apply_point(Vector::new(1.0, 0.0, 0.0)), Vector::new(12.0, 0.0, 0.0));
    }

    #[test]
    fn identity_composition() {
        let t = Transform::translation(Vector::X);
        let composed = Transform::IDENTITY.then(&t);
        assert_eq!(composed, t);
    }
}
