//! Orientation value.
//!
//! Scripts express rotations as a vector of Euler angles in radians
//! (`rotate x y z`); internally this is stored as a quaternion so repeated
//! composition doesn't accumulate gimbal-lock error.

use glam::{DMat3, DQuat};

use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    quat: DQuat,
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation { quat: DQuat::IDENTITY };

    /// Builds a rotation from Euler angles in radians, applied in x, then
    /// y, then z order — the order the `rotate` command composes axis
    /// rotations in.
    pub fn from_euler_radians(x: f64, y: f64, z: f64) -> Self {
        let qx = DQuat::from_rotation_x(x);
        let qy = DQuat::from_rotation_y(y);
        let qz = DQuat::from_rotation_z(z);
        Self { quat: (qz * qy * qx).normalize() }
    }

    pub fn from_axis_angle(axis: Vector, angle_radians: f64) -> Self {
        Self {
            quat: DQuat::from_axis_angle(axis.normalized().to_glam(), angle_radians),
        }
    }

    pub fn compose(self, other: Rotation) -> Rotation {
        Rotation { quat: (other.quat * self.quat).normalize() }
    }

    pub fn apply(self, v: Vector) -> Vector {
        Vector::from_glam(self.quat * v.to_glam())
    }

    pub fn inverse(self) -> Rotation {
        Rotation { quat: self.quat.inverse() }
    }

    pub fn to_mat3(self) -> DMat3 {
        DMat3::from_quat(self.quat)
    }

    /// Inverse of `from_euler_radians`'s x-then-y-then-z composition, for
    /// call sites (camera/light `orientation`) that report a rotation back
    /// to script-visible Euler angles rather than consuming it directly.
    pub fn to_euler_radians(self) -> Vector {
        let (x, y, z) = self.quat.to_euler(glam::EulerRot::XYZ);
        Vector::new(x, y, z)
    }

    pub fn is_identity(self) -> bool {
        self.quat.abs_diff_eq(DQuat::IDENTITY, 1e-9)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotate_x_about_z_gives_y() {
        let r = Rotation::from_euler_radians(0.0, 0.0, FRAC_PI_2);
        let v = r.apply(Vector::X);
        assert_eq!(v, Vector::Y);
    }

    #[test]
    fn identity_is_noop() {
        assert_eq!(Rotation::IDENTITY.apply(Vector::new(1.0, 2.0, 3.0)), Vector::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn inverse_undoes_rotation() {
        let r = Rotation::from_euler_radians(0.3, 0.7, -0.2);
        let v = Vector::new(1.0, 2.0, 3.0);
        let back = r.inverse().apply(r.apply(v));
        assert_eq!(back, v);
    }
}
