//! Per-vertex attributes.

use crate::color::Color;
use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector,
    pub normal: Vector,
    /// Texture coordinates packed as `(u, v, 0)`.
    pub texcoord: Vector,
    pub color: Option<Color>,
}

impl Vertex {
    pub fn new(position: Vector, normal: Vector, texcoord: Vector, color: Option<Color>) -> Self {
        Self { position, normal, texcoord, color }
    }

    pub fn at(position: Vector) -> Self {
        Self {
            position,
            normal: Vector::ZERO,
            texcoord: Vector::ZERO,
            color: None,
        }
    }

    pub fn with_normal(mut self, normal: Vector) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_texcoord(mut self, uv: Vector) -> Self {
        self.texcoord = uv;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// A vertex with a zero normal asks its owning polygon to fill it in
    /// from the polygon's plane.
    pub fn needs_normal_recompute(&self) -> bool {
        self.normal == Vector::ZERO
    }

    pub fn flipped(self, normal_override: Option<Vector>) -> Vertex {
        Vertex {
            normal: normal_override.unwrap_or(-self.normal),
            ..self
        }
    }

    pub fn lerp(self, other: Vertex, t: f64) -> Vertex {
        Vertex {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t).normalized(),
            texcoord: self.texcoord.lerp(other.texcoord, t),
            color: match (self.color, other.color) {
                (Some(a), Some(b)) => Some(a.lerp(b, t)),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_midpoint() {
        let a = Vertex::at(Vector::ZERO).with_normal(Vector::Z);
        let b = Vertex::at(Vector::new(2.0, 0.0, 0.0)).with_normal(Vector::Z);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid.position, Vector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn zero_normal_needs_recompute() {
        assert!(Vertex::at(Vector::ZERO).needs_normal_recompute());
    }
}
