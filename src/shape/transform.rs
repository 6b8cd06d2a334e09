use serde::{Deserialize, Serialize};

use crate::core::{Matrix, Vec2};

/// Decomposed local transform: scale about `scale_origin`, then rotate about
/// `rotation_origin`, then translate by `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Radians, clockwise on a y-down canvas.
    pub rotation: f64,
    pub rotation_origin: Vec2,
    pub scale: Vec2,
    pub scale_origin: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            rotation_origin: Vec2::ZERO,
            scale: Vec2::ONE,
            scale_origin: Vec2::ZERO,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.position == Vec2::ZERO && self.rotation == 0.0 && self.scale == Vec2::ONE
    }

    #[must_use]
    pub fn matrix(&self) -> Matrix {
        if self.is_identity() {
            return Matrix::IDENTITY;
        }
        let mut matrix = Matrix::translation(self.position.x, self.position.y);
        if self.rotation != 0.0 {
            matrix = matrix.multiply(&Matrix::rotation_about(self.rotation, self.rotation_origin));
        }
        if self.scale != Vec2::ONE {
            matrix = matrix.multiply(&Matrix::scaling_about(
                self.scale.x,
                self.scale.y,
                self.scale_origin,
            ));
        }
        matrix
    }
}

/// Capability shared by shapes and groups.
pub trait Transformable {
    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    fn local_matrix(&self) -> Matrix {
        self.transform().matrix()
    }

    /// Moves the element by a delta expressed in its parent's coordinates.
    fn drift(&mut self, dx: f64, dy: f64) {
        self.transform_mut().position += Vec2::new(dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::Transform;
    use crate::core::Vec2;

    #[test]
    fn composes_scale_rotation_translation() {
        let transform = Transform {
            position: Vec2::new(100.0, 0.0),
            rotation: FRAC_PI_2,
            scale: Vec2::new(2.0, 2.0),
            ..Transform::default()
        };
        let mapped = transform.matrix().apply(Vec2::new(1.0, 0.0));
        assert!(mapped.distance(Vec2::new(100.0, 2.0)) < 1e-9);
    }
}
