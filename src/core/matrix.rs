use serde::{Deserialize, Serialize};

use super::Vec2;

/// 2x3 affine matrix in canvas order.
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
///
/// A point maps to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[must_use]
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians; positive angles turn clockwise on a y-down canvas.
    #[must_use]
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    #[must_use]
    pub fn rotation_about(angle: f64, pivot: Vec2) -> Self {
        Self::translation(pivot.x, pivot.y)
            .multiply(&Self::rotation(angle))
            .multiply(&Self::translation(-pivot.x, -pivot.y))
    }

    #[must_use]
    pub fn scaling_about(sx: f64, sy: f64, pivot: Vec2) -> Self {
        Self::translation(pivot.x, pivot.y)
            .multiply(&Self::scaling(sx, sy))
            .multiply(&Self::translation(-pivot.x, -pivot.y))
    }

    /// Returns `self * rhs`: `rhs` is applied first, then `self`.
    #[must_use]
    pub fn multiply(&self, rhs: &Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, or `None` for singular (degenerate scale) matrices.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    #[must_use]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    /// Applies only the linear part (no translation).
    #[must_use]
    pub fn apply_vector(&self, vector: Vec2) -> Vec2 {
        Vec2::new(
            self.a * vector.x + self.c * vector.y,
            self.b * vector.x + self.d * vector.y,
        )
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Geometric mean of the axis scale factors, used to scale stroke widths.
    #[must_use]
    pub fn mean_scale(&self) -> f64 {
        self.determinant().abs().sqrt()
    }
}
