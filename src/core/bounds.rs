use serde::{Deserialize, Serialize};

use super::{Matrix, Vec2};

/// Axis-aligned rectangle with a non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Builds a rectangle, normalising negative width/height.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 {
            (x + width, -width)
        } else {
            (x, width)
        };
        let (y, height) = if height < 0.0 {
            (y + height, -height)
        } else {
            (y, height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Smallest rectangle containing every point; `None` for an empty input.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), point| {
            (min.min(point), max.max(point))
        });
        Some(Self::from_min_max(min, max))
    }

    #[must_use]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[must_use]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    #[must_use]
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Axis-aligned bounds of this rectangle after an affine transform.
    #[must_use]
    pub fn transform(&self, matrix: &Matrix) -> Self {
        let min = self.min();
        let max = self.max();
        let corners = [
            matrix.apply(min),
            matrix.apply(Vec2::new(max.x, min.y)),
            matrix.apply(max),
            matrix.apply(Vec2::new(min.x, max.y)),
        ];
        Self::from_points(corners).unwrap_or(Self::EMPTY)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;
    use crate::core::{Matrix, Vec2};

    #[test]
    fn negative_extent_is_normalised() {
        let rect = Rect::new(10.0, 10.0, -4.0, -6.0);
        assert_eq!(rect, Rect::new(6.0, 4.0, 4.0, 6.0));
        assert!(rect.contains(8.0, 5.0));
    }

    #[test]
    fn transformed_bounds_cover_rotated_rectangle() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rotated = rect.transform(&Matrix::rotation_about(
            std::f64::consts::FRAC_PI_4,
            Vec2::new(5.0, 5.0),
        ));
        let half_diagonal = 50.0_f64.sqrt();
        assert!((rotated.width - half_diagonal * 2.0).abs() <= 1e-9);
        assert!(rotated.contains(5.0 - half_diagonal + 1e-6, 5.0));
    }
}
