//! Polyline smoothing: Catmull-Rom resampling and constrained Bezier control
//! points.

use serde::{Deserialize, Serialize};

use super::{Rect, Vec2};

/// Sample spacing, in scene units, for spline resampling.
const SPLINE_SAMPLE_SPACING: f64 = 5.0;

/// Smoothing mode for polylines and polygons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Smoothing {
    #[default]
    None,
    /// Catmull-Rom spline through every point.
    Spline,
    /// Bezier segments with control points pulled towards neighbours by the
    /// given factor (0..=1).
    Bezier(f64),
}

fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64, t2: f64, t3: f64) -> f64 {
    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    (2.0 * (p1 - p2) + v0 + v1) * t3 + (-3.0 * (p1 - p2) - 2.0 * v0 - v1) * t2 + v0 * t + p1
}

/// Resamples `points` along a Catmull-Rom spline, roughly every few units and
/// never with fewer samples than input points.
#[must_use]
pub fn smooth_spline(points: &[Vec2], is_loop: bool) -> Vec<Vec2> {
    let len = points.len();
    if len < 2 {
        return points.to_vec();
    }
    let distance: f64 = points.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
    let segments = ((distance / SPLINE_SAMPLE_SPACING).ceil() as usize).max(len);
    let span = if is_loop { len } else { len - 1 } as f64;

    let mut out = Vec::with_capacity(segments);
    for i in 0..segments {
        let pos = i as f64 / (segments - 1) as f64 * span;
        let idx = pos.floor() as usize;
        let w = pos - idx as f64;

        let (p0, p1, p2, p3) = if is_loop {
            (
                points[(idx + len - 1) % len],
                points[idx % len],
                points[(idx + 1) % len],
                points[(idx + 2) % len],
            )
        } else {
            let idx = idx.min(len - 1);
            (
                points[idx.saturating_sub(1)],
                points[idx],
                points[(idx + 1).min(len - 1)],
                points[(idx + 2).min(len - 1)],
            )
        };
        let w2 = w * w;
        let w3 = w2 * w;
        out.push(Vec2::new(
            catmull_rom(p0.x, p1.x, p2.x, p3.x, w, w2, w3),
            catmull_rom(p0.y, p1.y, p2.y, p3.y, w, w2, w3),
        ));
    }
    out
}

/// Control points for a Bezier-smoothed polyline.
///
/// Returns two control points per segment (`2 * (n - 1)` for open lines,
/// `2 * n` for loops). With `constraint`, control points are clamped to the
/// union of the points' bounds and that rectangle so curves cannot overshoot.
#[must_use]
pub fn smooth_bezier(
    points: &[Vec2],
    smooth: f64,
    is_loop: bool,
    constraint: Option<Rect>,
) -> Vec<Vec2> {
    let len = points.len();
    if len < 2 {
        return Vec::new();
    }
    let clamp_box = constraint.and_then(|extra| {
        Rect::from_points(points.iter().copied()).map(|bounds| bounds.union(&extra))
    });
    let clamp = |point: Vec2| match clamp_box {
        Some(bounds) => point.max(bounds.min()).min(bounds.max()),
        None => point,
    };

    let mut controls = Vec::with_capacity(len * 2);
    for i in 0..len {
        let point = points[i];
        let (prev, next) = if is_loop {
            (points[if i == 0 { len - 1 } else { i - 1 }], points[(i + 1) % len])
        } else if i == 0 || i == len - 1 {
            controls.push(point);
            continue;
        } else {
            (points[i - 1], points[i + 1])
        };

        let direction = (next - prev) * smooth;
        let mut d0 = point.distance(prev);
        let mut d1 = point.distance(next);
        let sum = d0 + d1;
        if sum != 0.0 {
            d0 /= sum;
            d1 /= sum;
        }
        controls.push(clamp(point + direction * -d0));
        controls.push(clamp(point + direction * d1));
    }
    if is_loop {
        controls.rotate_left(1);
    }
    controls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_passes_through_endpoints() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 40.0),
            Vec2::new(100.0, 0.0),
        ];
        let smoothed = smooth_spline(&points, false);
        assert!(smoothed.len() >= points.len());
        assert!(smoothed[0].distance(points[0]) < 1e-9);
        assert!(smoothed[smoothed.len() - 1].distance(points[2]) < 1e-9);
    }

    #[test]
    fn bezier_controls_have_two_per_segment() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(30.0, 10.0),
        ];
        assert_eq!(smooth_bezier(&points, 0.5, false, None).len(), 6);
        assert_eq!(smooth_bezier(&points, 0.5, true, None).len(), 8);
    }

    #[test]
    fn constrained_controls_stay_in_bounds() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(30.0, 0.0),
        ];
        let constraint = Rect::new(0.0, 0.0, 30.0, 10.0);
        for control in smooth_bezier(&points, 1.0, false, Some(constraint)) {
            assert!(constraint.contains(control.x, control.y), "{control:?}");
        }
    }
}
