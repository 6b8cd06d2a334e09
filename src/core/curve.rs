//! Quadratic and cubic Bezier evaluation, root finding and projection.
//!
//! All functions operate on one coordinate axis at a time (`p0..p3` are the
//! control values along x or y) except the projection helpers, which work on
//! full 2D points.

use smallvec::SmallVec;

use super::Vec2;

/// Threshold for treating a coefficient as zero before dividing by it.
pub const EPSILON: f64 = 1e-4;
const EPSILON_NUMERIC: f64 = 1e-8;
const SQRT3: f64 = 1.732_050_807_568_877_2;

/// Parameter values in `[0, 1]` where a curve reaches a queried value.
pub type CurveRoots = SmallVec<[f64; 3]>;

#[inline]
#[must_use]
pub fn is_around_zero(value: f64) -> bool {
    value > -EPSILON && value < EPSILON
}

#[inline]
fn is_not_around_zero(value: f64) -> bool {
    value > EPSILON || value < -EPSILON
}

#[inline]
fn push_unit(roots: &mut CurveRoots, t: f64) {
    if (0.0..=1.0).contains(&t) {
        roots.push(t);
    }
}

#[must_use]
pub fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    onet * onet * (onet * p0 + 3.0 * t * p1) + t * t * (t * p3 + 3.0 * onet * p2)
}

#[must_use]
pub fn cubic_derivative_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    3.0 * (((p1 - p0) * onet + 2.0 * (p2 - p1) * t) * onet + (p3 - p2) * t * t)
}

/// Solves `cubic(t) == value` for `t` in `[0, 1]`.
///
/// Uses the Shengjin closed form; near-degenerate leading coefficients fall
/// back to the quadratic solution instead of dividing by ~0.
#[must_use]
pub fn cubic_root_at(p0: f64, p1: f64, p2: f64, p3: f64, value: f64) -> CurveRoots {
    let a = p3 + 3.0 * (p1 - p2) - p0;
    let b = 3.0 * (p2 - p1 * 2.0 + p0);
    let c = 3.0 * (p1 - p0);
    let d = p0 - value;

    let mut roots = CurveRoots::new();
    if is_around_zero(a) {
        solve_quadratic(b, c, d, &mut roots);
        return roots;
    }

    let big_a = b * b - 3.0 * a * c;
    let big_b = b * c - 9.0 * a * d;
    let big_c = c * c - 3.0 * b * d;

    if is_around_zero(big_a) && is_around_zero(big_b) {
        if is_around_zero(b) {
            roots.push(0.0);
        } else {
            push_unit(&mut roots, -c / b);
        }
        return roots;
    }

    let discriminant = big_b * big_b - 4.0 * big_a * big_c;
    if is_around_zero(discriminant) {
        let k = big_b / big_a;
        push_unit(&mut roots, -b / a + k);
        let t2 = -k / 2.0;
        if !roots.iter().any(|root| (root - t2).abs() < EPSILON_NUMERIC) {
            push_unit(&mut roots, t2);
        }
    } else if discriminant > 0.0 {
        let disc_sqrt = discriminant.sqrt();
        let y1 = (big_a * b + 1.5 * a * (-big_b + disc_sqrt)).cbrt();
        let y2 = (big_a * b + 1.5 * a * (-big_b - disc_sqrt)).cbrt();
        push_unit(&mut roots, (-b - (y1 + y2)) / (3.0 * a));
    } else {
        let t = ((2.0 * big_a * b - 3.0 * a * big_b) / (2.0 * (big_a * big_a * big_a).sqrt()))
            .clamp(-1.0, 1.0);
        let theta = t.acos() / 3.0;
        let a_sqrt = big_a.sqrt();
        let cos = theta.cos();
        let sin = theta.sin();
        push_unit(&mut roots, (-b - 2.0 * a_sqrt * cos) / (3.0 * a));
        push_unit(&mut roots, (-b + a_sqrt * (cos + SQRT3 * sin)) / (3.0 * a));
        push_unit(&mut roots, (-b + a_sqrt * (cos - SQRT3 * sin)) / (3.0 * a));
    }
    roots
}

/// Parameter values in `[0, 1]` where the cubic derivative vanishes.
#[must_use]
pub fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> CurveRoots {
    let b = 6.0 * p2 - 12.0 * p1 + 6.0 * p0;
    let a = 9.0 * p1 + 3.0 * p3 - 3.0 * p0 - 9.0 * p2;
    let c = 3.0 * p1 - 3.0 * p0;
    let mut extrema = CurveRoots::new();
    solve_quadratic(a, b, c, &mut extrema);
    extrema
}

/// Splits a cubic at `t`, returning the two halves' control values.
#[must_use]
pub fn cubic_subdivide(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> ([f64; 4], [f64; 4]) {
    let p01 = (p1 - p0) * t + p0;
    let p12 = (p2 - p1) * t + p1;
    let p23 = (p3 - p2) * t + p2;
    let p012 = (p12 - p01) * t + p01;
    let p123 = (p23 - p12) * t + p12;
    let p0123 = (p123 - p012) * t + p012;
    ([p0, p01, p012, p0123], [p0123, p123, p23, p3])
}

#[must_use]
pub fn quadratic_at(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    onet * (onet * p0 + 2.0 * t * p1) + t * t * p2
}

#[must_use]
pub fn quadratic_derivative_at(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    2.0 * ((1.0 - t) * (p1 - p0) + t * (p2 - p1))
}

/// Solves `quadratic(t) == value` for `t` in `[0, 1]`.
#[must_use]
pub fn quadratic_root_at(p0: f64, p1: f64, p2: f64, value: f64) -> CurveRoots {
    let a = p0 - 2.0 * p1 + p2;
    let b = 2.0 * (p1 - p0);
    let c = p0 - value;
    let mut roots = CurveRoots::new();
    solve_quadratic(a, b, c, &mut roots);
    roots
}

/// Parameter of the single quadratic extremum (may fall outside `[0, 1]`).
#[must_use]
pub fn quadratic_extremum(p0: f64, p1: f64, p2: f64) -> f64 {
    let divider = p0 + p2 - 2.0 * p1;
    if divider == 0.0 {
        0.5
    } else {
        (p0 - p1) / divider
    }
}

#[must_use]
pub fn quadratic_subdivide(p0: f64, p1: f64, p2: f64, t: f64) -> ([f64; 3], [f64; 3]) {
    let p01 = (p1 - p0) * t + p0;
    let p12 = (p2 - p1) * t + p1;
    let p012 = (p12 - p01) * t + p01;
    ([p0, p01, p012], [p012, p12, p2])
}

fn solve_quadratic(a: f64, b: f64, c: f64, roots: &mut CurveRoots) {
    if is_around_zero(a) {
        if is_not_around_zero(b) {
            push_unit(roots, -c / b);
        }
        return;
    }
    let discriminant = b * b - 4.0 * a * c;
    if is_around_zero(discriminant) {
        push_unit(roots, -b / (2.0 * a));
    } else if discriminant > 0.0 {
        let disc_sqrt = discriminant.sqrt();
        push_unit(roots, (-b + disc_sqrt) / (2.0 * a));
        push_unit(roots, (-b - disc_sqrt) / (2.0 * a));
    }
}

/// Closest point on a curve, found by coarse uniform sampling followed by an
/// interval-halving refinement around the best sample.
fn project_point<F>(eval: F, target: Vec2) -> (f64, Vec2)
where
    F: Fn(f64) -> Vec2,
{
    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    let mut step = 0.0;
    while step <= 1.0 {
        let d = eval(step).distance_squared(target);
        if d < best_d {
            best_t = step;
            best_d = d;
        }
        step += 0.05;
    }

    let mut interval = 0.005;
    for _ in 0..32 {
        if interval < EPSILON_NUMERIC {
            break;
        }
        let prev = best_t - interval;
        let next = best_t + interval;
        let d_prev = if prev >= 0.0 {
            eval(prev).distance_squared(target)
        } else {
            f64::INFINITY
        };
        let d_next = if next <= 1.0 {
            eval(next).distance_squared(target)
        } else {
            f64::INFINITY
        };
        if d_prev < best_d {
            best_t = prev;
            best_d = d_prev;
        } else if d_next < best_d {
            best_t = next;
            best_d = d_next;
        } else {
            interval *= 0.5;
        }
    }
    (best_d.sqrt(), eval(best_t))
}

/// Distance from `target` to a cubic curve and the closest point on it.
#[must_use]
pub fn cubic_project_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, target: Vec2) -> (f64, Vec2) {
    project_point(
        |t| {
            Vec2::new(
                cubic_at(p0.x, p1.x, p2.x, p3.x, t),
                cubic_at(p0.y, p1.y, p2.y, p3.y, t),
            )
        },
        target,
    )
}

/// Distance from `target` to a quadratic curve and the closest point on it.
#[must_use]
pub fn quadratic_project_point(p0: Vec2, p1: Vec2, p2: Vec2, target: Vec2) -> (f64, Vec2) {
    project_point(
        |t| {
            Vec2::new(
                quadratic_at(p0.x, p1.x, p2.x, t),
                quadratic_at(p0.y, p1.y, p2.y, t),
            )
        },
        target,
    )
}

/// Rough arc length of a cubic from its control polygon and chord.
#[must_use]
pub fn cubic_length_estimate(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> f64 {
    let polygon = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);
    (polygon + p0.distance(p3)) * 0.5
}
