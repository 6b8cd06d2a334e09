//! Analytic point-in-shape and point-near-stroke tests.
//!
//! Fill tests accumulate a signed winding number over line, quadratic,
//! cubic and arc segments; a point is inside when the total is non-zero.
//! Stroke tests compare the distance to the segment against half of the
//! hit width.

use std::f64::consts::{PI, TAU};

use super::curve::{
    cubic_at, cubic_extrema, cubic_project_point, cubic_root_at, quadratic_at,
    quadratic_extremum, quadratic_project_point, quadratic_root_at,
};
use super::path::{ArcSegment, PathCommand, PathData};
use super::Vec2;

/// Strokes thinner than this are hit-tested as if they were this wide.
pub const MIN_STROKE_HIT_WIDTH: f64 = 5.0;

const ANGLE_EPSILON: f64 = 1e-4;

/// Width used for stroke hit-testing: zero (no stroke) stays zero, anything
/// thinner than `min_width` is widened to it.
#[must_use]
pub fn stroke_hit_width(line_width: f64, min_width: f64) -> f64 {
    if !line_width.is_finite() || line_width <= 0.0 {
        return 0.0;
    }
    line_width.max(min_width)
}

/// Normalises an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_radian(angle: f64) -> f64 {
    let angle = angle % TAU;
    if angle < 0.0 { angle + TAU } else { angle }
}

/// True when the arc from `start` to `end` covers the whole circle.
#[must_use]
pub fn is_full_turn(start: f64, end: f64) -> bool {
    (end - start).abs() >= TAU - ANGLE_EPSILON
}

/// True when `angle` lies on the arc swept from `start` to `end`.
#[must_use]
pub fn angle_in_sweep(angle: f64, start: f64, end: f64, anticlockwise: bool) -> bool {
    if is_full_turn(start, end) {
        return true;
    }
    let (start, mut end) = if anticlockwise {
        (normalize_radian(end), normalize_radian(start))
    } else {
        (normalize_radian(start), normalize_radian(end))
    };
    if start > end {
        end += TAU;
    }
    let angle = normalize_radian(angle);
    (angle >= start && angle <= end) || (angle + TAU >= start && angle + TAU <= end)
}

/// Distance test against a straight segment of the given hit width.
#[must_use]
pub fn contain_line(x0: f64, y0: f64, x1: f64, y1: f64, width: f64, x: f64, y: f64) -> bool {
    if width <= 0.0 || !width.is_finite() {
        return false;
    }
    let half = width * 0.5;
    if (y > y0 + half && y > y1 + half)
        || (y < y0 - half && y < y1 - half)
        || (x > x0 + half && x > x1 + half)
        || (x < x0 - half && x < x1 - half)
    {
        return false;
    }
    segment_distance_squared(Vec2::new(x0, y0), Vec2::new(x1, y1), Vec2::new(x, y))
        <= half * half
}

/// Squared distance from `point` to the segment `a..b`.
#[must_use]
pub fn segment_distance_squared(a: Vec2, b: Vec2, point: Vec2) -> f64 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f64::EPSILON {
        return point.distance_squared(a);
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    point.distance_squared(a + ab * t)
}

#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn contain_cubic(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    width: f64,
    x: f64,
    y: f64,
) -> bool {
    if width <= 0.0 || !width.is_finite() {
        return false;
    }
    let half = width * 0.5;
    if (y > p0.y + half && y > p1.y + half && y > p2.y + half && y > p3.y + half)
        || (y < p0.y - half && y < p1.y - half && y < p2.y - half && y < p3.y - half)
        || (x > p0.x + half && x > p1.x + half && x > p2.x + half && x > p3.x + half)
        || (x < p0.x - half && x < p1.x - half && x < p2.x - half && x < p3.x - half)
    {
        return false;
    }
    let (distance, _) = cubic_project_point(p0, p1, p2, p3, Vec2::new(x, y));
    distance <= half
}

#[must_use]
pub fn contain_quadratic(p0: Vec2, p1: Vec2, p2: Vec2, width: f64, x: f64, y: f64) -> bool {
    if width <= 0.0 || !width.is_finite() {
        return false;
    }
    let half = width * 0.5;
    if (y > p0.y + half && y > p1.y + half && y > p2.y + half)
        || (y < p0.y - half && y < p1.y - half && y < p2.y - half)
        || (x > p0.x + half && x > p1.x + half && x > p2.x + half)
        || (x < p0.x - half && x < p1.x - half && x < p2.x - half)
    {
        return false;
    }
    let (distance, _) = quadratic_project_point(p0, p1, p2, Vec2::new(x, y));
    distance <= half
}

/// Stroke test against a circular arc.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn contain_arc(
    cx: f64,
    cy: f64,
    r: f64,
    start: f64,
    end: f64,
    anticlockwise: bool,
    width: f64,
    x: f64,
    y: f64,
) -> bool {
    if width <= 0.0 || !width.is_finite() {
        return false;
    }
    let half = width * 0.5;
    let dx = x - cx;
    let dy = y - cy;
    let d = dx.hypot(dy);
    if d - half > r || d + half < r {
        return false;
    }
    angle_in_sweep(dy.atan2(dx), start, end, anticlockwise)
}

/// Winding contribution of a line segment for a ray cast towards +x.
#[must_use]
pub fn winding_line(x0: f64, y0: f64, x1: f64, y1: f64, x: f64, y: f64) -> f64 {
    if (y > y0 && y > y1) || (y < y0 && y < y1) {
        return 0.0;
    }
    if y1 == y0 {
        return 0.0;
    }
    let t = (y - y0) / (y1 - y0);
    let mut dir = if y1 < y0 { 1.0 } else { -1.0 };
    if t == 1.0 || t == 0.0 {
        dir *= 0.5;
    }
    let crossing = t * (x1 - x0) + x0;
    if crossing == x {
        // On the edge itself.
        return f64::INFINITY;
    }
    if crossing > x { dir } else { 0.0 }
}

#[must_use]
pub fn winding_cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, x: f64, y: f64) -> f64 {
    if (y > p0.y && y > p1.y && y > p2.y && y > p3.y)
        || (y < p0.y && y < p1.y && y < p2.y && y < p3.y)
    {
        return 0.0;
    }
    let roots = cubic_root_at(p0.y, p1.y, p2.y, p3.y, y);
    if roots.is_empty() {
        return 0.0;
    }

    let mut extrema = cubic_extrema(p0.y, p1.y, p2.y, p3.y);
    if extrema.len() > 1 && extrema[1] < extrema[0] {
        extrema.swap(0, 1);
    }
    let y_at = |t: f64| cubic_at(p0.y, p1.y, p2.y, p3.y, t);

    let mut winding = 0.0;
    for t in roots {
        let unit = if t == 0.0 || t == 1.0 { 0.5 } else { 1.0 };
        if cubic_at(p0.x, p1.x, p2.x, p3.x, t) < x {
            continue;
        }
        let (from, to) = match extrema.as_slice() {
            [] => (p0.y, p3.y),
            [e0] => {
                let y0 = y_at(*e0);
                if t < *e0 { (p0.y, y0) } else { (y0, p3.y) }
            }
            [e0, e1, ..] => {
                let y0 = y_at(*e0);
                let y1 = y_at(*e1);
                if t < *e0 {
                    (p0.y, y0)
                } else if t < *e1 {
                    (y0, y1)
                } else {
                    (y1, p3.y)
                }
            }
        };
        winding += if to < from { unit } else { -unit };
    }
    winding
}

#[must_use]
pub fn winding_quadratic(p0: Vec2, p1: Vec2, p2: Vec2, x: f64, y: f64) -> f64 {
    if (y > p0.y && y > p1.y && y > p2.y) || (y < p0.y && y < p1.y && y < p2.y) {
        return 0.0;
    }
    let roots = quadratic_root_at(p0.y, p1.y, p2.y, y);
    if roots.is_empty() {
        return 0.0;
    }

    let extremum = quadratic_extremum(p0.y, p1.y, p2.y);
    if (0.0..=1.0).contains(&extremum) {
        let y_extremum = quadratic_at(p0.y, p1.y, p2.y, extremum);
        let mut winding = 0.0;
        for t in roots {
            let unit = if t == 0.0 || t == 1.0 { 0.5 } else { 1.0 };
            if quadratic_at(p0.x, p1.x, p2.x, t) < x {
                continue;
            }
            winding += if t < extremum {
                if y_extremum < p0.y { unit } else { -unit }
            } else if p2.y < y_extremum {
                unit
            } else {
                -unit
            };
        }
        winding
    } else {
        let t = roots[0];
        let unit = if t == 0.0 || t == 1.0 { 0.5 } else { 1.0 };
        if quadratic_at(p0.x, p1.x, p2.x, t) < x {
            return 0.0;
        }
        if p2.y < p0.y { unit } else { -unit }
    }
}

/// Winding contribution of a circular arc; spans of a full turn or more count
/// as complete circles.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn winding_arc(
    cx: f64,
    cy: f64,
    r: f64,
    start: f64,
    end: f64,
    anticlockwise: bool,
    x: f64,
    y: f64,
) -> f64 {
    let y = y - cy;
    if y > r || y < -r {
        return 0.0;
    }
    let half_chord = (r * r - y * y).sqrt();
    let crossings = [-half_chord, half_chord];

    if (start - end).abs() < ANGLE_EPSILON {
        return 0.0;
    }
    if is_full_turn(start, end) {
        let dir = if anticlockwise { 1.0 } else { -1.0 };
        return if x >= crossings[0] + cx && x <= crossings[1] + cx {
            dir
        } else {
            0.0
        };
    }

    let (start, mut end) = if anticlockwise {
        (normalize_radian(end), normalize_radian(start))
    } else {
        (normalize_radian(start), normalize_radian(end))
    };
    if start > end {
        end += TAU;
    }

    let mut winding = 0.0;
    for crossing in crossings {
        if crossing + cx <= x {
            continue;
        }
        let mut angle = y.atan2(crossing);
        if angle < 0.0 {
            angle += TAU;
        }
        if (angle >= start && angle <= end) || (angle + TAU >= start && angle + TAU <= end) {
            let mut dir = if anticlockwise { 1.0 } else { -1.0 };
            if angle > PI / 2.0 && angle < PI * 1.5 {
                dir = -dir;
            }
            winding += dir;
        }
    }
    winding
}

/// Maps a point into the local frame of an elliptical arc so the arc can be
/// treated as a circle of radius `ry`.
fn arc_local_point(arc: &ArcSegment, x: f64, y: f64) -> (f64, f64) {
    let mut local = Vec2::new(x - arc.center.x, y - arc.center.y);
    if arc.rotation != 0.0 {
        let (sin, cos) = (-arc.rotation).sin_cos();
        local = Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos);
    }
    let scale_x = if arc.rx.abs() > f64::EPSILON {
        arc.ry / arc.rx
    } else {
        1.0
    };
    (local.x * scale_x + arc.center.x, local.y + arc.center.y)
}

/// Fill (non-zero winding) or stroke containment over mixed path commands.
///
/// `stroke_width` of `None` runs the fill test; `Some(width)` runs the stroke
/// test with that hit width.
#[must_use]
pub fn contain_path(path: &PathData, stroke_width: Option<f64>, x: f64, y: f64) -> bool {
    let is_stroke = stroke_width.is_some();
    let width = stroke_width.unwrap_or(0.0);
    let mut winding = 0.0;
    let mut current = Vec2::ZERO;
    let mut subpath_start = Vec2::ZERO;
    let mut has_current = false;

    for command in path.commands() {
        match command {
            PathCommand::MoveTo(point) => {
                if !is_stroke && has_current {
                    winding += winding_line(current.x, current.y, subpath_start.x, subpath_start.y, x, y);
                }
                current = *point;
                subpath_start = *point;
                has_current = true;
            }
            PathCommand::LineTo(point) => {
                if is_stroke {
                    if contain_line(current.x, current.y, point.x, point.y, width, x, y) {
                        return true;
                    }
                } else {
                    winding += winding_line(current.x, current.y, point.x, point.y, x, y);
                }
                current = *point;
            }
            PathCommand::QuadTo { ctrl, to } => {
                if is_stroke {
                    if contain_quadratic(current, *ctrl, *to, width, x, y) {
                        return true;
                    }
                } else {
                    winding += winding_quadratic(current, *ctrl, *to, x, y);
                }
                current = *to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                if is_stroke {
                    if contain_cubic(current, *ctrl1, *ctrl2, *to, width, x, y) {
                        return true;
                    }
                } else {
                    winding += winding_cubic(current, *ctrl1, *ctrl2, *to, x, y);
                }
                current = *to;
            }
            PathCommand::Arc(arc) => {
                let start_point = arc.start_point();
                if has_current {
                    if is_stroke {
                        if contain_line(current.x, current.y, start_point.x, start_point.y, width, x, y) {
                            return true;
                        }
                    } else {
                        winding += winding_line(current.x, current.y, start_point.x, start_point.y, x, y);
                    }
                } else {
                    subpath_start = start_point;
                    has_current = true;
                }
                let (local_x, local_y) = arc_local_point(arc, x, y);
                if is_stroke {
                    if contain_arc(
                        arc.center.x,
                        arc.center.y,
                        arc.ry,
                        arc.start_angle,
                        arc.end_angle,
                        arc.anticlockwise,
                        width,
                        local_x,
                        local_y,
                    ) {
                        return true;
                    }
                } else {
                    winding += winding_arc(
                        arc.center.x,
                        arc.center.y,
                        arc.ry,
                        arc.start_angle,
                        arc.end_angle,
                        arc.anticlockwise,
                        local_x,
                        local_y,
                    );
                }
                current = arc.end_point();
            }
            PathCommand::Close => {
                if is_stroke {
                    if contain_line(current.x, current.y, subpath_start.x, subpath_start.y, width, x, y) {
                        return true;
                    }
                } else {
                    winding += winding_line(current.x, current.y, subpath_start.x, subpath_start.y, x, y);
                }
                current = subpath_start;
            }
        }
        if winding.is_infinite() {
            return !is_stroke;
        }
    }

    if !is_stroke && has_current {
        winding += winding_line(current.x, current.y, subpath_start.x, subpath_start.y, x, y);
    }
    !is_stroke && (winding.is_infinite() || winding != 0.0)
}

/// Non-zero winding test against a closed polygon.
#[must_use]
pub fn point_in_polygon(points: &[Vec2], x: f64, y: f64) -> bool {
    let Some(first) = points.first() else {
        return false;
    };
    let mut winding = 0.0;
    let mut previous = *first;
    for point in points.iter().skip(1).chain(std::iter::once(first)) {
        winding += winding_line(previous.x, previous.y, point.x, point.y, x, y);
        if winding.is_infinite() {
            return true;
        }
        previous = *point;
    }
    winding != 0.0
}

/// Stroke test against an open polyline.
#[must_use]
pub fn point_near_polyline(points: &[Vec2], width: f64, x: f64, y: f64) -> bool {
    points
        .windows(2)
        .any(|pair| contain_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, width, x, y))
}

#[must_use]
pub fn point_in_circle(cx: f64, cy: f64, r: f64, x: f64, y: f64) -> bool {
    (x - cx) * (x - cx) + (y - cy) * (y - cy) < r * r
}

#[must_use]
pub fn point_in_rect(rx: f64, ry: f64, width: f64, height: f64, x: f64, y: f64) -> bool {
    x >= rx && x <= rx + width && y >= ry && y <= ry + height
}

/// Annulus test (inner radius exclusive of the hole).
#[must_use]
pub fn point_in_ring(cx: f64, cy: f64, r0: f64, r: f64, x: f64, y: f64) -> bool {
    let d2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
    d2 < r * r && d2 > r0 * r0
}

#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn point_in_sector(
    cx: f64,
    cy: f64,
    r0: f64,
    r: f64,
    start: f64,
    end: f64,
    anticlockwise: bool,
    x: f64,
    y: f64,
) -> bool {
    let dx = x - cx;
    let dy = y - cy;
    let d2 = dx * dx + dy * dy;
    if d2 > r * r || d2 < r0 * r0 {
        return false;
    }
    if d2 == 0.0 {
        return r0 <= 0.0;
    }
    angle_in_sweep(dy.atan2(dx), start, end, anticlockwise)
}
