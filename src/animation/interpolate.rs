//! Keyframe value interpolation: numbers, 1-D and 2-D arrays, colours.

use crate::render::Color;
use crate::shape::PropValue;

#[must_use]
pub fn lerp(p0: f64, p1: f64, t: f64) -> f64 {
    (p1 - p0) * t + p0
}

/// Catmull-Rom segment between `p1` and `p2`.
#[must_use]
pub fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * (p1 - p2) + v0 + v1) * t3 + (-3.0 * (p1 - p2) - 2.0 * v0 - v1) * t2 + v0 * t + p1
}

fn zip_rows<F>(rows: [&[f64]; 4], count: usize, f: F) -> Vec<f64>
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    (0..count)
        .map(|i| f(rows[0][i], rows[1][i], rows[2][i], rows[3][i]))
        .collect()
}

fn colour(value: &PropValue) -> Option<Color> {
    match value {
        PropValue::Color(color) => Some(*color),
        PropValue::Text(text) => Color::parse(text).ok(),
        _ => None,
    }
}

/// Whether two keyframe values can be blended rather than stepped.
#[must_use]
pub fn is_interpolable(a: &PropValue, b: &PropValue) -> bool {
    match (a, b) {
        (PropValue::Number(_), PropValue::Number(_)) => true,
        (PropValue::Array(x), PropValue::Array(y)) => x.len() == y.len(),
        (PropValue::Array2(x), PropValue::Array2(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(r, s)| r.len() == s.len())
        }
        _ => colour(a).is_some() && colour(b).is_some(),
    }
}

/// Linear blend; `None` when the pair cannot be interpolated.
#[must_use]
pub fn lerp_value(a: &PropValue, b: &PropValue, t: f64) -> Option<PropValue> {
    spline_value([a, a, b, b], t, false)
}

/// Catmull-Rom blend between `points[1]` and `points[2]`.
#[must_use]
pub fn catmull_rom_value(points: [&PropValue; 4], t: f64) -> Option<PropValue> {
    spline_value(points, t, true)
}

fn spline_value(points: [&PropValue; 4], t: f64, spline: bool) -> Option<PropValue> {
    let blend = |p0: f64, p1: f64, p2: f64, p3: f64| {
        if spline {
            catmull_rom(p0, p1, p2, p3, t)
        } else {
            lerp(p1, p2, t)
        }
    };
    if !is_interpolable(points[1], points[2])
        || !is_interpolable(points[0], points[1])
        || !is_interpolable(points[2], points[3])
    {
        return None;
    }
    match points {
        [
            PropValue::Number(p0),
            PropValue::Number(p1),
            PropValue::Number(p2),
            PropValue::Number(p3),
        ] => Some(PropValue::Number(blend(*p0, *p1, *p2, *p3))),
        [
            PropValue::Array(r0),
            PropValue::Array(r1),
            PropValue::Array(r2),
            PropValue::Array(r3),
        ] => Some(PropValue::Array(zip_rows(
            [r0.as_slice(), r1.as_slice(), r2.as_slice(), r3.as_slice()],
            r1.len(),
            blend,
        ))),
        [
            PropValue::Array2(m0),
            PropValue::Array2(m1),
            PropValue::Array2(m2),
            PropValue::Array2(m3),
        ] => Some(PropValue::Array2(
            (0..m1.len())
                .map(|row| {
                    zip_rows(
                        [
                            m0[row].as_slice(),
                            m1[row].as_slice(),
                            m2[row].as_slice(),
                            m3[row].as_slice(),
                        ],
                        m1[row].len(),
                        blend,
                    )
                })
                .collect(),
        )),
        [c0, c1, c2, c3] => {
            let [c0, c1, c2, c3] = [colour(c0)?, colour(c1)?, colour(c2)?, colour(c3)?];
            let channel = |f: fn(&Color) -> f64| blend(f(&c0), f(&c1), f(&c2), f(&c3));
            let blended = Color::rgba(
                channel(|c| c.red),
                channel(|c| c.green),
                channel(|c| c.blue),
                channel(|c| c.alpha),
            )
            .clamped();
            // Text colours stay text so the property keeps its kind.
            Some(match points[1] {
                PropValue::Text(_) => PropValue::Text(blended.to_css()),
                _ => PropValue::Color(blended),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn catmull_rom_passes_through_inner_points() {
        assert_abs_diff_eq!(catmull_rom(0.0, 1.0, 4.0, 9.0, 0.0), 1.0);
        assert_abs_diff_eq!(catmull_rom(0.0, 1.0, 4.0, 9.0, 1.0), 4.0);
        assert_abs_diff_eq!(catmull_rom(0.0, 1.0, 2.0, 3.0, 0.5), 1.5);
    }

    #[test]
    fn arrays_blend_element_wise() {
        let a = PropValue::Array2(vec![vec![0.0, 0.0], vec![10.0, 10.0]]);
        let b = PropValue::Array2(vec![vec![10.0, 20.0], vec![20.0, 30.0]]);
        assert_eq!(
            lerp_value(&a, &b, 0.5),
            Some(PropValue::Array2(vec![vec![5.0, 10.0], vec![15.0, 20.0]]))
        );
        let short = PropValue::Array(vec![1.0]);
        assert_eq!(lerp_value(&PropValue::Array(vec![1.0, 2.0]), &short, 0.5), None);
    }

    #[test]
    fn text_colours_blend_and_reserialise() {
        let a = PropValue::from("#000000");
        let b = PropValue::from("#ffffff");
        let Some(PropValue::Text(mid)) = lerp_value(&a, &b, 0.5) else {
            panic!("expected a text colour");
        };
        let parsed = Color::parse(&mid).expect("css colour");
        assert_abs_diff_eq!(parsed.red, 0.5, epsilon = 0.01);
        assert_eq!(lerp_value(&PropValue::Bool(true), &PropValue::Bool(false), 0.5), None);
    }
}
