//! Concrete shape variants: path building, local bounds, hit-testing and
//! keyed geometry access.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::rc::Rc;

use crate::core::contain::{
    contain_arc, contain_line, point_in_circle, point_in_polygon, point_in_rect, point_in_ring,
    point_in_sector, point_near_polyline, stroke_hit_width,
};
use crate::core::smooth::{smooth_bezier, smooth_spline};
use crate::core::{PathData, Rect, Smoothing, TextAlign, TextBaseline, Vec2, text_bounds};
use crate::error::{SceneError, SceneResult};

use super::{PaintStyle, PropValue, RasterImage};

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Line {
        x_start: f64,
        y_start: f64,
        x_end: f64,
        y_end: f64,
    },
    /// Quadratic curve when `ctrl2` is `None`, cubic otherwise.
    BezierCurve {
        start: Vec2,
        ctrl1: Vec2,
        ctrl2: Option<Vec2>,
        end: Vec2,
    },
    Polyline {
        points: Vec<Vec2>,
        smoothing: Smoothing,
    },
    Polygon {
        points: Vec<Vec2>,
        smoothing: Smoothing,
    },
    Circle {
        x: f64,
        y: f64,
        r: f64,
    },
    Ellipse {
        x: f64,
        y: f64,
        a: f64,
        b: f64,
    },
    Sector {
        x: f64,
        y: f64,
        r0: f64,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    Ring {
        x: f64,
        y: f64,
        r0: f64,
        r: f64,
    },
    /// Corner radii run top-left, top-right, bottom-right, bottom-left.
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: [f64; 4],
    },
    /// `r0` defaults to a regular-star inner radius when `None`.
    Star {
        x: f64,
        y: f64,
        r: f64,
        r0: Option<f64>,
        n: u32,
    },
    Isogon {
        x: f64,
        y: f64,
        r: f64,
        n: u32,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        align: TextAlign,
        baseline: TextBaseline,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: Rc<RasterImage>,
    },
    Path(PathData),
    /// Several geometries painted and hit-tested as one shape.
    Bundle(Vec<ShapeKind>),
}

/// How a kind's geometry should reach the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry<'a> {
    /// Fillable outline.
    Area(PathData),
    /// Open outline that is only ever stroked.
    Outline(PathData),
    Text {
        x: f64,
        y: f64,
        text: &'a str,
        font_size: f64,
        align: TextAlign,
        baseline: TextBaseline,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: &'a RasterImage,
    },
    Bundle(Vec<Geometry<'a>>),
}

fn ensure_finite(name: &str, values: &[f64]) -> SceneResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::InvalidData(format!(
            "{name} geometry must be finite"
        )))
    }
}

fn ensure_non_negative(name: &str, field: &str, value: f64) -> SceneResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidData(format!(
            "{name} `{field}` must be >= 0"
        )))
    }
}

fn star_points(x: f64, y: f64, r: f64, r0: Option<f64>, n: u32) -> Vec<Vec2> {
    let n_f = f64::from(n);
    let inner = r0.unwrap_or(if n > 4 {
        r * (TAU / n_f).cos() / (PI / n_f).cos()
    } else {
        r / 3.0
    });
    let step = PI / n_f;
    (0..n * 2)
        .map(|index| {
            let radius = if index % 2 == 0 { r } else { inner };
            let angle = -FRAC_PI_2 + step * f64::from(index);
            Vec2::new(x + radius * angle.cos(), y + radius * angle.sin())
        })
        .collect()
}

fn isogon_points(x: f64, y: f64, r: f64, n: u32) -> Vec<Vec2> {
    let step = TAU / f64::from(n);
    (0..n)
        .map(|index| {
            let angle = -FRAC_PI_2 + step * f64::from(index);
            Vec2::new(x + r * angle.cos(), y + r * angle.sin())
        })
        .collect()
}

fn smoothed_path(points: &[Vec2], smoothing: Smoothing, closed: bool) -> PathData {
    let mut path = PathData::new();
    match smoothing {
        Smoothing::None => {
            path.polyline(points);
        }
        Smoothing::Spline => {
            let mut sampled = smooth_spline(points, closed);
            if closed {
                sampled.pop();
            }
            path.polyline(&sampled);
        }
        Smoothing::Bezier(factor) => {
            let controls = smooth_bezier(points, factor, closed, None);
            if let Some(first) = points.first() {
                path.move_to(first.x, first.y);
            }
            let segments = if closed { points.len() } else { points.len() - 1 };
            for index in 0..segments {
                let (Some(c1), Some(c2)) = (controls.get(index * 2), controls.get(index * 2 + 1))
                else {
                    break;
                };
                let to = points[(index + 1) % points.len()];
                path.cubic_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
            }
        }
    }
    if closed {
        path.close();
    }
    path
}

impl ShapeKind {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::BezierCurve { .. } => "bezier-curve",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Circle { .. } => "circle",
            Self::Ellipse { .. } => "ellipse",
            Self::Sector { .. } => "sector",
            Self::Ring { .. } => "ring",
            Self::Rectangle { .. } => "rectangle",
            Self::Star { .. } => "star",
            Self::Isogon { .. } => "isogon",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Path(_) => "path",
            Self::Bundle(_) => "bundle",
        }
    }

    /// Rejects geometry that cannot be painted: non-finite numbers, negative
    /// extents and missing mandatory points.
    pub fn validate(&self) -> SceneResult<()> {
        let name = self.type_name();
        match self {
            Self::Line {
                x_start,
                y_start,
                x_end,
                y_end,
            } => ensure_finite(name, &[*x_start, *y_start, *x_end, *y_end]),
            Self::BezierCurve {
                start,
                ctrl1,
                ctrl2,
                end,
            } => {
                let ctrl2 = ctrl2.unwrap_or(*ctrl1);
                ensure_finite(
                    name,
                    &[
                        start.x, start.y, ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, end.x, end.y,
                    ],
                )
            }
            Self::Polyline { points, smoothing } | Self::Polygon { points, smoothing } => {
                if points.len() < 2 {
                    return Err(SceneError::InvalidData(format!(
                        "{name} requires at least 2 points"
                    )));
                }
                if points.iter().any(|point| !point.is_finite()) {
                    return Err(SceneError::InvalidData(format!(
                        "{name} points must be finite"
                    )));
                }
                if let Smoothing::Bezier(factor) = smoothing {
                    ensure_finite(name, &[*factor])?;
                }
                Ok(())
            }
            Self::Circle { x, y, r } => {
                ensure_finite(name, &[*x, *y, *r])?;
                ensure_non_negative(name, "r", *r)
            }
            Self::Ellipse { x, y, a, b } => {
                ensure_finite(name, &[*x, *y, *a, *b])?;
                ensure_non_negative(name, "a", *a)?;
                ensure_non_negative(name, "b", *b)
            }
            Self::Sector {
                x,
                y,
                r0,
                r,
                start_angle,
                end_angle,
                ..
            } => {
                ensure_finite(name, &[*x, *y, *r0, *r, *start_angle, *end_angle])?;
                ensure_non_negative(name, "r0", *r0)?;
                ensure_non_negative(name, "r", *r)
            }
            Self::Ring { x, y, r0, r } => {
                ensure_finite(name, &[*x, *y, *r0, *r])?;
                ensure_non_negative(name, "r0", *r0)?;
                ensure_non_negative(name, "r", *r)
            }
            Self::Rectangle {
                x,
                y,
                width,
                height,
                radius,
            } => {
                ensure_finite(name, &[*x, *y, *width, *height])?;
                ensure_finite(name, radius)
            }
            Self::Star { x, y, r, r0, n } => {
                ensure_finite(name, &[*x, *y, *r, r0.unwrap_or(0.0)])?;
                if *n < 2 {
                    return Err(SceneError::InvalidData(
                        "star requires n >= 2".to_owned(),
                    ));
                }
                ensure_non_negative(name, "r", *r)
            }
            Self::Isogon { x, y, r, n } => {
                ensure_finite(name, &[*x, *y, *r])?;
                if *n < 3 {
                    return Err(SceneError::InvalidData(
                        "isogon requires n >= 3".to_owned(),
                    ));
                }
                ensure_non_negative(name, "r", *r)
            }
            Self::Text { x, y, font_size, .. } => {
                ensure_finite(name, &[*x, *y, *font_size])?;
                if *font_size <= 0.0 {
                    return Err(SceneError::InvalidData(
                        "text font size must be > 0".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::Image {
                x,
                y,
                width,
                height,
                ..
            } => {
                ensure_finite(name, &[*x, *y, *width, *height])?;
                ensure_non_negative(name, "width", *width)?;
                ensure_non_negative(name, "height", *height)
            }
            Self::Path(path) => {
                if path.is_empty() {
                    return Err(SceneError::InvalidData("path has no commands".to_owned()));
                }
                Ok(())
            }
            Self::Bundle(parts) => parts.iter().try_for_each(Self::validate),
        }
    }

    /// Paintable geometry in local coordinates.
    pub fn geometry(&self) -> SceneResult<Geometry<'_>> {
        self.validate()?;
        Ok(match self {
            Self::Line {
                x_start,
                y_start,
                x_end,
                y_end,
            } => {
                let mut path = PathData::new();
                path.move_to(*x_start, *y_start).line_to(*x_end, *y_end);
                Geometry::Outline(path)
            }
            Self::BezierCurve {
                start,
                ctrl1,
                ctrl2,
                end,
            } => {
                let mut path = PathData::new();
                path.move_to(start.x, start.y);
                match ctrl2 {
                    Some(ctrl2) => path.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, end.x, end.y),
                    None => path.quad_to(ctrl1.x, ctrl1.y, end.x, end.y),
                };
                Geometry::Outline(path)
            }
            Self::Polyline { points, smoothing } => {
                Geometry::Outline(smoothed_path(points, *smoothing, false))
            }
            Self::Polygon { points, smoothing } => {
                Geometry::Area(smoothed_path(points, *smoothing, true))
            }
            Self::Circle { x, y, r } => {
                let mut path = PathData::new();
                path.circle(*x, *y, *r);
                Geometry::Area(path)
            }
            Self::Ellipse { x, y, a, b } => {
                let mut path = PathData::new();
                path.ellipse(*x, *y, *a, *b);
                Geometry::Area(path)
            }
            Self::Sector {
                x,
                y,
                r0,
                r,
                start_angle,
                end_angle,
                anticlockwise,
            } => Geometry::Area(sector_path(
                *x,
                *y,
                *r0,
                *r,
                *start_angle,
                *end_angle,
                *anticlockwise,
            )),
            Self::Ring { x, y, r0, r } => {
                let mut path = PathData::new();
                path.arc(*x, *y, *r, 0.0, TAU, false).close();
                path.arc(*x, *y, *r0, TAU, 0.0, true).close();
                Geometry::Area(path)
            }
            Self::Rectangle {
                x,
                y,
                width,
                height,
                radius,
            } => {
                let mut path = PathData::new();
                path.rounded_rect(*x, *y, *width, *height, *radius);
                Geometry::Area(path)
            }
            Self::Star { x, y, r, r0, n } => {
                let mut path = PathData::new();
                path.polyline(&star_points(*x, *y, *r, *r0, *n)).close();
                Geometry::Area(path)
            }
            Self::Isogon { x, y, r, n } => {
                let mut path = PathData::new();
                path.polyline(&isogon_points(*x, *y, *r, *n)).close();
                Geometry::Area(path)
            }
            Self::Text {
                x,
                y,
                text,
                font_size,
                align,
                baseline,
            } => Geometry::Text {
                x: *x,
                y: *y,
                text,
                font_size: *font_size,
                align: *align,
                baseline: *baseline,
            },
            Self::Image {
                x,
                y,
                width,
                height,
                image,
            } => Geometry::Image {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                image,
            },
            Self::Path(path) => Geometry::Area(path.clone()),
            Self::Bundle(parts) => Geometry::Bundle(
                parts
                    .iter()
                    .map(Self::geometry)
                    .collect::<SceneResult<Vec<_>>>()?,
            ),
        })
    }

    /// Local bounds, inflated by half the stroke width when stroked.
    pub fn local_bounds(&self, style: &PaintStyle) -> SceneResult<Rect> {
        let raw = geometry_bounds(&self.geometry()?);
        let stroke_pad = if style.has_stroke() || self.is_outline_only() {
            style.line_width.max(0.0) * 0.5
        } else {
            0.0
        };
        Ok(raw.inflate(stroke_pad))
    }

    /// Shapes that are only ever stroked.
    #[must_use]
    pub fn is_outline_only(&self) -> bool {
        matches!(
            self,
            Self::Line { .. } | Self::BezierCurve { .. } | Self::Polyline { .. }
        )
    }

    /// Exact local-space containment. Fill regions are tested when the
    /// style fills (or paints nothing at all); the stroke band when it
    /// strokes. Outline-only kinds always use the stroke band.
    #[must_use]
    pub fn contains(&self, style: &PaintStyle, min_stroke_width: f64, x: f64, y: f64) -> bool {
        let stroke_width = stroke_hit_width(style.line_width, min_stroke_width);
        if self.is_outline_only() {
            return self.contains_stroke(stroke_width, x, y);
        }
        let test_fill = style.fill.is_some() || !style.has_stroke();
        if test_fill && self.contains_fill(x, y) {
            return true;
        }
        style.has_stroke() && self.contains_stroke(stroke_width, x, y)
    }

    fn contains_fill(&self, x: f64, y: f64) -> bool {
        match self {
            Self::Line { .. } | Self::BezierCurve { .. } | Self::Polyline { .. } => false,
            Self::Polygon {
                points,
                smoothing: Smoothing::None,
            } => point_in_polygon(points, x, y),
            Self::Circle { x: cx, y: cy, r } => point_in_circle(*cx, *cy, *r, x, y),
            Self::Ring { x: cx, y: cy, r0, r } => point_in_ring(*cx, *cy, *r0, *r, x, y),
            Self::Sector {
                x: cx,
                y: cy,
                r0,
                r,
                start_angle,
                end_angle,
                anticlockwise,
            } => point_in_sector(
                *cx,
                *cy,
                *r0,
                *r,
                *start_angle,
                *end_angle,
                *anticlockwise,
                x,
                y,
            ),
            Self::Rectangle {
                x: rx,
                y: ry,
                width,
                height,
                radius,
            } if radius.iter().all(|corner| *corner <= 0.0) => {
                let rect = Rect::new(*rx, *ry, *width, *height);
                point_in_rect(rect.x, rect.y, rect.width, rect.height, x, y)
            }
            Self::Text { .. } | Self::Image { .. } => match self.geometry() {
                Ok(geometry) => geometry_bounds(&geometry).contains(x, y),
                Err(_) => false,
            },
            Self::Bundle(parts) => parts.iter().any(|part| part.contains_fill(x, y)),
            _ => match self.geometry() {
                Ok(Geometry::Area(path)) => path.contains(x, y),
                _ => false,
            },
        }
    }

    fn contains_stroke(&self, width: f64, x: f64, y: f64) -> bool {
        if width <= 0.0 {
            return false;
        }
        match self {
            Self::Line {
                x_start,
                y_start,
                x_end,
                y_end,
            } => contain_line(*x_start, *y_start, *x_end, *y_end, width, x, y),
            Self::Polyline {
                points,
                smoothing: Smoothing::None,
            } => point_near_polyline(points, width, x, y),
            Self::Circle { x: cx, y: cy, r } => {
                contain_arc(*cx, *cy, *r, 0.0, TAU, false, width, x, y)
            }
            Self::Ring { x: cx, y: cy, r0, r } => {
                contain_arc(*cx, *cy, *r, 0.0, TAU, false, width, x, y)
                    || contain_arc(*cx, *cy, *r0, 0.0, TAU, false, width, x, y)
            }
            Self::Text { .. } | Self::Image { .. } => false,
            Self::Bundle(parts) => parts.iter().any(|part| part.contains_stroke(width, x, y)),
            _ => match self.geometry() {
                Ok(Geometry::Area(path) | Geometry::Outline(path)) => {
                    path.contains_stroke(width, x, y)
                }
                _ => false,
            },
        }
    }

    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<PropValue> {
        let number = |value: f64| Some(PropValue::Number(value));
        match (self, key) {
            (Self::Line { x_start, .. }, "x_start") => number(*x_start),
            (Self::Line { y_start, .. }, "y_start") => number(*y_start),
            (Self::Line { x_end, .. }, "x_end") => number(*x_end),
            (Self::Line { y_end, .. }, "y_end") => number(*y_end),
            (Self::BezierCurve { start, .. }, "start") => Some((*start).into()),
            (Self::BezierCurve { ctrl1, .. }, "ctrl1") => Some((*ctrl1).into()),
            (Self::BezierCurve { ctrl2, .. }, "ctrl2") => ctrl2.map(Into::into),
            (Self::BezierCurve { end, .. }, "end") => Some((*end).into()),
            (Self::Polyline { points, .. } | Self::Polygon { points, .. }, "points") => {
                Some(points.clone().into())
            }
            (
                Self::Circle { x, .. }
                | Self::Ellipse { x, .. }
                | Self::Sector { x, .. }
                | Self::Ring { x, .. }
                | Self::Rectangle { x, .. }
                | Self::Star { x, .. }
                | Self::Isogon { x, .. }
                | Self::Text { x, .. }
                | Self::Image { x, .. },
                "x",
            ) => number(*x),
            (
                Self::Circle { y, .. }
                | Self::Ellipse { y, .. }
                | Self::Sector { y, .. }
                | Self::Ring { y, .. }
                | Self::Rectangle { y, .. }
                | Self::Star { y, .. }
                | Self::Isogon { y, .. }
                | Self::Text { y, .. }
                | Self::Image { y, .. },
                "y",
            ) => number(*y),
            (
                Self::Circle { r, .. }
                | Self::Sector { r, .. }
                | Self::Ring { r, .. }
                | Self::Star { r, .. }
                | Self::Isogon { r, .. },
                "r",
            ) => number(*r),
            (Self::Sector { r0, .. } | Self::Ring { r0, .. }, "r0") => number(*r0),
            (Self::Star { r0, .. }, "r0") => r0.map(PropValue::Number),
            (Self::Ellipse { a, .. }, "a") => number(*a),
            (Self::Ellipse { b, .. }, "b") => number(*b),
            (Self::Sector { start_angle, .. }, "start_angle") => number(*start_angle),
            (Self::Sector { end_angle, .. }, "end_angle") => number(*end_angle),
            (Self::Rectangle { width, .. } | Self::Image { width, .. }, "width") => number(*width),
            (Self::Rectangle { height, .. } | Self::Image { height, .. }, "height") => {
                number(*height)
            }
            (Self::Rectangle { radius, .. }, "radius") => Some(PropValue::Array(radius.to_vec())),
            (Self::Text { text, .. }, "text") => Some(PropValue::Text(text.clone())),
            (Self::Text { font_size, .. }, "font_size") => number(*font_size),
            _ => None,
        }
    }

    /// Sets a geometry field by key. Unknown keys for this kind are rejected.
    pub fn set_property(&mut self, key: &str, value: &PropValue) -> SceneResult<()> {
        let name = self.type_name();
        match (self, key) {
            (Self::Line { x_start, .. }, "x_start") => *x_start = value.as_number(key)?,
            (Self::Line { y_start, .. }, "y_start") => *y_start = value.as_number(key)?,
            (Self::Line { x_end, .. }, "x_end") => *x_end = value.as_number(key)?,
            (Self::Line { y_end, .. }, "y_end") => *y_end = value.as_number(key)?,
            (Self::BezierCurve { start, .. }, "start") => *start = value.as_point(key)?,
            (Self::BezierCurve { ctrl1, .. }, "ctrl1") => *ctrl1 = value.as_point(key)?,
            (Self::BezierCurve { ctrl2, .. }, "ctrl2") => *ctrl2 = Some(value.as_point(key)?),
            (Self::BezierCurve { end, .. }, "end") => *end = value.as_point(key)?,
            (Self::Polyline { points, .. } | Self::Polygon { points, .. }, "points") => {
                *points = value.as_points(key)?;
            }
            (
                Self::Circle { x, .. }
                | Self::Ellipse { x, .. }
                | Self::Sector { x, .. }
                | Self::Ring { x, .. }
                | Self::Rectangle { x, .. }
                | Self::Star { x, .. }
                | Self::Isogon { x, .. }
                | Self::Text { x, .. }
                | Self::Image { x, .. },
                "x",
            ) => *x = value.as_number(key)?,
            (
                Self::Circle { y, .. }
                | Self::Ellipse { y, .. }
                | Self::Sector { y, .. }
                | Self::Ring { y, .. }
                | Self::Rectangle { y, .. }
                | Self::Star { y, .. }
                | Self::Isogon { y, .. }
                | Self::Text { y, .. }
                | Self::Image { y, .. },
                "y",
            ) => *y = value.as_number(key)?,
            (
                Self::Circle { r, .. }
                | Self::Sector { r, .. }
                | Self::Ring { r, .. }
                | Self::Star { r, .. }
                | Self::Isogon { r, .. },
                "r",
            ) => *r = value.as_number(key)?,
            (Self::Sector { r0, .. } | Self::Ring { r0, .. }, "r0") => {
                *r0 = value.as_number(key)?;
            }
            (Self::Star { r0, .. }, "r0") => *r0 = Some(value.as_number(key)?),
            (Self::Ellipse { a, .. }, "a") => *a = value.as_number(key)?,
            (Self::Ellipse { b, .. }, "b") => *b = value.as_number(key)?,
            (Self::Sector { start_angle, .. }, "start_angle") => {
                *start_angle = value.as_number(key)?;
            }
            (Self::Sector { end_angle, .. }, "end_angle") => *end_angle = value.as_number(key)?,
            (Self::Rectangle { width, .. } | Self::Image { width, .. }, "width") => {
                *width = value.as_number(key)?;
            }
            (Self::Rectangle { height, .. } | Self::Image { height, .. }, "height") => {
                *height = value.as_number(key)?;
            }
            (Self::Rectangle { radius, .. }, "radius") => match value {
                PropValue::Number(uniform) => *radius = [*uniform; 4],
                PropValue::Array(values) if values.len() == 4 => {
                    *radius = [values[0], values[1], values[2], values[3]];
                }
                other => {
                    return Err(SceneError::InvalidData(format!(
                        "property `radius` expects number or 4 numbers, got {}",
                        other.kind_name()
                    )));
                }
            },
            (Self::Text { text, .. }, "text") => *text = value.as_text(key)?,
            (Self::Text { font_size, .. }, "font_size") => *font_size = value.as_number(key)?,
            (Self::Path(path), "path") => *path = PathData::parse_svg(&value.as_text(key)?)?,
            _ => {
                return Err(SceneError::InvalidData(format!(
                    "{name} has no geometry property `{key}`"
                )));
            }
        }
        Ok(())
    }
}

fn sector_path(
    x: f64,
    y: f64,
    r0: f64,
    r: f64,
    start: f64,
    end: f64,
    anticlockwise: bool,
) -> PathData {
    let mut path = PathData::new();
    if r0 <= 0.0 {
        path.move_to(x, y);
        path.arc(x, y, r, start, end, anticlockwise);
    } else {
        path.arc(x, y, r, start, end, anticlockwise);
        path.arc(x, y, r0, end, start, !anticlockwise);
    }
    path.close();
    path
}

fn geometry_bounds(geometry: &Geometry<'_>) -> Rect {
    match geometry {
        Geometry::Area(path) | Geometry::Outline(path) => {
            path.bounding_rect().unwrap_or(Rect::EMPTY)
        }
        Geometry::Text {
            x,
            y,
            text,
            font_size,
            align,
            baseline,
        } => text_bounds(text, *x, *y, *font_size, *align, *baseline),
        Geometry::Image {
            x,
            y,
            width,
            height,
            ..
        } => Rect::new(*x, *y, *width, *height),
        Geometry::Bundle(parts) => parts
            .iter()
            .map(geometry_bounds)
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or(Rect::EMPTY),
    }
}
