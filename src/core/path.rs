//! Path command model, builders, bounds and SVG path-data parsing.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::contain::contain_path;
use super::curve::{cubic_at, cubic_extrema, quadratic_at, quadratic_extremum};
use super::{Rect, Vec2};
use crate::error::{SceneError, SceneResult};

/// Elliptical arc in canvas convention: angles in radians measured from +x
/// towards +y (clockwise on screen), swept towards decreasing angles when
/// `anticlockwise` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub center: Vec2,
    pub rx: f64,
    pub ry: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub rotation: f64,
    pub anticlockwise: bool,
}

impl ArcSegment {
    #[must_use]
    pub fn circular(cx: f64, cy: f64, r: f64, start: f64, end: f64, anticlockwise: bool) -> Self {
        Self {
            center: Vec2::new(cx, cy),
            rx: r,
            ry: r,
            start_angle: start,
            end_angle: end,
            rotation: 0.0,
            anticlockwise,
        }
    }

    /// Signed sweep angle following canvas `arc()` semantics.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        if self.anticlockwise {
            let span = self.start_angle - self.end_angle;
            if span >= TAU {
                -TAU
            } else {
                -span.rem_euclid(TAU)
            }
        } else {
            let span = self.end_angle - self.start_angle;
            if span >= TAU { TAU } else { span.rem_euclid(TAU) }
        }
    }

    #[must_use]
    pub fn point_at(&self, angle: f64) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        let local = Vec2::new(self.rx * cos, self.ry * sin);
        self.to_world(local)
    }

    #[must_use]
    pub fn start_point(&self) -> Vec2 {
        self.point_at(self.start_angle)
    }

    #[must_use]
    pub fn end_point(&self) -> Vec2 {
        self.point_at(self.start_angle + self.sweep())
    }

    fn to_world(&self, local: Vec2) -> Vec2 {
        if self.rotation == 0.0 {
            return self.center + local;
        }
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(
            self.center.x + local.x * cos - local.y * sin,
            self.center.y + local.x * sin + local.y * cos,
        )
    }

    /// Cubic approximation, one curve per quarter turn or less.
    #[must_use]
    pub fn to_cubics(&self) -> SmallVec<[[Vec2; 4]; 4]> {
        let sweep = self.sweep();
        let mut cubics = SmallVec::new();
        if sweep.abs() < f64::EPSILON {
            return cubics;
        }
        let count = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / count as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let mut angle = self.start_angle;
        for _ in 0..count {
            let next = angle + step;
            let (sin_a, cos_a) = angle.sin_cos();
            let (sin_b, cos_b) = next.sin_cos();
            let unit = [
                Vec2::new(cos_a, sin_a),
                Vec2::new(cos_a - k * sin_a, sin_a + k * cos_a),
                Vec2::new(cos_b + k * sin_b, sin_b - k * cos_b),
                Vec2::new(cos_b, sin_b),
            ];
            cubics.push(unit.map(|point| self.to_world(Vec2::new(point.x * self.rx, point.y * self.ry))));
            angle = next;
        }
        cubics
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
    Arc(ArcSegment),
    Close,
}

/// Backend-facing command stream: arcs already expanded into cubics and the
/// implicit connecting segments made explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// Ordered list of path commands with canvas-style builder methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: PathCommand) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn extend(&mut self, other: &PathData) -> &mut Self {
        self.commands.extend_from_slice(&other.commands);
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(PathCommand::MoveTo(Vec2::new(x, y)))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(PathCommand::LineTo(Vec2::new(x, y)))
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        self.push(PathCommand::QuadTo {
            ctrl: Vec2::new(cx, cy),
            to: Vec2::new(x, y),
        })
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        self.push(PathCommand::CubicTo {
            ctrl1: Vec2::new(c1x, c1y),
            ctrl2: Vec2::new(c2x, c2y),
            to: Vec2::new(x, y),
        })
    }

    pub fn arc(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) -> &mut Self {
        self.push(PathCommand::Arc(ArcSegment::circular(
            cx,
            cy,
            r,
            start,
            end,
            anticlockwise,
        )))
    }

    pub fn close(&mut self) -> &mut Self {
        self.push(PathCommand::Close)
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close()
    }

    /// Rectangle with per-corner radii (top-left, top-right, bottom-right,
    /// bottom-left), scaled down proportionally when they do not fit.
    pub fn rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: [f64; 4],
    ) -> &mut Self {
        let [mut r1, mut r2, mut r3, mut r4] = radius.map(|value| value.max(0.0));
        if r1 + r2 + r3 + r4 <= 0.0 {
            return self.rect(x, y, width, height);
        }
        let fit = |a: &mut f64, b: &mut f64, extent: f64| {
            let total = *a + *b;
            if total > extent && total > 0.0 {
                *a *= extent / total;
                *b *= extent / total;
            }
        };
        fit(&mut r1, &mut r2, width);
        fit(&mut r4, &mut r3, width);
        fit(&mut r2, &mut r3, height);
        fit(&mut r1, &mut r4, height);

        let right = x + width;
        let bottom = y + height;
        self.move_to(x + r1, y).line_to(right - r2, y);
        if r2 > 0.0 {
            self.quad_to(right, y, right, y + r2);
        }
        self.line_to(right, bottom - r3);
        if r3 > 0.0 {
            self.quad_to(right, bottom, right - r3, bottom);
        }
        self.line_to(x + r4, bottom);
        if r4 > 0.0 {
            self.quad_to(x, bottom, x, bottom - r4);
        }
        self.line_to(x, y + r1);
        if r1 > 0.0 {
            self.quad_to(x, y, x + r1, y);
        }
        self.close()
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) -> &mut Self {
        self.push(PathCommand::Arc(ArcSegment::circular(cx, cy, r, 0.0, TAU, false)))
            .close()
    }

    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) -> &mut Self {
        self.push(PathCommand::Arc(ArcSegment {
            center: Vec2::new(cx, cy),
            rx,
            ry,
            start_angle: 0.0,
            end_angle: TAU,
            rotation: 0.0,
            anticlockwise: false,
        }))
        .close()
    }

    pub fn polyline(&mut self, points: &[Vec2]) -> &mut Self {
        if let Some((first, rest)) = points.split_first() {
            self.move_to(first.x, first.y);
            for point in rest {
                self.line_to(point.x, point.y);
            }
        }
        self
    }

    /// Expands arcs and makes implicit connecting lines explicit.
    #[must_use]
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut out = Vec::with_capacity(self.commands.len());
        let mut has_current = false;
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(point) => {
                    out.push(DrawCommand::MoveTo(*point));
                    has_current = true;
                }
                PathCommand::LineTo(point) => {
                    out.push(if has_current {
                        DrawCommand::LineTo(*point)
                    } else {
                        DrawCommand::MoveTo(*point)
                    });
                    has_current = true;
                }
                PathCommand::QuadTo { ctrl, to } => {
                    if !has_current {
                        out.push(DrawCommand::MoveTo(*ctrl));
                    }
                    out.push(DrawCommand::QuadTo(*ctrl, *to));
                    has_current = true;
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    if !has_current {
                        out.push(DrawCommand::MoveTo(*ctrl1));
                    }
                    out.push(DrawCommand::CubicTo(*ctrl1, *ctrl2, *to));
                    has_current = true;
                }
                PathCommand::Arc(arc) => {
                    let start = arc.start_point();
                    out.push(if has_current {
                        DrawCommand::LineTo(start)
                    } else {
                        DrawCommand::MoveTo(start)
                    });
                    has_current = true;
                    for [_, c1, c2, to] in arc.to_cubics() {
                        out.push(DrawCommand::CubicTo(c1, c2, to));
                    }
                }
                PathCommand::Close => {
                    if has_current {
                        out.push(DrawCommand::Close);
                    }
                }
            }
        }
        out
    }

    /// Tight axis-aligned bounds using curve extrema.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut points: Vec<Vec2> = Vec::new();
        let mut current = Vec2::ZERO;
        for command in self.draw_commands() {
            match command {
                DrawCommand::MoveTo(point) | DrawCommand::LineTo(point) => {
                    points.push(point);
                    current = point;
                }
                DrawCommand::QuadTo(ctrl, to) => {
                    points.push(to);
                    for axis_t in [
                        quadratic_extremum(current.x, ctrl.x, to.x),
                        quadratic_extremum(current.y, ctrl.y, to.y),
                    ] {
                        if (0.0..=1.0).contains(&axis_t) {
                            points.push(Vec2::new(
                                quadratic_at(current.x, ctrl.x, to.x, axis_t),
                                quadratic_at(current.y, ctrl.y, to.y, axis_t),
                            ));
                        }
                    }
                    current = to;
                }
                DrawCommand::CubicTo(c1, c2, to) => {
                    points.push(to);
                    let extrema_x = cubic_extrema(current.x, c1.x, c2.x, to.x);
                    let extrema_y = cubic_extrema(current.y, c1.y, c2.y, to.y);
                    for t in extrema_x.into_iter().chain(extrema_y) {
                        points.push(Vec2::new(
                            cubic_at(current.x, c1.x, c2.x, to.x, t),
                            cubic_at(current.y, c1.y, c2.y, to.y, t),
                        ));
                    }
                    current = to;
                }
                DrawCommand::Close => {}
            }
        }
        Rect::from_points(points.into_iter().filter(|point| point.is_finite()))
    }

    /// Non-zero fill containment.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        contain_path(self, None, x, y)
    }

    /// Stroke containment with the given hit width.
    #[must_use]
    pub fn contains_stroke(&self, width: f64, x: f64, y: f64) -> bool {
        contain_path(self, Some(width), x, y)
    }

    /// Applies an affine transform to every point. Arcs keep their shape only
    /// under similarity transforms, so they are expanded to cubics first.
    #[must_use]
    pub fn transformed(&self, matrix: &super::Matrix) -> Self {
        let mut out = Self::new();
        for command in self.draw_commands() {
            out.push(match command {
                DrawCommand::MoveTo(point) => PathCommand::MoveTo(matrix.apply(point)),
                DrawCommand::LineTo(point) => PathCommand::LineTo(matrix.apply(point)),
                DrawCommand::QuadTo(ctrl, to) => PathCommand::QuadTo {
                    ctrl: matrix.apply(ctrl),
                    to: matrix.apply(to),
                },
                DrawCommand::CubicTo(c1, c2, to) => PathCommand::CubicTo {
                    ctrl1: matrix.apply(c1),
                    ctrl2: matrix.apply(c2),
                    to: matrix.apply(to),
                },
                DrawCommand::Close => PathCommand::Close,
            });
        }
        out
    }

    /// Parses SVG path data (`M L H V C S Q T A Z`, absolute and relative).
    pub fn parse_svg(data: &str) -> SceneResult<Self> {
        SvgPathParser::new(data).parse()
    }
}

struct SvgPathParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: PathData,
    current: Vec2,
    subpath_start: Vec2,
    last_ctrl: Option<(u8, Vec2)>,
}

impl<'a> SvgPathParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
            path: PathData::new(),
            current: Vec2::ZERO,
            subpath_start: Vec2::ZERO,
            last_ctrl: None,
        }
    }

    fn parse(mut self) -> SceneResult<PathData> {
        let mut command: Option<u8> = None;
        loop {
            self.skip_separators();
            let Some(&byte) = self.bytes.get(self.pos) else {
                break;
            };
            if byte.is_ascii_alphabetic() {
                self.pos += 1;
                if !b"MmLlHhVvCcSsQqTtAaZz".contains(&byte) {
                    return Err(SceneError::InvalidData(format!(
                        "unsupported path command `{}`",
                        byte as char
                    )));
                }
                command = Some(byte);
                if byte == b'Z' || byte == b'z' {
                    self.path.close();
                    self.current = self.subpath_start;
                    self.last_ctrl = None;
                    command = None;
                    continue;
                }
            }
            let Some(active) = command else {
                return Err(SceneError::InvalidData(format!(
                    "path data must start with a command at offset {}",
                    self.pos
                )));
            };
            self.apply(active)?;
            // Extra coordinate pairs after a move are implicit line-tos.
            command = match active {
                b'M' => Some(b'L'),
                b'm' => Some(b'l'),
                other => Some(other),
            };
        }
        Ok(self.path)
    }

    fn apply(&mut self, command: u8) -> SceneResult<()> {
        let relative = command.is_ascii_lowercase();
        let origin = if relative { self.current } else { Vec2::ZERO };
        let upper = command.to_ascii_uppercase();
        match upper {
            b'M' => {
                let point = self.point()? + origin;
                self.path.move_to(point.x, point.y);
                self.current = point;
                self.subpath_start = point;
                self.last_ctrl = None;
            }
            b'L' => {
                let point = self.point()? + origin;
                self.path.line_to(point.x, point.y);
                self.current = point;
                self.last_ctrl = None;
            }
            b'H' => {
                let x = self.number()? + origin.x;
                self.current = Vec2::new(x, self.current.y);
                self.path.line_to(self.current.x, self.current.y);
                self.last_ctrl = None;
            }
            b'V' => {
                let y = self.number()? + origin.y;
                self.current = Vec2::new(self.current.x, y);
                self.path.line_to(self.current.x, self.current.y);
                self.last_ctrl = None;
            }
            b'C' => {
                let c1 = self.point()? + origin;
                let c2 = self.point()? + origin;
                let to = self.point()? + origin;
                self.path.cubic_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
                self.current = to;
                self.last_ctrl = Some((b'C', c2));
            }
            b'S' => {
                let c1 = self.reflected_ctrl(b'C');
                let c2 = self.point()? + origin;
                let to = self.point()? + origin;
                self.path.cubic_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
                self.current = to;
                self.last_ctrl = Some((b'C', c2));
            }
            b'Q' => {
                let ctrl = self.point()? + origin;
                let to = self.point()? + origin;
                self.path.quad_to(ctrl.x, ctrl.y, to.x, to.y);
                self.current = to;
                self.last_ctrl = Some((b'Q', ctrl));
            }
            b'T' => {
                let ctrl = self.reflected_ctrl(b'Q');
                let to = self.point()? + origin;
                self.path.quad_to(ctrl.x, ctrl.y, to.x, to.y);
                self.current = to;
                self.last_ctrl = Some((b'Q', ctrl));
            }
            b'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let rotation = self.number()?.to_radians();
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = self.point()? + origin;
                match endpoint_to_center(self.current, to, rx, ry, rotation, large_arc, sweep) {
                    Some(arc) => {
                        self.path.push(PathCommand::Arc(arc));
                    }
                    None => {
                        self.path.line_to(to.x, to.y);
                    }
                }
                self.current = to;
                self.last_ctrl = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn reflected_ctrl(&self, kind: u8) -> Vec2 {
        match self.last_ctrl {
            Some((last_kind, ctrl)) if last_kind == kind => self.current * 2.0 - ctrl,
            _ => self.current,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte.is_ascii_whitespace() || byte == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn point(&mut self) -> SceneResult<Vec2> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Vec2::new(x, y))
    }

    fn flag(&mut self) -> SceneResult<bool> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(SceneError::InvalidData(format!(
                "expected arc flag at offset {}",
                self.pos
            ))),
        }
    }

    fn number(&mut self) -> SceneResult<f64> {
        self.skip_separators();
        let start = self.pos;
        let mut seen_dot = false;
        let mut seen_exp = false;
        if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    self.pos += 1;
                }
                b'e' | b'E' if !seen_exp => {
                    seen_exp = true;
                    self.pos += 1;
                    if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default();
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                SceneError::InvalidData(format!("expected number at offset {start}"))
            })
    }
}

/// Converts SVG endpoint arc parameters into a center-parameterised arc.
/// Returns `None` when the arc degenerates into a straight line.
fn endpoint_to_center(
    from: Vec2,
    to: Vec2,
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
) -> Option<ArcSegment> {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx < f64::EPSILON || ry < f64::EPSILON || from == to {
        return None;
    }
    let (sin, cos) = rotation.sin_cos();
    let dx2 = (from.x - to.x) * 0.5;
    let dy2 = (from.y - to.y) * 0.5;
    let x1p = cos * dx2 + sin * dy2;
    let y1p = -sin * dx2 + cos * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let numerator = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let denominator = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    if denominator <= f64::EPSILON {
        return None;
    }
    let mut coef = (numerator / denominator).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let center = Vec2::new(
        cos * cxp - sin * cyp + (from.x + to.x) * 0.5,
        sin * cxp + cos * cyp + (from.y + to.y) * 0.5,
    );

    let vector_angle = |u: Vec2, v: Vec2| u.cross(v).atan2(u.dot(v));
    let u = Vec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = Vec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let start_angle = vector_angle(Vec2::new(1.0, 0.0), u);
    let mut delta = vector_angle(u, v) % TAU;
    if !sweep && delta > 0.0 {
        delta -= TAU;
    } else if sweep && delta < 0.0 {
        delta += TAU;
    }

    Some(ArcSegment {
        center,
        rx,
        ry,
        start_angle,
        end_angle: start_angle + delta,
        rotation,
        anticlockwise: delta < 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_parser_handles_relative_and_implicit_commands() {
        let path = PathData::parse_svg("m10 10 l20 0 0 20 h-20z").expect("valid path");
        let commands = path.commands();
        assert_eq!(commands[0], PathCommand::MoveTo(Vec2::new(10.0, 10.0)));
        assert_eq!(commands[1], PathCommand::LineTo(Vec2::new(30.0, 10.0)));
        assert_eq!(commands[2], PathCommand::LineTo(Vec2::new(30.0, 30.0)));
        assert_eq!(commands[3], PathCommand::LineTo(Vec2::new(10.0, 30.0)));
        assert_eq!(commands[4], PathCommand::Close);
        assert!(path.contains(20.0, 20.0));
    }

    #[test]
    fn svg_smooth_cubic_reflects_previous_control() {
        let path = PathData::parse_svg("M0,0 C10,-10 20,-10 30,0 S50,10 60,0").expect("valid");
        match path.commands()[2] {
            PathCommand::CubicTo { ctrl1, .. } => assert_eq!(ctrl1, Vec2::new(40.0, 10.0)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn svg_arc_reaches_endpoint() {
        let path = PathData::parse_svg("M0 0 A50 50 0 0 1 100 0").expect("valid");
        let PathCommand::Arc(arc) = path.commands()[1] else {
            panic!("expected arc");
        };
        let end = arc.end_point();
        assert!(end.distance(Vec2::new(100.0, 0.0)) < 1e-9);
        assert!(arc.center.distance(Vec2::new(50.0, 0.0)) < 1e-9);
        // Sweep flag 1 turns clockwise on a y-down canvas, passing above the chord.
        let bounds = path.bounding_rect().expect("bounds");
        assert!(bounds.min().y < -49.0);
        assert!(bounds.max().y < 1e-6);
    }

    #[test]
    fn svg_parser_rejects_garbage() {
        assert!(PathData::parse_svg("10 10").is_err());
        assert!(PathData::parse_svg("M 10").is_err());
        assert!(PathData::parse_svg("M0 0 X 1 1").is_err());
    }

    #[test]
    fn bounds_include_curve_extrema() {
        let mut path = PathData::new();
        path.move_to(0.0, 0.0).cubic_to(0.0, -40.0, 100.0, -40.0, 100.0, 0.0);
        let bounds = path.bounding_rect().expect("bounds");
        assert!((bounds.y + 30.0).abs() < 1e-6);
        assert!((bounds.width - 100.0).abs() < 1e-9);
    }

    #[test]
    fn circle_bounds_match_radius() {
        let mut path = PathData::new();
        path.circle(10.0, 10.0, 5.0);
        let bounds = path.bounding_rect().expect("bounds");
        assert!((bounds.x - 5.0).abs() < 1e-6);
        assert!((bounds.width - 10.0).abs() < 1e-6);
    }
}
