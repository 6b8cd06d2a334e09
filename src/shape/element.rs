use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Matrix, PathData, Rect, Smoothing, TextAlign, TextBaseline, Vec2};
use crate::error::{SceneError, SceneResult};
use crate::interaction::{EventCallback, EventHandlers, EventKind};

use super::{
    ElementId, PaintPatch, PaintStyle, PropValue, RasterImage, ShapeKind, Transform, Transformable,
};

/// Interaction capabilities. A shape with every flag cleared is silent: the
/// hit tester skips it entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFlags {
    pub draggable: bool,
    pub clickable: bool,
    pub hoverable: bool,
}

impl Default for ShapeFlags {
    fn default() -> Self {
        Self {
            draggable: false,
            clickable: false,
            hoverable: true,
        }
    }
}

impl ShapeFlags {
    #[must_use]
    pub fn is_silent(self) -> bool {
        !self.draggable && !self.clickable && !self.hoverable
    }
}

/// Geometry constraining its owner's painting and hit-testing, expressed in
/// the owner's local coordinate space. Clips are shared, never painted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub kind: ShapeKind,
    pub transform: Transform,
}

impl ClipPath {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            transform: Transform::default(),
        })
    }

    /// Containment of a world-space point, given the world matrix of the
    /// space the clip is defined in.
    #[must_use]
    pub fn contains(&self, world: &Matrix, x: f64, y: f64) -> bool {
        let matrix = world.multiply(&self.transform.matrix());
        let Some(inverse) = matrix.invert() else {
            return false;
        };
        let local = inverse.apply(Vec2::new(x, y));
        self.kind
            .contains(&PaintStyle::default(), 0.0, local.x, local.y)
    }
}

/// Partial update applied through `Storage::mutate`.
///
/// Geometry updates are keyed (for example `"x"`, `"r"`, `"points"`); paint
/// fields merge field by field; everything else replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub geometry: SmallVec<[(String, PropValue); 4]>,
    pub paint: Option<PaintPatch>,
    pub highlight: Option<PaintPatch>,
    pub position: Option<Vec2>,
    pub rotation: Option<f64>,
    pub scale: Option<Vec2>,
    pub z_tier: Option<i32>,
    pub z_order: Option<f64>,
    pub invisible: Option<bool>,
    pub ignore: Option<bool>,
}

impl ShapePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn geometry(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.geometry.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn paint(mut self, patch: PaintPatch) -> Self {
        match &mut self.paint {
            Some(existing) => existing.merge(&patch),
            None => self.paint = Some(patch),
        }
        self
    }

    #[must_use]
    pub fn highlight(mut self, patch: PaintPatch) -> Self {
        self.highlight = Some(patch);
        self
    }

    #[must_use]
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Vec2::new(x, y));
        self
    }

    #[must_use]
    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    #[must_use]
    pub fn scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Some(Vec2::new(sx, sy));
        self
    }

    #[must_use]
    pub fn z_tier(mut self, z_tier: i32) -> Self {
        self.z_tier = Some(z_tier);
        self
    }

    #[must_use]
    pub fn z_order(mut self, z_order: f64) -> Self {
        self.z_order = Some(z_order);
        self
    }

    #[must_use]
    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = Some(invisible);
        self
    }

    #[must_use]
    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = Some(ignore);
        self
    }
}

/// Atomic drawable.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ElementId,
    parent: Option<ElementId>,
    pub kind: ShapeKind,
    pub style: PaintStyle,
    pub highlight_style: Option<PaintPatch>,
    pub transform: Transform,
    pub z_tier: i32,
    pub z_order: f64,
    pub invisible: bool,
    pub ignore: bool,
    pub flags: ShapeFlags,
    pub clip: Option<Rc<ClipPath>>,
    /// Shapes highlighted together with this one while it is hovered.
    pub hover_links: SmallVec<[ElementId; 2]>,
    pub handlers: EventHandlers,
    bounds: Cell<Option<Rect>>,
}

impl Shape {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ElementId::next(),
            parent: None,
            kind,
            style: PaintStyle::default(),
            highlight_style: None,
            transform: Transform::default(),
            z_tier: 0,
            z_order: 0.0,
            invisible: false,
            ignore: false,
            flags: ShapeFlags::default(),
            clip: None,
            hover_links: SmallVec::new(),
            handlers: EventHandlers::default(),
            bounds: Cell::new(None),
        }
    }

    #[must_use]
    pub fn line(x_start: f64, y_start: f64, x_end: f64, y_end: f64) -> Self {
        Self::new(ShapeKind::Line {
            x_start,
            y_start,
            x_end,
            y_end,
        })
    }

    #[must_use]
    pub fn circle(x: f64, y: f64, r: f64) -> Self {
        Self::new(ShapeKind::Circle { x, y, r })
    }

    #[must_use]
    pub fn ellipse(x: f64, y: f64, a: f64, b: f64) -> Self {
        Self::new(ShapeKind::Ellipse { x, y, a, b })
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rectangle {
            x,
            y,
            width,
            height,
            radius: [0.0; 4],
        })
    }

    #[must_use]
    pub fn sector(x: f64, y: f64, r0: f64, r: f64, start_angle: f64, end_angle: f64) -> Self {
        Self::new(ShapeKind::Sector {
            x,
            y,
            r0,
            r,
            start_angle,
            end_angle,
            anticlockwise: false,
        })
    }

    #[must_use]
    pub fn ring(x: f64, y: f64, r0: f64, r: f64) -> Self {
        Self::new(ShapeKind::Ring { x, y, r0, r })
    }

    #[must_use]
    pub fn polyline(points: Vec<Vec2>, smoothing: Smoothing) -> Self {
        Self::new(ShapeKind::Polyline { points, smoothing })
    }

    #[must_use]
    pub fn polygon(points: Vec<Vec2>, smoothing: Smoothing) -> Self {
        Self::new(ShapeKind::Polygon { points, smoothing })
    }

    #[must_use]
    pub fn text(x: f64, y: f64, text: impl Into<String>, font_size: f64) -> Self {
        Self::new(ShapeKind::Text {
            x,
            y,
            text: text.into(),
            font_size,
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
        })
    }

    #[must_use]
    pub fn image(x: f64, y: f64, width: f64, height: f64, image: Rc<RasterImage>) -> Self {
        Self::new(ShapeKind::Image {
            x,
            y,
            width,
            height,
            image,
        })
    }

    #[must_use]
    pub fn path(path: PathData) -> Self {
        Self::new(ShapeKind::Path(path))
    }

    /// Path shape from SVG path data.
    pub fn svg_path(data: &str) -> SceneResult<Self> {
        Ok(Self::path(PathData::parse_svg(data)?))
    }

    #[must_use]
    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, patch: PaintPatch) -> Self {
        self.highlight_style = Some(patch);
        self
    }

    #[must_use]
    pub fn with_z(mut self, z_tier: i32, z_order: f64) -> Self {
        self.z_tier = z_tier;
        self.z_order = z_order;
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f64, origin: Vec2) -> Self {
        self.transform.rotation = rotation;
        self.transform.rotation_origin = origin;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, sx: f64, sy: f64, origin: Vec2) -> Self {
        self.transform.scale = Vec2::new(sx, sy);
        self.transform.scale_origin = origin;
        self
    }

    #[must_use]
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.flags.draggable = draggable;
        self
    }

    #[must_use]
    pub fn clickable(mut self, clickable: bool) -> Self {
        self.flags.clickable = clickable;
        self
    }

    #[must_use]
    pub fn hoverable(mut self, hoverable: bool) -> Self {
        self.flags.hoverable = hoverable;
        self
    }

    #[must_use]
    pub fn with_clip(mut self, clip: Rc<ClipPath>) -> Self {
        self.clip = Some(clip);
        self
    }

    #[must_use]
    pub fn with_hover_link(mut self, id: ElementId) -> Self {
        self.hover_links.push(id);
        self
    }

    #[must_use]
    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    /// Registers an element-level handler.
    #[must_use]
    pub fn on(mut self, kind: EventKind, callback: EventCallback) -> Self {
        self.handlers.on(kind, callback);
        self
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    /// Cached local bounds; recomputed after any mutation.
    pub fn local_bounds(&self) -> SceneResult<Rect> {
        if let Some(bounds) = self.bounds.get() {
            return Ok(bounds);
        }
        let bounds = self.kind.local_bounds(&self.style)?;
        self.bounds.set(Some(bounds));
        Ok(bounds)
    }

    pub fn invalidate_bounds(&self) {
        self.bounds.set(None);
    }

    /// Style actually painted: highlight merged in while hovered.
    #[must_use]
    pub fn resolved_style(&self, hovered: bool) -> PaintStyle {
        if hovered {
            self.style.highlighted(self.highlight_style.as_ref())
        } else {
            self.style.clone()
        }
    }

    /// Exact hit test of a world-space point against this shape placed with
    /// `world` (which already includes the shape's own transform).
    #[must_use]
    pub fn hit_test(&self, world: &Matrix, min_stroke_width: f64, x: f64, y: f64) -> bool {
        let Some(inverse) = world.invert() else {
            return false;
        };
        let local = inverse.apply(Vec2::new(x, y));
        match self.local_bounds() {
            Ok(bounds) => {
                let slack = min_stroke_width * 0.5;
                if !bounds.inflate(slack).contains(local.x, local.y) {
                    return false;
                }
            }
            Err(_) => return false,
        }
        self.kind
            .contains(&self.style, min_stroke_width, local.x, local.y)
    }

    /// Applies a partial update. Geometry keys are applied to a copy first so
    /// an invalid key leaves the shape untouched.
    pub fn apply_patch(&mut self, patch: &ShapePatch) -> SceneResult<()> {
        if !patch.geometry.is_empty() {
            let mut kind = self.kind.clone();
            for (key, value) in &patch.geometry {
                kind.set_property(key, value)?;
            }
            self.kind = kind;
        }
        if let Some(paint) = &patch.paint {
            self.style.apply(paint);
        }
        if let Some(highlight) = &patch.highlight {
            match &mut self.highlight_style {
                Some(existing) => existing.merge(highlight),
                None => self.highlight_style = Some(highlight.clone()),
            }
        }
        if let Some(position) = patch.position {
            self.transform.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.transform.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.transform.scale = scale;
        }
        if let Some(z_tier) = patch.z_tier {
            self.z_tier = z_tier;
        }
        if let Some(z_order) = patch.z_order {
            self.z_order = z_order;
        }
        if let Some(invisible) = patch.invisible {
            self.invisible = invisible;
        }
        if let Some(ignore) = patch.ignore {
            self.ignore = ignore;
        }
        self.invalidate_bounds();
        Ok(())
    }

    /// Reads a property by path: `position`, `rotation`, `scale`, `z_order`,
    /// or `style.<key>` for paint and geometry fields.
    #[must_use]
    pub fn get_property(&self, path: &str) -> Option<PropValue> {
        match path {
            "position" => Some(self.transform.position.into()),
            "rotation" => Some(PropValue::Number(self.transform.rotation)),
            "scale" => Some(self.transform.scale.into()),
            "z_order" => Some(PropValue::Number(self.z_order)),
            _ => {
                let key = path.strip_prefix("style.")?;
                self.style
                    .get_property(key)
                    .or_else(|| self.kind.get_property(key))
            }
        }
    }

    pub fn set_property(&mut self, path: &str, value: &PropValue) -> SceneResult<()> {
        match path {
            "position" => self.transform.position = value.as_point(path)?,
            "rotation" => self.transform.rotation = value.as_number(path)?,
            "scale" => self.transform.scale = value.as_point(path)?,
            "z_order" => self.z_order = value.as_number(path)?,
            _ => {
                let key = path.strip_prefix("style.").ok_or_else(|| {
                    SceneError::InvalidData(format!("unknown property path `{path}`"))
                })?;
                if !self.style.set_property(key, value)? {
                    self.kind.set_property(key, value)?;
                }
            }
        }
        self.invalidate_bounds();
        Ok(())
    }
}

impl Transformable for Shape {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// Container whose transform composes with its descendants'. Children added
/// before the group is inserted are held until registration.
#[derive(Debug, Clone)]
pub struct Group {
    id: ElementId,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    pending: Vec<Element>,
    pub transform: Transform,
    pub clip: Option<Rc<ClipPath>>,
    pub ignore: bool,
    pub handlers: EventHandlers,
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ElementId::next(),
            parent: None,
            children: Vec::new(),
            pending: Vec::new(),
            transform: Transform::default(),
            clip: None,
            ignore: false,
            handlers: EventHandlers::default(),
        }
    }

    /// Queues a child for registration together with the group.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Element>) -> Self {
        self.pending.push(child.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    #[must_use]
    pub fn with_clip(mut self, clip: Rc<ClipPath>) -> Self {
        self.clip = Some(clip);
        self
    }

    #[must_use]
    pub fn on(mut self, kind: EventKind, callback: EventCallback) -> Self {
        self.handlers.on(kind, callback);
        self
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Registered children in paint order.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    pub(crate) fn pending(&self) -> &[Element] {
        &self.pending
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn push_child_id(&mut self, id: ElementId) {
        self.children.push(id);
    }

    pub(crate) fn remove_child_id(&mut self, id: ElementId) {
        self.children.retain(|child| *child != id);
    }

    #[must_use]
    pub fn get_property(&self, path: &str) -> Option<PropValue> {
        match path {
            "position" => Some(self.transform.position.into()),
            "rotation" => Some(PropValue::Number(self.transform.rotation)),
            "scale" => Some(self.transform.scale.into()),
            _ => None,
        }
    }

    pub fn set_property(&mut self, path: &str, value: &PropValue) -> SceneResult<()> {
        match path {
            "position" => self.transform.position = value.as_point(path)?,
            "rotation" => self.transform.rotation = value.as_number(path)?,
            "scale" => self.transform.scale = value.as_point(path)?,
            _ => {
                return Err(SceneError::InvalidData(format!(
                    "unknown group property path `{path}`"
                )));
            }
        }
        Ok(())
    }
}

impl Transformable for Group {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// Node of the scene graph.
#[derive(Debug, Clone)]
pub enum Element {
    Shape(Shape),
    Group(Group),
}

impl Element {
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Shape(shape) => shape.id(),
            Self::Group(group) => group.id(),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        match self {
            Self::Shape(shape) => shape.parent(),
            Self::Group(group) => group.parent(),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ElementId>) {
        match self {
            Self::Shape(shape) => shape.set_parent(parent),
            Self::Group(group) => group.set_parent(parent),
        }
    }

    #[must_use]
    pub fn handlers(&self) -> &EventHandlers {
        match self {
            Self::Shape(shape) => &shape.handlers,
            Self::Group(group) => &group.handlers,
        }
    }

    #[must_use]
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(shape) => Some(shape),
            Self::Group(_) => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Shape(_) => None,
        }
    }

    #[must_use]
    pub fn get_property(&self, path: &str) -> Option<PropValue> {
        match self {
            Self::Shape(shape) => shape.get_property(path),
            Self::Group(group) => group.get_property(path),
        }
    }

    pub fn set_property(&mut self, path: &str, value: &PropValue) -> SceneResult<()> {
        match self {
            Self::Shape(shape) => shape.set_property(path, value),
            Self::Group(group) => group.set_property(path, value),
        }
    }
}

impl Transformable for Element {
    fn transform(&self) -> &Transform {
        match self {
            Self::Shape(shape) => &shape.transform,
            Self::Group(group) => &group.transform,
        }
    }

    fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Shape(shape) => &mut shape.transform,
            Self::Group(group) => &mut group.transform,
        }
    }
}

impl From<Shape> for Element {
    fn from(shape: Shape) -> Self {
        Self::Shape(shape)
    }
}

impl From<Group> for Element {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MIN_STROKE_HIT_WIDTH;
    use crate::render::Color;

    #[test]
    fn bounds_cache_is_invalidated_by_patch() {
        let mut shape = Shape::circle(0.0, 0.0, 10.0);
        assert!((shape.local_bounds().expect("bounds").width - 20.0).abs() < 1e-6);
        shape
            .apply_patch(&ShapePatch::new().geometry("r", 20.0))
            .expect("patch");
        assert!((shape.local_bounds().expect("bounds").width - 40.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_geometry_key_leaves_shape_untouched() {
        let mut shape = Shape::circle(0.0, 0.0, 10.0);
        let patch = ShapePatch::new().geometry("x", 5.0).geometry("width", 3.0);
        assert!(shape.apply_patch(&patch).is_err());
        assert_eq!(shape.get_property("style.x"), Some(PropValue::Number(0.0)));
    }

    #[test]
    fn hit_test_respects_transform() {
        let shape = Shape::rect(0.0, 0.0, 10.0, 10.0)
            .with_style(PaintStyle::filled(Color::BLACK))
            .with_position(100.0, 0.0);
        let world = shape.local_matrix();
        assert!(shape.hit_test(&world, MIN_STROKE_HIT_WIDTH, 105.0, 5.0));
        assert!(!shape.hit_test(&world, MIN_STROKE_HIT_WIDTH, 5.0, 5.0));
    }

    #[test]
    fn silent_shapes_have_no_flags() {
        let shape = Shape::circle(0.0, 0.0, 1.0).hoverable(false);
        assert!(shape.flags.is_silent());
        assert!(!Shape::circle(0.0, 0.0, 1.0).flags.is_silent());
    }

    #[test]
    fn property_paths_reach_paint_and_geometry() {
        let mut shape = Shape::circle(0.0, 0.0, 10.0);
        shape
            .set_property("style.fill", &PropValue::Color(Color::WHITE))
            .expect("fill");
        shape
            .set_property("style.r", &PropValue::Number(4.0))
            .expect("r");
        shape
            .set_property("position", &PropValue::Array(vec![1.0, 2.0]))
            .expect("position");
        assert_eq!(shape.style.fill, Some(Color::WHITE));
        assert_eq!(shape.get_property("style.r"), Some(PropValue::Number(4.0)));
        assert!(shape.set_property("bogus", &PropValue::Number(1.0)).is_err());
    }
}
