//! Primitive model: drawable shapes, groups and their paint/transform state.

mod element;
mod id;
mod image;
mod kind;
mod style;
mod transform;
mod value;

pub use element::{ClipPath, Element, Group, Shape, ShapeFlags, ShapePatch};
pub use id::ElementId;
pub use image::RasterImage;
pub use kind::{Geometry, ShapeKind};
pub use style::{DEFAULT_HIGHLIGHT_LIFT, LineCap, LineJoin, PaintPatch, PaintStyle};
pub use transform::{Transform, Transformable};
pub use value::PropValue;
