use crate::core::{Matrix, PathData, Rect, TextAlign, TextBaseline};
use crate::error::SceneResult;
use crate::shape::{LineCap, LineJoin, RasterImage};

use super::Color;

/// Stroke parameters resolved from a paint style.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParams<'a> {
    pub width: f64,
    pub dash: &'a [f64],
    pub cap: LineCap,
    pub join: LineJoin,
}

/// One text draw request, anchored the way text shapes are.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
}

/// Raster target the painter draws into.
///
/// Transforms map shape-local coordinates to surface pixels. Clips pushed
/// with `push_clip` intersect until popped.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resets every pixel to `color`, or to transparent.
    fn clear(&mut self, color: Option<Color>);

    fn push_clip(&mut self, path: &PathData, transform: &Matrix) -> SceneResult<()>;

    fn pop_clip(&mut self);

    fn fill_path(&mut self, path: &PathData, transform: &Matrix, color: Color) -> SceneResult<()>;

    fn stroke_path(
        &mut self,
        path: &PathData,
        transform: &Matrix,
        color: Color,
        stroke: &StrokeParams<'_>,
    ) -> SceneResult<()>;

    fn draw_text(&mut self, run: &TextRun<'_>, transform: &Matrix) -> SceneResult<()>;

    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        transform: &Matrix,
        opacity: f64,
    ) -> SceneResult<()>;

    /// Source-over composition of another surface of the same backend.
    fn composite(&mut self, source: &Self, alpha: f64) -> SceneResult<()>;

    /// Straight-alpha RGBA8 pixels, row-major.
    fn read_pixels(&self) -> SceneResult<Vec<u8>>;
}

/// Factory for surfaces of one backend.
pub trait SurfaceBackend {
    type Surface: Surface;

    fn name(&self) -> &'static str;

    fn create_surface(&mut self, width: u32, height: u32) -> SceneResult<Self::Surface>;
}
