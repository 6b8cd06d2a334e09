use crate::core::{Matrix, PathData, Rect};
use crate::error::{SceneError, SceneResult};
use crate::shape::RasterImage;

use super::surface::{StrokeParams, Surface, SurfaceBackend, TextRun};
use super::Color;

/// Draw-call counters recorded by a [`NullSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawCounts {
    pub clears: usize,
    pub fills: usize,
    pub strokes: usize,
    pub texts: usize,
    pub images: usize,
    pub clips: usize,
    pub composites: usize,
}

impl DrawCounts {
    #[must_use]
    pub fn draws(&self) -> usize {
        self.fills + self.strokes + self.texts + self.images
    }
}

/// Surface that records draw calls instead of rasterising.
///
/// It still validates its inputs so tests can catch invalid geometry without
/// a real backend.
#[derive(Debug, Clone, Default)]
pub struct NullSurface {
    width: u32,
    height: u32,
    clip_depth: usize,
    counts: DrawCounts,
    generation: u64,
}

impl NullSurface {
    #[must_use]
    pub fn counts(&self) -> DrawCounts {
        self.counts
    }

    /// Incremented on every clear; lets tests detect repaints.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset_counts(&mut self) {
        self.counts = DrawCounts::default();
    }
}

fn ensure_finite_matrix(transform: &Matrix) -> SceneResult<()> {
    let values = [
        transform.a,
        transform.b,
        transform.c,
        transform.d,
        transform.e,
        transform.f,
    ];
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::InvalidGeometry(
            "transform must be finite".to_owned(),
        ))
    }
}

impl Surface for NullSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, _color: Option<Color>) {
        self.counts.clears += 1;
        self.clip_depth = 0;
        self.generation += 1;
    }

    fn push_clip(&mut self, _path: &PathData, transform: &Matrix) -> SceneResult<()> {
        ensure_finite_matrix(transform)?;
        self.clip_depth += 1;
        self.counts.clips += 1;
        Ok(())
    }

    fn pop_clip(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
    }

    fn fill_path(&mut self, _path: &PathData, transform: &Matrix, color: Color) -> SceneResult<()> {
        ensure_finite_matrix(transform)?;
        color.validate()?;
        self.counts.fills += 1;
        Ok(())
    }

    fn stroke_path(
        &mut self,
        _path: &PathData,
        transform: &Matrix,
        color: Color,
        stroke: &StrokeParams<'_>,
    ) -> SceneResult<()> {
        ensure_finite_matrix(transform)?;
        color.validate()?;
        if !stroke.width.is_finite() {
            return Err(SceneError::InvalidGeometry(
                "stroke width must be finite".to_owned(),
            ));
        }
        self.counts.strokes += 1;
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: &Matrix) -> SceneResult<()> {
        ensure_finite_matrix(transform)?;
        run.color.validate()?;
        self.counts.texts += 1;
        Ok(())
    }

    fn draw_image(
        &mut self,
        _image: &RasterImage,
        dest: Rect,
        transform: &Matrix,
        _opacity: f64,
    ) -> SceneResult<()> {
        ensure_finite_matrix(transform)?;
        if !dest.is_finite() {
            return Err(SceneError::InvalidGeometry(
                "image destination must be finite".to_owned(),
            ));
        }
        self.counts.images += 1;
        Ok(())
    }

    fn composite(&mut self, _source: &Self, _alpha: f64) -> SceneResult<()> {
        self.counts.composites += 1;
        Ok(())
    }

    fn read_pixels(&self) -> SceneResult<Vec<u8>> {
        Ok(vec![0; self.width as usize * self.height as usize * 4])
    }
}

/// Headless backend handing out [`NullSurface`]s.
#[derive(Debug, Clone, Default)]
pub struct NullBackend {
    /// Largest surface edge accepted; larger requests fail as exhausted.
    pub max_dimension: Option<u32>,
    pub surfaces_created: usize,
}

impl NullBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: Some(max_dimension),
            surfaces_created: 0,
        }
    }
}

impl SurfaceBackend for NullBackend {
    type Surface = NullSurface;

    fn name(&self) -> &'static str {
        "null"
    }

    fn create_surface(&mut self, width: u32, height: u32) -> SceneResult<NullSurface> {
        let too_large = self
            .max_dimension
            .is_some_and(|max| width > max || height > max);
        if width == 0 || height == 0 || too_large {
            return Err(SceneError::ResourceExhausted { width, height });
        }
        self.surfaces_created += 1;
        Ok(NullSurface {
            width,
            height,
            ..NullSurface::default()
        })
    }
}
