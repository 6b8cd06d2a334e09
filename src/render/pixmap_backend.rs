use std::rc::Rc;

use fontdue::{Font, FontSettings};
use tiny_skia::{
    FillRule, IntSize, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};
use tracing::{debug, warn};

use crate::core::{DrawCommand, Matrix, PathData, Rect, TextBaseline, TextAlign};
use crate::error::{SceneError, SceneResult};
use crate::shape::{LineCap, LineJoin, RasterImage};

use super::surface::{StrokeParams, Surface, SurfaceBackend, TextRun};
use super::Color;

/// Environment variable naming a TTF/OTF file used for text rendering.
pub const FONT_PATH_ENV: &str = "SCENIC_FONT_PATH";

/// CPU raster backend built on tiny-skia. Text is rasterised with fontdue
/// when a font is available and skipped otherwise.
#[derive(Clone, Default)]
pub struct PixmapBackend {
    font: Option<Rc<Font>>,
}

impl std::fmt::Debug for PixmapBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapBackend")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl PixmapBackend {
    /// Backend using the font named by `SCENIC_FONT_PATH`, if any.
    #[must_use]
    pub fn new() -> Self {
        let font = std::env::var(FONT_PATH_ENV)
            .ok()
            .and_then(|path| match std::fs::read(&path) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    warn!(path, error = %err, "failed to read font file");
                    None
                }
            })
            .and_then(|bytes| Font::from_bytes(bytes, FontSettings::default()).ok())
            .map(Rc::new);
        Self { font }
    }

    pub fn with_font_bytes(bytes: Vec<u8>) -> SceneResult<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| SceneError::Backend(format!("failed to load font: {err}")))?;
        Ok(Self {
            font: Some(Rc::new(font)),
        })
    }

    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl SurfaceBackend for PixmapBackend {
    type Surface = PixmapSurface;

    fn name(&self) -> &'static str {
        "tiny-skia"
    }

    fn create_surface(&mut self, width: u32, height: u32) -> SceneResult<PixmapSurface> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SceneError::ResourceExhausted { width, height })?;
        Ok(PixmapSurface {
            pixmap,
            clips: Vec::new(),
            font: self.font.clone(),
        })
    }
}

pub struct PixmapSurface {
    pixmap: Pixmap,
    clips: Vec<Mask>,
    font: Option<Rc<Font>>,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clips", &self.clips.len())
            .finish()
    }
}

impl PixmapSurface {
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

fn to_transform(matrix: &Matrix) -> Transform {
    Transform::from_row(
        matrix.a as f32,
        matrix.b as f32,
        matrix.c as f32,
        matrix.d as f32,
        matrix.e as f32,
        matrix.f as f32,
    )
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    let [red, green, blue, alpha] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(red, green, blue, alpha)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

fn build_path(path: &PathData) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for command in path.draw_commands() {
        match command {
            DrawCommand::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            DrawCommand::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            DrawCommand::QuadTo(c, p) => {
                builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32);
            }
            DrawCommand::CubicTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            DrawCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

/// Straight RGBA8 to a premultiplied pixmap.
fn image_pixmap(image: &RasterImage) -> SceneResult<Pixmap> {
    let mut data = image.pixels().to_vec();
    for pixel in data.chunks_exact_mut(4) {
        let alpha = u16::from(pixel[3]);
        for channel in &mut pixel[..3] {
            *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
        }
    }
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| SceneError::InvalidData("image size must be > 0".to_owned()))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| SceneError::Backend("failed to wrap image pixels".to_owned()))
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self, color: Option<Color>) {
        self.pixmap
            .fill(color.map_or(tiny_skia::Color::TRANSPARENT, to_skia_color));
        self.clips.clear();
    }

    fn push_clip(&mut self, path: &PathData, transform: &Matrix) -> SceneResult<()> {
        let Some(path) = build_path(path) else {
            return Err(SceneError::InvalidGeometry("empty clip path".to_owned()));
        };
        let transform = to_transform(transform);
        let mask = match self.clips.last() {
            Some(current) => {
                let mut mask = current.clone();
                mask.intersect_path(&path, FillRule::Winding, true, transform);
                mask
            }
            None => {
                let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height()).ok_or(
                    SceneError::ResourceExhausted {
                        width: self.pixmap.width(),
                        height: self.pixmap.height(),
                    },
                )?;
                mask.fill_path(&path, FillRule::Winding, true, transform);
                mask
            }
        };
        self.clips.push(mask);
        Ok(())
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn fill_path(&mut self, path: &PathData, transform: &Matrix, color: Color) -> SceneResult<()> {
        let Some(path) = build_path(path) else {
            return Ok(());
        };
        let paint = solid_paint(color);
        let transform = to_transform(transform);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, transform, self.clips.last());
        Ok(())
    }

    fn stroke_path(
        &mut self,
        path: &PathData,
        transform: &Matrix,
        color: Color,
        stroke: &StrokeParams<'_>,
    ) -> SceneResult<()> {
        let Some(path) = build_path(path) else {
            return Ok(());
        };
        let dash = if stroke.dash.is_empty() {
            None
        } else {
            StrokeDash::new(stroke.dash.iter().map(|value| *value as f32).collect(), 0.0)
        };
        let skia_stroke = Stroke {
            width: stroke.width as f32,
            line_cap: match stroke.cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match stroke.join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            dash,
            ..Stroke::default()
        };
        let paint = solid_paint(color);
        let transform = to_transform(transform);
        self.pixmap
            .stroke_path(&path, &paint, &skia_stroke, transform, self.clips.last());
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: &Matrix) -> SceneResult<()> {
        let Some(font) = self.font.clone() else {
            debug!(text = run.text, "no font configured, skipping text");
            return Ok(());
        };
        let size = run.font_size as f32;
        let line_height = run.font_size;
        let line_count = run.text.split('\n').count() as f64;
        let ascent = font
            .horizontal_line_metrics(size)
            .map_or(run.font_size * 0.8, |metrics| f64::from(metrics.ascent));
        let block_height = line_height * line_count;
        let top = match run.baseline {
            TextBaseline::Top => run.y,
            TextBaseline::Middle => run.y - block_height / 2.0,
            TextBaseline::Bottom => run.y - block_height,
            TextBaseline::Alphabetic => run.y - ascent,
        };
        let [red, green, blue, alpha] = run.color.to_rgba8();
        let base = to_transform(transform);

        for (index, line) in run.text.split('\n').enumerate() {
            let width: f64 = line
                .chars()
                .map(|ch| f64::from(font.metrics(ch, size).advance_width))
                .sum();
            let left = match run.align {
                TextAlign::Left => run.x,
                TextAlign::Center => run.x - width / 2.0,
                TextAlign::Right => run.x - width,
            };
            let baseline_y = top + line_height * index as f64 + ascent;
            let mut pen_x = left;
            for ch in line.chars() {
                let (metrics, coverage) = font.rasterize(ch, size);
                let advance = f64::from(metrics.advance_width);
                if metrics.width == 0 || metrics.height == 0 {
                    pen_x += advance;
                    continue;
                }
                let Some(mut glyph) = Pixmap::new(metrics.width as u32, metrics.height as u32)
                else {
                    pen_x += advance;
                    continue;
                };
                for (pixel, cover) in glyph.data_mut().chunks_exact_mut(4).zip(&coverage) {
                    let a = u16::from(*cover) * u16::from(alpha) / 255;
                    pixel[0] = (u16::from(red) * a / 255) as u8;
                    pixel[1] = (u16::from(green) * a / 255) as u8;
                    pixel[2] = (u16::from(blue) * a / 255) as u8;
                    pixel[3] = a as u8;
                }
                let glyph_x = pen_x + f64::from(metrics.xmin);
                let glyph_y = baseline_y - f64::from(metrics.ymin) - f64::from(metrics.height as u32);
                let placement = base.pre_translate(glyph_x as f32, glyph_y as f32);
                self.pixmap.draw_pixmap(
                    0,
                    0,
                    glyph.as_ref(),
                    &PixmapPaint::default(),
                    placement,
                    self.clips.last(),
                );
                pen_x += advance;
            }
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        transform: &Matrix,
        opacity: f64,
    ) -> SceneResult<()> {
        let source = image_pixmap(image)?;
        let scale_x = dest.width / f64::from(image.width());
        let scale_y = dest.height / f64::from(image.height());
        let placement = to_transform(transform)
            .pre_translate(dest.x as f32, dest.y as f32)
            .pre_scale(scale_x as f32, scale_y as f32);
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, placement, self.clips.last());
        Ok(())
    }

    fn composite(&mut self, source: &Self, alpha: f64) -> SceneResult<()> {
        let paint = PixmapPaint {
            opacity: alpha.clamp(0.0, 1.0) as f32,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn read_pixels(&self) -> SceneResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            out.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(surface: &PixmapSurface, x: u32, y: u32) -> [u8; 4] {
        let pixels = surface.read_pixels().expect("pixels");
        let offset = ((y * surface.width() + x) * 4) as usize;
        [
            pixels[offset],
            pixels[offset + 1],
            pixels[offset + 2],
            pixels[offset + 3],
        ]
    }

    #[test]
    fn fills_transformed_rect() {
        let mut backend = PixmapBackend::default();
        let mut surface = backend.create_surface(20, 20).expect("surface");
        let mut path = PathData::new();
        path.rect(0.0, 0.0, 5.0, 5.0);
        surface
            .fill_path(&path, &Matrix::translation(10.0, 10.0), Color::rgb(1.0, 0.0, 0.0))
            .expect("fill");
        assert_eq!(pixel(&surface, 12, 12), [255, 0, 0, 255]);
        assert_eq!(pixel(&surface, 2, 2)[3], 0);
    }

    #[test]
    fn clip_limits_fill() {
        let mut backend = PixmapBackend::default();
        let mut surface = backend.create_surface(20, 20).expect("surface");
        let mut clip = PathData::new();
        clip.rect(0.0, 0.0, 10.0, 20.0);
        surface.push_clip(&clip, &Matrix::IDENTITY).expect("clip");
        let mut path = PathData::new();
        path.rect(0.0, 0.0, 20.0, 20.0);
        surface
            .fill_path(&path, &Matrix::IDENTITY, Color::BLACK)
            .expect("fill");
        surface.pop_clip();
        assert_eq!(pixel(&surface, 5, 5)[3], 255);
        assert_eq!(pixel(&surface, 15, 5)[3], 0);
    }

    #[test]
    fn zero_sized_surface_is_resource_error() {
        let mut backend = PixmapBackend::default();
        assert!(matches!(
            backend.create_surface(0, 10),
            Err(SceneError::ResourceExhausted { .. })
        ));
    }
}
