use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::core::{DrawCommand, Matrix, PathData, Rect, TextAlign, TextBaseline};
use crate::error::{SceneError, SceneResult};
use crate::shape::{LineCap, LineJoin, RasterImage};

use super::surface::{StrokeParams, Surface, SurfaceBackend, TextRun};
use super::Color;

/// Cairo + Pango + PangoCairo surface backend.
#[derive(Debug, Default)]
pub struct CairoBackend {
    font_family: Option<String>,
}

impl CairoBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Font family passed to Pango; `Sans` when unset.
    #[must_use]
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }
}

impl SurfaceBackend for CairoBackend {
    type Surface = CairoSurface;

    fn name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    fn create_surface(&mut self, width: u32, height: u32) -> SceneResult<CairoSurface> {
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(SceneError::ResourceExhausted { width, height });
        };
        if w == 0 || h == 0 {
            return Err(SceneError::ResourceExhausted { width, height });
        }
        let surface = ImageSurface::create(Format::ARgb32, w, h)
            .map_err(|_| SceneError::ResourceExhausted { width, height })?;
        Ok(CairoSurface {
            surface,
            clips: Vec::new(),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| "Sans".to_owned()),
        })
    }
}

/// Offscreen ARGB32 image surface. Clips are replayed on every draw since
/// each call builds a fresh context.
#[derive(Debug)]
pub struct CairoSurface {
    surface: ImageSurface,
    clips: Vec<(PathData, Matrix)>,
    font_family: String,
}

impl CairoSurface {
    #[must_use]
    pub fn image_surface(&self) -> &ImageSurface {
        &self.surface
    }

    /// Paints this surface onto an external context (a GTK draw callback).
    pub fn paint_onto(&self, context: &Context) -> SceneResult<()> {
        context
            .set_source_surface(&self.surface, 0.0, 0.0)
            .map_err(|err| map_backend_error("failed to set source surface", err))?;
        context
            .paint()
            .map_err(|err| map_backend_error("failed to paint surface", err))
    }

    fn context(&self) -> SceneResult<Context> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        for (path, transform) in &self.clips {
            context.save().map_err(|err| map_backend_error("save", err))?;
            context.transform(to_cairo(transform));
            append_path(&context, path);
            context.restore().map_err(|err| map_backend_error("restore", err))?;
            context.clip();
        }
        Ok(context)
    }
}

fn to_cairo(matrix: &Matrix) -> cairo::Matrix {
    cairo::Matrix::new(matrix.a, matrix.b, matrix.c, matrix.d, matrix.e, matrix.f)
}

fn append_path(context: &Context, path: &PathData) {
    context.new_path();
    let mut current = (0.0, 0.0);
    for command in path.draw_commands() {
        match command {
            DrawCommand::MoveTo(point) => {
                context.move_to(point.x, point.y);
                current = (point.x, point.y);
            }
            DrawCommand::LineTo(point) => {
                context.line_to(point.x, point.y);
                current = (point.x, point.y);
            }
            DrawCommand::QuadTo(ctrl, to) => {
                // cairo has no quadratic segment; elevate to cubic.
                let c1x = current.0 + 2.0 / 3.0 * (ctrl.x - current.0);
                let c1y = current.1 + 2.0 / 3.0 * (ctrl.y - current.1);
                let c2x = to.x + 2.0 / 3.0 * (ctrl.x - to.x);
                let c2y = to.y + 2.0 / 3.0 * (ctrl.y - to.y);
                context.curve_to(c1x, c1y, c2x, c2y, to.x, to.y);
                current = (to.x, to.y);
            }
            DrawCommand::CubicTo(c1, c2, to) => {
                context.curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
                current = (to.x, to.y);
            }
            DrawCommand::Close => context.close_path(),
        }
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn cairo_cap(cap: LineCap) -> cairo::LineCap {
    match cap {
        LineCap::Butt => cairo::LineCap::Butt,
        LineCap::Round => cairo::LineCap::Round,
        LineCap::Square => cairo::LineCap::Square,
    }
}

fn cairo_join(join: LineJoin) -> cairo::LineJoin {
    match join {
        LineJoin::Miter => cairo::LineJoin::Miter,
        LineJoin::Round => cairo::LineJoin::Round,
        LineJoin::Bevel => cairo::LineJoin::Bevel,
    }
}

impl Surface for CairoSurface {
    fn width(&self) -> u32 {
        self.surface.width().unsigned_abs()
    }

    fn height(&self) -> u32 {
        self.surface.height().unsigned_abs()
    }

    fn clear(&mut self, color: Option<Color>) {
        let Ok(context) = Context::new(&self.surface) else {
            return;
        };
        context.set_operator(cairo::Operator::Source);
        apply_color(&context, color.unwrap_or(Color::TRANSPARENT));
        if let Err(err) = context.paint() {
            tracing::warn!(error = %err, "failed to clear cairo surface");
        }
    }

    fn push_clip(&mut self, path: &PathData, transform: &Matrix) -> SceneResult<()> {
        self.clips.push((path.clone(), *transform));
        Ok(())
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn fill_path(&mut self, path: &PathData, transform: &Matrix, color: Color) -> SceneResult<()> {
        let context = self.context()?;
        context.transform(to_cairo(transform));
        append_path(&context, path);
        apply_color(&context, color);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill path", err))
    }

    fn stroke_path(
        &mut self,
        path: &PathData,
        transform: &Matrix,
        color: Color,
        stroke: &StrokeParams<'_>,
    ) -> SceneResult<()> {
        let context = self.context()?;
        context.transform(to_cairo(transform));
        append_path(&context, path);
        apply_color(&context, color);
        context.set_line_width(stroke.width);
        context.set_line_cap(cairo_cap(stroke.cap));
        context.set_line_join(cairo_join(stroke.join));
        context.set_dash(stroke.dash, 0.0);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke path", err))
    }

    fn draw_text(&mut self, run: &TextRun<'_>, transform: &Matrix) -> SceneResult<()> {
        let context = self.context()?;
        context.transform(to_cairo(transform));
        let layout = pangocairo::functions::create_layout(&context);
        let font_description =
            FontDescription::from_string(&format!("{} {}px", self.font_family, run.font_size));
        layout.set_font_description(Some(&font_description));
        layout.set_text(run.text);

        let (text_width, text_height) = layout.pixel_size();
        let x = match run.align {
            TextAlign::Left => run.x,
            TextAlign::Center => run.x - f64::from(text_width) / 2.0,
            TextAlign::Right => run.x - f64::from(text_width),
        };
        let y = match run.baseline {
            TextBaseline::Top => run.y,
            TextBaseline::Middle => run.y - f64::from(text_height) / 2.0,
            TextBaseline::Bottom => run.y - f64::from(text_height),
            TextBaseline::Alphabetic => {
                run.y - f64::from(layout.baseline()) / f64::from(pango::SCALE)
            }
        };
        apply_color(&context, run.color);
        context.move_to(x, y);
        pangocairo::functions::show_layout(&context, &layout);
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        transform: &Matrix,
        opacity: f64,
    ) -> SceneResult<()> {
        let (Ok(width), Ok(height)) = (i32::try_from(image.width()), i32::try_from(image.height()))
        else {
            return Err(SceneError::InvalidData("image too large".to_owned()));
        };
        let stride = Format::ARgb32
            .stride_for_width(image.width())
            .map_err(|err| map_backend_error("invalid image stride", err))?;
        let row_bytes = stride.unsigned_abs() as usize;
        let mut data = vec![0u8; row_bytes * image.height() as usize];
        for (row, source) in image
            .pixels()
            .chunks_exact(image.width() as usize * 4)
            .enumerate()
        {
            for (column, pixel) in source.chunks_exact(4).enumerate() {
                let alpha = u32::from(pixel[3]);
                let premultiply = |channel: u8| u32::from(channel) * alpha / 255;
                let argb = (alpha << 24)
                    | (premultiply(pixel[0]) << 16)
                    | (premultiply(pixel[1]) << 8)
                    | premultiply(pixel[2]);
                let offset = row * row_bytes + column * 4;
                data[offset..offset + 4].copy_from_slice(&argb.to_ne_bytes());
            }
        }
        let source = ImageSurface::create_for_data(data, Format::ARgb32, width, height, stride)
            .map_err(|err| map_backend_error("failed to wrap image", err))?;

        let context = self.context()?;
        context.transform(to_cairo(transform));
        context.translate(dest.x, dest.y);
        context.scale(
            dest.width / f64::from(width.max(1)),
            dest.height / f64::from(height.max(1)),
        );
        context
            .set_source_surface(&source, 0.0, 0.0)
            .map_err(|err| map_backend_error("failed to set image source", err))?;
        context
            .paint_with_alpha(opacity.clamp(0.0, 1.0))
            .map_err(|err| map_backend_error("failed to draw image", err))
    }

    fn composite(&mut self, source: &Self, alpha: f64) -> SceneResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context
            .set_source_surface(&source.surface, 0.0, 0.0)
            .map_err(|err| map_backend_error("failed to set source surface", err))?;
        context
            .paint_with_alpha(alpha.clamp(0.0, 1.0))
            .map_err(|err| map_backend_error("failed to composite surface", err))
    }

    fn read_pixels(&self) -> SceneResult<Vec<u8>> {
        // `data()` needs exclusive ownership, so read through a private copy.
        let mut copy = ImageSurface::create(
            Format::ARgb32,
            self.surface.width(),
            self.surface.height(),
        )
        .map_err(|err| map_backend_error("failed to create readback surface", err))?;
        {
            let context = Context::new(&copy)
                .map_err(|err| map_backend_error("failed to create cairo context", err))?;
            context
                .set_source_surface(&self.surface, 0.0, 0.0)
                .map_err(|err| map_backend_error("failed to set source surface", err))?;
            context
                .paint()
                .map_err(|err| map_backend_error("failed to copy surface", err))?;
        }
        copy.flush();
        let width = copy.width().unsigned_abs() as usize;
        let stride = copy.stride().unsigned_abs() as usize;
        let data = copy
            .data()
            .map_err(|err| SceneError::Backend(format!("failed to read surface: {err}")))?;
        let mut out = Vec::with_capacity(width * 4 * (data.len() / stride.max(1)));
        for row in data.chunks_exact(stride) {
            for pixel in row[..width * 4].chunks_exact(4) {
                let argb = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
                let alpha = argb >> 24;
                let demultiply = |channel: u32| {
                    if alpha == 0 {
                        0
                    } else {
                        ((channel * 255 + alpha / 2) / alpha).min(255) as u8
                    }
                };
                out.extend_from_slice(&[
                    demultiply((argb >> 16) & 0xFF),
                    demultiply((argb >> 8) & 0xFF),
                    demultiply(argb & 0xFF),
                    alpha as u8,
                ]);
            }
        }
        Ok(out)
    }
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> SceneError {
    SceneError::Backend(format!("{prefix}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_reads_back_straight_alpha() {
        let mut backend = CairoBackend::new();
        let mut surface = backend.create_surface(4, 4).expect("surface");
        let mut path = PathData::new();
        path.rect(0.0, 0.0, 4.0, 4.0);
        surface
            .fill_path(&path, &Matrix::IDENTITY, Color::rgb(1.0, 0.0, 0.0))
            .expect("fill");
        let pixels = surface.read_pixels().expect("pixels");
        assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
    }
}
