use std::rc::Rc;

use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::render::{Color, ImageFormat, SurfaceBackend};
use crate::shape::{ElementId, RasterImage, Shape};

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Paints the whole scene onto a fresh surface and encodes it.
    /// `background` overrides the configured background colour.
    pub fn to_image(
        &mut self,
        format: ImageFormat,
        background: Option<Color>,
    ) -> SceneResult<Vec<u8>> {
        self.ensure_live()?;
        let bytes = self.painter.rasterize(&mut self.storage, format, background)?;
        debug!(format = format.mime_type(), bytes = bytes.len(), "scene exported");
        Ok(bytes)
    }

    /// [`SceneEngine::to_image`] with the format given by name (`"png"`,
    /// `"jpeg"`/`"jpg"`).
    pub fn to_image_named(
        &mut self,
        format: &str,
        background: Option<Color>,
    ) -> SceneResult<Vec<u8>> {
        self.to_image(ImageFormat::from_name(format)?, background)
    }

    /// Rasterises one element subtree (scene coordinates, top-left at the
    /// origin) into a `width` x `height` bitmap.
    pub fn rasterize_shape(
        &mut self,
        id: ElementId,
        width: u32,
        height: u32,
    ) -> SceneResult<RasterImage> {
        self.ensure_live()?;
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidViewport { width, height });
        }
        self.painter.render_subtree(&self.storage, id, width, height)
    }

    /// Rasterises a subtree and wraps the bitmap in an image shape covering
    /// the same area, ready to replace the vector content.
    pub fn shape_to_image(&mut self, id: ElementId, width: u32, height: u32) -> SceneResult<Shape> {
        let image = self.rasterize_shape(id, width, height)?;
        Ok(Shape::image(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
            Rc::new(image),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::error::SceneError;
    use crate::render::{Color, ImageFormat, PixmapBackend};
    use crate::shape::{PaintStyle, Shape};

    fn engine() -> SceneEngine<PixmapBackend> {
        SceneEngine::new(PixmapBackend::new(), EngineConfig::new(Viewport::new(40, 30)))
            .expect("engine")
    }

    #[test]
    fn png_export_has_signature_and_size() {
        let mut engine = engine();
        engine
            .add_shape(
                Shape::rect(5.0, 5.0, 10.0, 10.0)
                    .with_style(PaintStyle::filled(Color::rgb(1.0, 0.0, 0.0))),
            )
            .expect("add");
        let bytes = engine
            .to_image(ImageFormat::Png, Some(Color::WHITE))
            .expect("export");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (40, 30));
        assert_eq!(decoded.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(30, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn shape_to_image_covers_the_requested_area() {
        let mut engine = engine();
        let id = engine
            .add_shape(
                Shape::rect(0.0, 0.0, 4.0, 4.0)
                    .with_style(PaintStyle::filled(Color::rgb(0.0, 0.0, 1.0))),
            )
            .expect("add");
        let shape = engine.shape_to_image(id, 8, 8).expect("image");
        let bounds = shape.local_bounds().expect("bounds");
        assert_eq!((bounds.width, bounds.height), (8.0, 8.0));
        let image = engine.rasterize_shape(id, 8, 8).expect("raster");
        assert_eq!(image.pixel(1, 1), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(6, 6), Some([0, 0, 0, 0]));
        assert!(matches!(
            engine.shape_to_image(id, 0, 8),
            Err(SceneError::InvalidViewport { .. })
        ));
    }
}
