#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use scenic_rs::SceneError;
use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::Viewport;
use scenic_rs::render::{CairoBackend, Color, Surface, SurfaceBackend};
use scenic_rs::shape::{PaintStyle, Shape};

fn rgba_at(surface: &impl Surface, x: u32, y: u32) -> [u8; 4] {
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
fn cairo_backend_rejects_empty_surfaces() {
    let err = CairoBackend::new()
        .create_surface(0, 480)
        .expect_err("zero width must fail");
    assert!(matches!(err, SceneError::ResourceExhausted { .. }));
}

#[test]
fn cairo_backend_paints_layers_into_the_frame() {
    let config = EngineConfig::new(Viewport::new(90, 50)).with_background(Color::WHITE);
    let mut engine = SceneEngine::new(CairoBackend::new(), config).expect("engine init");
    engine
        .add_shape(
            Shape::rect(10.0, 10.0, 20.0, 20.0)
                .with_style(PaintStyle::filled(Color::rgb(0.0, 1.0, 0.0))),
        )
        .expect("add");
    engine
        .add_shape(
            Shape::line(50.0, 25.0, 85.0, 25.0)
                .with_style(PaintStyle::stroked(Color::BLACK, 4.0)),
        )
        .expect("add");
    engine.render().expect("render");

    assert_eq!(rgba_at(engine.frame(), 20, 20), [0, 255, 0, 255]);
    assert_eq!(rgba_at(engine.frame(), 70, 25), [0, 0, 0, 255]);
    assert_eq!(rgba_at(engine.frame(), 70, 40), [255, 255, 255, 255]);
}

#[test]
fn cairo_frame_can_be_presented_on_an_external_context() {
    let mut engine = SceneEngine::new(CairoBackend::new(), EngineConfig::new(Viewport::new(60, 40)))
        .expect("engine init");
    engine
        .add_shape(
            Shape::circle(30.0, 20.0, 8.0).with_style(PaintStyle::filled(Color::rgb(1.0, 0.0, 0.0))),
        )
        .expect("add");
    engine.render().expect("render");

    let mut target = ImageSurface::create(Format::ARgb32, 60, 40).expect("surface");
    {
        let context = Context::new(&target).expect("context");
        engine.frame().paint_onto(&context).expect("present");
    }
    target.flush();
    let stride = target.stride() as usize;
    let data = target.data().expect("data");
    // Cairo stores premultiplied BGRA in native byte order.
    let offset = 20 * stride + 30 * 4;
    let pixel = u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    assert_eq!(pixel, 0xFFFF_0000);
}
