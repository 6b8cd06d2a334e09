use crate::core::{Matrix, PathData, Rect};
use crate::error::{SceneError, SceneResult};
use crate::scene::PaintEntry;
use crate::shape::{Geometry, PaintStyle, Shape, ShapeKind};

use super::surface::{StrokeParams, Surface, TextRun};
use super::Color;

fn with_opacity(color: Color, opacity: f64) -> Color {
    color.with_alpha(color.alpha * opacity)
}

fn configuration_error(shape: &Shape, err: &SceneError) -> SceneError {
    SceneError::Configuration {
        id: shape.id(),
        reason: err.to_string(),
    }
}

/// Path used when a shape kind acts as a clip.
pub(crate) fn clip_path(kind: &ShapeKind) -> SceneResult<PathData> {
    fn append(geometry: &Geometry<'_>, out: &mut PathData) {
        match geometry {
            Geometry::Area(path) | Geometry::Outline(path) => {
                out.extend(path);
            }
            Geometry::Text { .. } | Geometry::Image { .. } => {}
            Geometry::Bundle(parts) => {
                for part in parts {
                    append(part, out);
                }
            }
        }
    }

    let geometry = kind.geometry()?;
    let mut path = PathData::new();
    append(&geometry, &mut path);
    if path.is_empty() {
        let bounds = kind.local_bounds(&PaintStyle::default())?;
        path.rect(bounds.x, bounds.y, bounds.width, bounds.height);
    }
    Ok(path)
}

/// Paints one paint-list entry with clips applied. `view` maps the scene
/// into the target surface (device ratio and layer pan/zoom).
pub(crate) fn paint_entry<S: Surface>(
    surface: &mut S,
    shape: &Shape,
    entry: &PaintEntry,
    view: &Matrix,
    highlighted: bool,
) -> SceneResult<()> {
    let style = shape.resolved_style(highlighted);
    style
        .validate()
        .map_err(|err| configuration_error(shape, &err))?;
    let geometry = shape
        .kind
        .geometry()
        .map_err(|err| configuration_error(shape, &err))?;
    let world = view.multiply(&entry.world);

    let mut pushed = 0;
    let mut result = Ok(());
    for clip in &entry.clips {
        let pushed_clip = clip_path(&clip.clip.kind).and_then(|path| {
            let matrix = view
                .multiply(&clip.world)
                .multiply(&clip.clip.transform.matrix());
            surface.push_clip(&path, &matrix)
        });
        if let Err(err) = pushed_clip {
            result = Err(err);
            break;
        }
        pushed += 1;
    }
    if result.is_ok() {
        result = draw_geometry(surface, &geometry, &style, &world);
    }
    for _ in 0..pushed {
        surface.pop_clip();
    }
    result
}

fn draw_geometry<S: Surface>(
    surface: &mut S,
    geometry: &Geometry<'_>,
    style: &PaintStyle,
    world: &Matrix,
) -> SceneResult<()> {
    let stroke = StrokeParams {
        width: style.line_width,
        dash: &style.line_dash,
        cap: style.line_cap,
        join: style.line_join,
    };
    match geometry {
        Geometry::Area(path) => {
            if let Some(fill) = style.fill {
                surface.fill_path(path, world, with_opacity(fill, style.opacity))?;
            }
            if let (true, Some(color)) = (style.has_stroke(), style.stroke) {
                surface.stroke_path(path, world, with_opacity(color, style.opacity), &stroke)?;
            }
        }
        Geometry::Outline(path) => {
            if let Some(color) = style.stroke.or(style.fill) {
                if style.line_width > 0.0 {
                    surface.stroke_path(
                        path,
                        world,
                        with_opacity(color, style.opacity),
                        &stroke,
                    )?;
                }
            }
        }
        Geometry::Text {
            x,
            y,
            text,
            font_size,
            align,
            baseline,
        } => {
            let color = style.fill.or(style.stroke).unwrap_or(Color::BLACK);
            surface.draw_text(
                &TextRun {
                    text,
                    x: *x,
                    y: *y,
                    font_size: *font_size,
                    align: *align,
                    baseline: *baseline,
                    color: with_opacity(color, style.opacity),
                },
                world,
            )?;
        }
        Geometry::Image {
            x,
            y,
            width,
            height,
            image,
        } => {
            surface.draw_image(
                image,
                Rect::new(*x, *y, *width, *height),
                world,
                style.opacity,
            )?;
        }
        Geometry::Bundle(parts) => {
            for part in parts {
                draw_geometry(surface, part, style, world)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::null_backend::NullBackend;
    use crate::render::SurfaceBackend;
    use crate::scene::Storage;

    #[test]
    fn fill_and_stroke_issue_two_draws() {
        let mut backend = NullBackend::new();
        let mut surface = backend.create_surface(10, 10).expect("surface");
        let mut storage = Storage::new();
        let id = storage
            .add_root(
                Shape::circle(5.0, 5.0, 2.0)
                    .with_style(PaintStyle::filled(Color::BLACK).with_stroke(Color::WHITE, 1.0)),
            )
            .expect("add");
        let entry = storage.paint_list()[0].clone();
        let shape = storage.shape(id).expect("shape");
        paint_entry(&mut surface, shape, &entry, &Matrix::IDENTITY, false).expect("paint");
        assert_eq!(surface.counts().fills, 1);
        assert_eq!(surface.counts().strokes, 1);
    }

    #[test]
    fn invalid_style_is_configuration_error() {
        let mut backend = NullBackend::new();
        let mut surface = backend.create_surface(10, 10).expect("surface");
        let mut storage = Storage::new();
        let id = storage
            .add_root(Shape::circle(5.0, 5.0, 2.0))
            .expect("add");
        storage
            .update_shape(id, |shape| shape.style.opacity = 4.0)
            .expect("update");
        let entry = storage.paint_list()[0].clone();
        let shape = storage.shape(id).expect("shape");
        assert!(matches!(
            paint_entry(&mut surface, shape, &entry, &Matrix::IDENTITY, false),
            Err(SceneError::Configuration { .. })
        ));
    }
}
