mod brush;
mod color;
mod export;
mod layer;
mod layer_stack;
mod loading;
pub(crate) mod null_backend;
mod painter;
mod pixmap_backend;
mod surface;

pub use color::Color;
pub use export::{ImageFormat, encode_rgba};
pub use layer::{Layer, LayerConfig, LayerView, LayerViews};
pub use layer_stack::LayerStack;
pub use loading::{LoadingEffect, LoadingOptions, LoadingOverlay};
pub use null_backend::{DrawCounts, NullBackend, NullSurface};
pub use painter::{Painter, PainterOptions, RefreshReport};
pub use pixmap_backend::{FONT_PATH_ENV, PixmapBackend, PixmapSurface};
pub use surface::{StrokeParams, Surface, SurfaceBackend, TextRun};

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoBackend, CairoSurface};
