use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::Matrix;
use crate::error::{SceneError, SceneResult};
use crate::scene::{PaintEntry, Storage};
use crate::shape::{ElementId, RasterImage};

use super::brush::paint_entry;
use super::export::{ImageFormat, encode_rgba};
use super::loading::{LoadingOptions, LoadingOverlay};
use super::surface::{Surface, SurfaceBackend};
use super::{Color, Layer, LayerConfig, LayerStack, LayerView, LayerViews};

/// Painter construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PainterOptions {
    pub pixel_ratio: f64,
    pub background: Option<Color>,
    /// Propagate per-primitive paint failures instead of skipping them.
    pub strict: bool,
}

impl Default for PainterOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            background: None,
            strict: false,
        }
    }
}

/// Outcome of one `refresh` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub repainted_tiers: Vec<i32>,
    pub painted: usize,
    pub failures: usize,
}

/// Layered compositor: one surface per `z_tier`, a hover overlay and a
/// loading overlay above everything.
pub struct Painter<B: SurfaceBackend> {
    backend: B,
    width: u32,
    height: u32,
    options: PainterOptions,
    layers: LayerStack<B::Surface>,
    views: LayerViews,
    hover_layer: B::Surface,
    loading_layer: B::Surface,
    frame: B::Surface,
    loading: Option<LoadingOverlay>,
    disposed: bool,
}

impl<B: SurfaceBackend> std::fmt::Debug for Painter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Painter")
            .field("backend", &self.backend.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layers", &self.layers.tiers())
            .field("disposed", &self.disposed)
            .finish()
    }
}

fn device_size(length: u32, pixel_ratio: f64) -> u32 {
    (f64::from(length) * pixel_ratio).ceil().max(1.0) as u32
}

impl<B: SurfaceBackend> Painter<B> {
    pub fn new(mut backend: B, width: u32, height: u32, options: PainterOptions) -> SceneResult<Self> {
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidViewport { width, height });
        }
        if !options.pixel_ratio.is_finite() || options.pixel_ratio <= 0.0 {
            return Err(SceneError::InvalidData(
                "pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        let device_width = device_size(width, options.pixel_ratio);
        let device_height = device_size(height, options.pixel_ratio);
        let hover_layer = backend.create_surface(device_width, device_height)?;
        let loading_layer = backend.create_surface(device_width, device_height)?;
        let frame = backend.create_surface(device_width, device_height)?;
        debug!(backend = backend.name(), width, height, "painter created");
        Ok(Self {
            backend,
            width,
            height,
            options,
            layers: LayerStack::default(),
            views: LayerViews::default(),
            hover_layer,
            loading_layer,
            frame,
            loading: None,
            disposed: false,
        })
    }

    fn ensure_live(&self) -> SceneResult<()> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn options(&self) -> PainterOptions {
        self.options
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.options.strict = strict;
    }

    pub fn set_background(&mut self, background: Option<Color>) {
        self.options.background = background;
    }

    fn device_matrix(&self) -> Matrix {
        Matrix::scaling(self.options.pixel_ratio, self.options.pixel_ratio)
    }

    fn tier_matrix(&self, z_tier: i32) -> Matrix {
        self.device_matrix().multiply(&self.views.matrix(z_tier))
    }

    #[must_use]
    pub fn layer(&self, z_tier: i32) -> Option<&Layer<B::Surface>> {
        self.layers.get(z_tier)
    }

    #[must_use]
    pub fn layers(&self) -> &LayerStack<B::Surface> {
        &self.layers
    }

    #[must_use]
    pub fn views(&self) -> &LayerViews {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut LayerViews {
        &mut self.views
    }

    #[must_use]
    pub fn hover_layer(&self) -> &B::Surface {
        &self.hover_layer
    }

    #[must_use]
    pub fn loading_layer(&self) -> &B::Surface {
        &self.loading_layer
    }

    /// Returns the tier's layer, creating it on first use.
    pub fn get_layer(&mut self, z_tier: i32) -> SceneResult<&mut Layer<B::Surface>> {
        self.ensure_live()?;
        let (width, height) = self.device_dimensions();
        let backend = &mut self.backend;
        self.layers
            .get_or_create(z_tier, || backend.create_surface(width, height))
    }

    fn device_dimensions(&self) -> (u32, u32) {
        (
            device_size(self.width, self.options.pixel_ratio),
            device_size(self.height, self.options.pixel_ratio),
        )
    }

    pub fn configure_layer(&mut self, z_tier: i32, config: LayerConfig) -> SceneResult<()> {
        self.ensure_live()?;
        self.views.configure(z_tier, config)?;
        if !config.motion_blur {
            if let Some(layer) = self.layers.get_mut(z_tier) {
                layer.back_buffer = None;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn layer_view(&self, z_tier: i32) -> LayerView {
        self.views.view(z_tier)
    }

    /// Repaints dirty layers (or all with `paint_all`) from the paint list.
    ///
    /// Layers whose membership count is unchanged and that were not marked
    /// dirty keep their raster content.
    pub fn refresh(&mut self, storage: &mut Storage, paint_all: bool) -> SceneResult<RefreshReport> {
        self.ensure_live()?;
        let dirty_tiers = storage.take_dirty_tiers();
        for tier in dirty_tiers.iter().chain(self.views.take_changed().iter()) {
            if let Some(layer) = self.layers.get_mut(*tier) {
                layer.mark_dirty();
            }
        }
        storage.paint_list();
        let storage: &Storage = storage;
        let list = storage.cached_paint_list();
        let ghost = storage.drag_ghost();
        let (width, height) = self.device_dimensions();
        let strict = self.options.strict;
        let mut report = RefreshReport::default();
        let mut seen = BTreeSet::new();

        let mut start = 0;
        while start < list.len() {
            let tier = list[start].z_tier;
            let run_len = list[start..]
                .iter()
                .take_while(|entry| entry.z_tier == tier)
                .count();
            let run = &list[start..start + run_len];
            start += run_len;
            seen.insert(tier);

            let view = self.tier_matrix(tier);
            let config = self.views.config(tier);
            let backend = &mut self.backend;
            let layer = self
                .layers
                .get_or_create(tier, || backend.create_surface(width, height))?;
            if layer.element_count != run.len() {
                layer.dirty = true;
            }
            if !(layer.dirty || paint_all) {
                continue;
            }
            if config.motion_blur {
                let mut back = match layer.back_buffer.take() {
                    Some(back) => back,
                    None => backend.create_surface(width, height)?,
                };
                back.clear(None);
                back.composite(&layer.surface, 1.0)?;
                layer.surface.clear(None);
                layer.surface.composite(&back, config.trail_alpha)?;
                layer.back_buffer = Some(back);
            } else {
                layer.surface.clear(None);
            }
            for entry in run {
                let Some(shape) = storage.shape(entry.id) else {
                    continue;
                };
                if shape.invisible || ghost == Some(entry.id) {
                    continue;
                }
                match paint_entry(
                    &mut layer.surface,
                    shape,
                    entry,
                    &view,
                    storage.is_hovered(entry.id),
                ) {
                    Ok(()) => report.painted += 1,
                    Err(err) if strict => return Err(err),
                    Err(err) => {
                        warn!(id = %entry.id, error = %err, "skipping primitive that failed to paint");
                        report.failures += 1;
                    }
                }
            }
            layer.dirty = false;
            layer.element_count = run.len();
            report.repainted_tiers.push(tier);
            trace!(z_tier = tier, elements = run.len(), "layer repainted");
        }

        for layer in self.layers.iter_mut() {
            if seen.contains(&layer.z_tier) {
                continue;
            }
            if layer.dirty || layer.element_count != 0 || paint_all {
                layer.surface.clear(None);
                layer.back_buffer = None;
                layer.element_count = 0;
                layer.dirty = false;
                report.repainted_tiers.push(layer.z_tier);
            }
        }
        Ok(report)
    }

    /// Repaints only the hover overlay from the hover list.
    pub fn refresh_hover(&mut self, storage: &mut Storage) -> SceneResult<usize> {
        self.ensure_live()?;
        self.hover_layer.clear(None);
        let entries = storage.hover_list();
        let mut painted = 0;
        for entry in &entries {
            let Some(shape) = storage.shape(entry.id) else {
                continue;
            };
            if shape.invisible {
                continue;
            }
            let view = self.tier_matrix(entry.z_tier);
            match paint_entry(&mut self.hover_layer, shape, entry, &view, true) {
                Ok(()) => painted += 1,
                Err(err) if self.options.strict => return Err(err),
                Err(err) => warn!(id = %entry.id, error = %err, "skipping hovered primitive"),
            }
        }
        Ok(painted)
    }

    /// Composes every layer, then the hover and loading overlays, into the
    /// frame surface.
    pub fn compose(&mut self) -> SceneResult<&B::Surface> {
        self.ensure_live()?;
        self.frame.clear(self.options.background);
        for layer in self.layers.iter() {
            self.frame.composite(&layer.surface, 1.0)?;
        }
        self.frame.composite(&self.hover_layer, 1.0)?;
        if self.loading.is_some() {
            self.frame.composite(&self.loading_layer, 1.0)?;
        }
        Ok(&self.frame)
    }

    #[must_use]
    pub fn frame(&self) -> &B::Surface {
        &self.frame
    }

    fn paint_entries<S: Surface>(
        &self,
        surface: &mut S,
        storage: &Storage,
        entries: &[PaintEntry],
        base: &Matrix,
        with_views: bool,
    ) -> SceneResult<()> {
        for entry in entries {
            let Some(shape) = storage.shape(entry.id) else {
                continue;
            };
            if shape.invisible {
                continue;
            }
            let view = if with_views {
                base.multiply(&self.views.matrix(entry.z_tier))
            } else {
                *base
            };
            if let Err(err) = paint_entry(surface, shape, entry, &view, false) {
                if self.options.strict {
                    return Err(err);
                }
                warn!(id = %entry.id, error = %err, "skipping primitive during export");
            }
        }
        Ok(())
    }

    /// Paints the whole scene once onto a throwaway surface and encodes it.
    pub fn rasterize(
        &mut self,
        storage: &mut Storage,
        format: ImageFormat,
        background: Option<Color>,
    ) -> SceneResult<Vec<u8>> {
        self.ensure_live()?;
        let (width, height) = self.device_dimensions();
        let mut surface = self.backend.create_surface(width, height)?;
        surface.clear(background.or(self.options.background));
        storage.paint_list();
        let storage: &Storage = storage;
        self.paint_entries(
            &mut surface,
            storage,
            storage.cached_paint_list(),
            &self.device_matrix(),
            true,
        )?;
        let pixels = surface.read_pixels()?;
        encode_rgba(&pixels, width, height, format)
    }

    /// Rasterises one element subtree into a bitmap of the given size.
    pub fn render_subtree(
        &mut self,
        storage: &Storage,
        id: ElementId,
        width: u32,
        height: u32,
    ) -> SceneResult<RasterImage> {
        self.ensure_live()?;
        if !storage.contains(id) {
            return Err(SceneError::MissingTarget(id));
        }
        let mut surface = self.backend.create_surface(width, height)?;
        surface.clear(None);
        let entries = storage.subtree_paint_list(id);
        self.paint_entries(&mut surface, storage, &entries, &Matrix::IDENTITY, false)?;
        RasterImage::from_rgba8(width, height, surface.read_pixels()?)
    }

    /// Resizes every surface. All replacements are allocated before any is
    /// swapped in, so a failed allocation leaves the painter unchanged.
    /// Returns `false` when the size did not change.
    pub fn resize(&mut self, width: u32, height: u32) -> SceneResult<bool> {
        self.ensure_live()?;
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidViewport { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(false);
        }
        let device_width = device_size(width, self.options.pixel_ratio);
        let device_height = device_size(height, self.options.pixel_ratio);
        let mut layer_surfaces = Vec::with_capacity(self.layers.len());
        for _ in 0..self.layers.len() {
            layer_surfaces.push(self.backend.create_surface(device_width, device_height)?);
        }
        let hover_layer = self.backend.create_surface(device_width, device_height)?;
        let loading_layer = self.backend.create_surface(device_width, device_height)?;
        let frame = self.backend.create_surface(device_width, device_height)?;

        for (layer, surface) in self.layers.iter_mut().zip(layer_surfaces) {
            layer.surface = surface;
            layer.back_buffer = None;
            layer.dirty = true;
        }
        self.hover_layer = hover_layer;
        self.loading_layer = loading_layer;
        self.frame = frame;
        self.width = width;
        self.height = height;
        debug!(width, height, "painter resized");
        Ok(true)
    }

    pub fn show_loading(&mut self, options: LoadingOptions) -> SceneResult<()> {
        self.ensure_live()?;
        let device = self.device_matrix();
        let overlay = LoadingOverlay::new(options);
        overlay.paint(&mut self.loading_layer, &device)?;
        self.loading = Some(overlay);
        Ok(())
    }

    pub fn hide_loading(&mut self) {
        if self.loading.take().is_some() {
            self.loading_layer.clear(None);
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Steps the loading effect; returns `true` when the overlay repainted.
    pub fn advance_loading(&mut self, now_ms: f64) -> SceneResult<bool> {
        self.ensure_live()?;
        let device = self.device_matrix();
        let Some(overlay) = self.loading.as_mut() else {
            return Ok(false);
        };
        overlay.advance(now_ms);
        overlay.paint(&mut self.loading_layer, &device)?;
        Ok(true)
    }

    /// Frees every layer and rejects later calls. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.layers.clear();
        self.views.clear();
        self.loading = None;
        self.hover_layer.clear(None);
        self.loading_layer.clear(None);
        self.frame.clear(None);
        self.disposed = true;
        debug!("painter disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn dirty_tiers(&self) -> Vec<i32> {
        self.layers
            .iter()
            .filter(|layer| layer.is_dirty())
            .map(Layer::z_tier)
            .collect()
    }
}
