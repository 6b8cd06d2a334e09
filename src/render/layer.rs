use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::{Matrix, Vec2};
use crate::error::{SceneError, SceneResult};

/// Per-tier compositing options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Blend the previous frame back in at `trail_alpha` before repainting.
    #[serde(default)]
    pub motion_blur: bool,
    #[serde(default = "default_trail_alpha")]
    pub trail_alpha: f64,
    #[serde(default)]
    pub zoomable: bool,
    #[serde(default)]
    pub pannable: bool,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

fn default_trail_alpha() -> f64 {
    0.7
}

fn default_min_zoom() -> f64 {
    0.1
}

fn default_max_zoom() -> f64 {
    10.0
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            motion_blur: false,
            trail_alpha: default_trail_alpha(),
            zoomable: false,
            pannable: false,
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl LayerConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if !self.trail_alpha.is_finite() || !(0.0..=1.0).contains(&self.trail_alpha) {
            return Err(SceneError::InvalidData(
                "layer trail alpha must be in [0, 1]".to_owned(),
            ));
        }
        if !self.min_zoom.is_finite()
            || !self.max_zoom.is_finite()
            || self.min_zoom <= 0.0
            || self.min_zoom > self.max_zoom
        {
            return Err(SceneError::InvalidData(
                "layer zoom bounds must be finite with 0 < min <= max".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Pan/zoom applied to a whole layer on top of the primitives' transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerView {
    pub offset: Vec2,
    pub zoom: f64,
}

impl Default for LayerView {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl LayerView {
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        Matrix::new(self.zoom, 0.0, 0.0, self.zoom, self.offset.x, self.offset.y)
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.offset == Vec2::ZERO && self.zoom == 1.0
    }
}

/// Configuration and view state of every configured tier.
#[derive(Debug, Clone, Default)]
pub struct LayerViews {
    entries: BTreeMap<i32, (LayerConfig, LayerView)>,
    changed: BTreeSet<i32>,
}

impl LayerViews {
    pub fn configure(&mut self, z_tier: i32, config: LayerConfig) -> SceneResult<()> {
        config.validate()?;
        let entry = self.entries.entry(z_tier).or_default();
        entry.0 = config;
        entry.1.zoom = entry.1.zoom.clamp(config.min_zoom, config.max_zoom);
        self.changed.insert(z_tier);
        Ok(())
    }

    #[must_use]
    pub fn config(&self, z_tier: i32) -> LayerConfig {
        self.entries
            .get(&z_tier)
            .map_or_else(LayerConfig::default, |entry| entry.0)
    }

    #[must_use]
    pub fn view(&self, z_tier: i32) -> LayerView {
        self.entries
            .get(&z_tier)
            .map_or_else(LayerView::default, |entry| entry.1)
    }

    #[must_use]
    pub fn matrix(&self, z_tier: i32) -> Matrix {
        self.entries
            .get(&z_tier)
            .map_or(Matrix::IDENTITY, |entry| entry.1.matrix())
    }

    /// Pans every pannable tier. Returns `true` when any tier moved.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let mut moved = false;
        for (z_tier, (config, view)) in &mut self.entries {
            if config.pannable {
                view.offset += Vec2::new(dx, dy);
                self.changed.insert(*z_tier);
                moved = true;
            }
        }
        moved
    }

    /// Zooms every zoomable tier about `(x, y)`, clamped to its bounds.
    pub fn zoom(&mut self, x: f64, y: f64, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let anchor = Vec2::new(x, y);
        let mut zoomed = false;
        for (z_tier, (config, view)) in &mut self.entries {
            if !config.zoomable {
                continue;
            }
            let next = (view.zoom * factor).clamp(config.min_zoom, config.max_zoom);
            let applied = next / view.zoom;
            if (applied - 1.0).abs() < f64::EPSILON {
                continue;
            }
            view.offset = anchor - (anchor - view.offset).scale(applied);
            view.zoom = next;
            self.changed.insert(*z_tier);
            zoomed = true;
        }
        zoomed
    }

    /// Restores the identity view of one tier.
    pub fn reset(&mut self, z_tier: i32) -> bool {
        match self.entries.get_mut(&z_tier) {
            Some((_, view)) if !view.is_identity() => {
                *view = LayerView::default();
                self.changed.insert(z_tier);
                true
            }
            _ => false,
        }
    }

    /// Whether the tier's view changed since the last drain.
    #[must_use]
    pub fn is_changed(&self, z_tier: i32) -> bool {
        self.changed.contains(&z_tier)
    }

    /// Drains the tiers whose view or config changed.
    pub fn take_changed(&mut self) -> BTreeSet<i32> {
        std::mem::take(&mut self.changed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.changed.clear();
    }
}

/// Raster surface of one tier.
#[derive(Debug)]
pub struct Layer<S> {
    pub(crate) z_tier: i32,
    pub(crate) surface: S,
    pub(crate) back_buffer: Option<S>,
    pub(crate) dirty: bool,
    pub(crate) element_count: usize,
}

impl<S> Layer<S> {
    #[must_use]
    pub fn new(z_tier: i32, surface: S) -> Self {
        Self {
            z_tier,
            surface,
            back_buffer: None,
            dirty: true,
            element_count: 0,
        }
    }

    #[must_use]
    pub fn z_tier(&self) -> i32 {
        self.z_tier
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.element_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let mut views = LayerViews::default();
        views
            .configure(
                0,
                LayerConfig {
                    zoomable: true,
                    max_zoom: 2.0,
                    ..LayerConfig::default()
                },
            )
            .expect("configure");
        assert!(views.zoom(100.0, 50.0, 1.5));
        let anchor = views.matrix(0).apply(Vec2::new(100.0, 50.0));
        assert!(anchor.distance(Vec2::new(100.0, 50.0)) < 1e-9);

        views.zoom(0.0, 0.0, 10.0);
        assert!((views.view(0).zoom - 2.0).abs() < 1e-12);
        assert!(!views.zoom(0.0, 0.0, 10.0));
    }

    #[test]
    fn pan_only_moves_pannable_tiers() {
        let mut views = LayerViews::default();
        views
            .configure(
                1,
                LayerConfig {
                    pannable: true,
                    ..LayerConfig::default()
                },
            )
            .expect("configure");
        views.configure(2, LayerConfig::default()).expect("configure");
        views.take_changed();
        assert!(views.pan(5.0, -3.0));
        assert_eq!(views.view(1).offset, Vec2::new(5.0, -3.0));
        assert_eq!(views.view(2).offset, Vec2::ZERO);
        assert_eq!(views.take_changed().into_iter().collect::<Vec<_>>(), vec![1]);
        assert!(views.reset(1));
        assert!(!views.reset(1));
    }

    #[test]
    fn rejects_inverted_zoom_bounds() {
        let config = LayerConfig {
            min_zoom: 3.0,
            max_zoom: 2.0,
            ..LayerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
