use crate::error::SceneResult;
use crate::render::{LayerConfig, LayerView, SurfaceBackend};

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Applies compositing and pan/zoom options to one tier. The tier is
    /// repainted on the next refresh.
    pub fn configure_layer(&mut self, z_tier: i32, config: LayerConfig) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.painter.configure_layer(z_tier, config)?;
        self.needs_refresh = true;
        Ok(self)
    }

    #[must_use]
    pub fn layer_config(&self, z_tier: i32) -> LayerConfig {
        self.painter.views().config(z_tier)
    }

    #[must_use]
    pub fn layer_view(&self, z_tier: i32) -> LayerView {
        self.painter.layer_view(z_tier)
    }

    /// Drops any pan/zoom applied to a tier. Returns `false` when the tier
    /// was already at its identity view.
    pub fn reset_layer_view(&mut self, z_tier: i32) -> SceneResult<bool> {
        self.ensure_live()?;
        let reset = self.painter.views_mut().reset(z_tier);
        self.needs_refresh |= reset;
        Ok(reset)
    }

    /// Whether a tier has scene mutations or view changes that the next
    /// refresh will paint.
    #[must_use]
    pub fn is_layer_dirty(&self, z_tier: i32) -> bool {
        self.storage.is_tier_dirty(z_tier)
            || self.painter.views().is_changed(z_tier)
            || self.painter.layer(z_tier).is_some_and(|layer| layer.is_dirty())
    }

    /// Tiers that currently own a layer surface, ascending.
    #[must_use]
    pub fn layer_tiers(&self) -> Vec<i32> {
        self.painter.layers().tiers()
    }
}
