use crate::error::SceneResult;

use super::Layer;

/// Layers kept in ascending `z_tier` order, at most one per tier.
#[derive(Debug)]
pub struct LayerStack<S> {
    layers: Vec<Layer<S>>,
}

impl<S> Default for LayerStack<S> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<S> LayerStack<S> {
    #[must_use]
    pub fn get(&self, z_tier: i32) -> Option<&Layer<S>> {
        self.position(z_tier)
            .ok()
            .and_then(|index| self.layers.get(index))
    }

    pub fn get_mut(&mut self, z_tier: i32) -> Option<&mut Layer<S>> {
        self.position(z_tier)
            .ok()
            .and_then(|index| self.layers.get_mut(index))
    }

    /// Returns the tier's layer, creating it at its sorted position.
    pub fn get_or_create(
        &mut self,
        z_tier: i32,
        create: impl FnOnce() -> SceneResult<S>,
    ) -> SceneResult<&mut Layer<S>> {
        let index = match self.position(z_tier) {
            Ok(index) => index,
            Err(index) => {
                self.layers.insert(index, Layer::new(z_tier, create()?));
                tracing::debug!(z_tier, layers = self.layers.len(), "layer created");
                index
            }
        };
        Ok(&mut self.layers[index])
    }

    fn position(&self, z_tier: i32) -> Result<usize, usize> {
        self.layers.binary_search_by_key(&z_tier, |layer| layer.z_tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer<S>> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer<S>> {
        self.layers.iter_mut()
    }

    #[must_use]
    pub fn tiers(&self) -> Vec<i32> {
        self.layers.iter().map(|layer| layer.z_tier).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
