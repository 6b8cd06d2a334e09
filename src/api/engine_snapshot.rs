use serde::{Deserialize, Serialize};

use crate::core::{Vec2, Viewport};
use crate::error::{SceneError, SceneResult};
use crate::render::SurfaceBackend;
use crate::shape::ElementId;

use super::SceneEngine;

/// State of one layer surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub z_tier: i32,
    pub dirty: bool,
    pub element_count: usize,
    pub zoom: f64,
    pub offset: Vec2,
}

/// Serializable engine state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub viewport: Viewport,
    pub layers: Vec<LayerSnapshot>,
    /// Element ids in paint order.
    pub paint_list: Vec<ElementId>,
    pub clip_count: usize,
    pub hover_count: usize,
    pub needs_refresh: bool,
    pub disposed: bool,
}

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Captures the engine state. Rebuilds the paint list if it is stale.
    pub fn snapshot(&mut self) -> EngineSnapshot {
        let paint_list = self
            .storage
            .paint_list()
            .iter()
            .map(|entry| entry.id)
            .collect();
        let layers = self
            .painter
            .layers()
            .iter()
            .map(|layer| {
                let view = self.painter.layer_view(layer.z_tier());
                LayerSnapshot {
                    z_tier: layer.z_tier(),
                    dirty: self.is_layer_dirty(layer.z_tier()),
                    element_count: layer.element_count(),
                    zoom: view.zoom,
                    offset: view.offset,
                }
            })
            .collect();
        EngineSnapshot {
            viewport: self.viewport(),
            layers,
            paint_list,
            clip_count: self.scheduler.len(),
            hover_count: self.storage.hover_count(),
            needs_refresh: self.needs_refresh,
            disposed: self.disposed,
        }
    }

    /// Serializes [`SceneEngine::snapshot`] as pretty JSON.
    pub fn snapshot_json_pretty(&mut self) -> SceneResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|err| SceneError::InvalidData(format!("failed to serialize snapshot: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::render::NullBackend;
    use crate::shape::Shape;

    use super::EngineSnapshot;

    #[test]
    fn snapshot_lists_paint_order_and_layers() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(80, 60)))
                .expect("engine");
        let top = engine
            .add_shape(Shape::circle(10.0, 10.0, 5.0).with_z(1, 0.0))
            .expect("add");
        let bottom = engine
            .add_shape(Shape::circle(20.0, 20.0, 5.0).with_z(0, 3.0))
            .expect("add");
        engine.render().expect("render");
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.paint_list, vec![bottom, top]);
        assert_eq!(snapshot.layers.len(), 2);
        assert!(snapshot.layers.iter().all(|layer| !layer.dirty && layer.element_count == 1));

        let json = engine.snapshot_json_pretty().expect("json");
        let parsed: EngineSnapshot = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, snapshot);
    }
}
