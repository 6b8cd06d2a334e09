use tracing::debug;

use crate::animation::Scheduler;
use crate::error::SceneResult;
use crate::extensions::OverlayRegistry;
use crate::interaction::{Handler, ListenerRegistry};
use crate::render::{Painter, SurfaceBackend};
use crate::scene::Storage;

use super::{EngineConfig, SceneEngine};

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Creates an engine drawing through `backend`.
    pub fn new(backend: B, config: EngineConfig) -> SceneResult<Self> {
        config.validate()?;
        let handler = Handler::new(config.handler_config())?;
        let painter = Painter::new(
            backend,
            config.viewport.width,
            config.viewport.height,
            config.painter_options(),
        )?;
        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            backend = painter.backend().name(),
            "scene engine created"
        );
        Ok(Self {
            storage: Storage::new(),
            painter,
            handler,
            scheduler: Scheduler::default(),
            listeners: ListenerRegistry::default(),
            overlays: OverlayRegistry::default(),
            config,
            needs_refresh: true,
            needs_hover_refresh: false,
            disposed: false,
        })
    }
}
