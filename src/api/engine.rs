use tracing::debug;

use crate::animation::Scheduler;
use crate::core::Viewport;
use crate::error::{SceneError, SceneResult};
use crate::extensions::OverlayRegistry;
use crate::interaction::{Cursor, DispatchContext, DragState, Handler, HandlerOutcome, ListenerRegistry};
use crate::render::{Painter, SurfaceBackend};
use crate::scene::Storage;
use crate::shape::ElementId;

use super::EngineConfig;

/// Scene engine facade.
///
/// Owns the scene storage, the layered painter, the input handler and the
/// animation scheduler. Mutations mark the engine as needing a frame; the
/// host drives painting through [`SceneEngine::tick`] or the explicit
/// `render`/`refresh` calls.
pub struct SceneEngine<B: SurfaceBackend> {
    pub(super) storage: Storage,
    pub(super) painter: Painter<B>,
    pub(super) handler: Handler,
    pub(super) scheduler: Scheduler,
    pub(super) listeners: ListenerRegistry,
    pub(super) overlays: OverlayRegistry,
    pub(super) config: EngineConfig,
    pub(super) needs_refresh: bool,
    pub(super) needs_hover_refresh: bool,
    pub(super) disposed: bool,
}

impl<B: SurfaceBackend> std::fmt::Debug for SceneEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEngine")
            .field("painter", &self.painter)
            .field("elements", &self.storage.len())
            .field("clips", &self.scheduler.len())
            .field("needs_refresh", &self.needs_refresh)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<B: SurfaceBackend> SceneEngine<B> {
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.painter.width(), self.painter.height())
    }

    /// Read access to the scene graph.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn painter(&self) -> &Painter<B> {
        &self.painter
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.handler.hovered()
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.handler.drag_state()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.handler.cursor()
    }

    /// Whether a full refresh is pending for the next tick.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stops every clip, detaches listeners and overlays, and frees the
    /// layer surfaces. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.clear();
        self.listeners.clear();
        self.overlays.clear();
        self.handler.dispose();
        self.painter.dispose();
        self.storage.dispose();
        self.needs_refresh = false;
        self.needs_hover_refresh = false;
        self.disposed = true;
        debug!("scene engine disposed");
    }

    pub(super) fn ensure_live(&self) -> SceneResult<()> {
        if self.disposed {
            return Err(SceneError::Disposed);
        }
        Ok(())
    }

    pub(super) fn apply_outcome(&mut self, outcome: HandlerOutcome) {
        self.needs_refresh |= outcome.refresh;
        self.needs_hover_refresh |= outcome.refresh_hover;
    }

    /// Runs one handler entry point with a dispatch context borrowed from
    /// the engine, then records what needs repainting.
    pub(super) fn with_input<F>(&mut self, input: F) -> SceneResult<HandlerOutcome>
    where
        F: FnOnce(&mut Handler, &mut DispatchContext<'_>) -> SceneResult<HandlerOutcome>,
    {
        self.ensure_live()?;
        let viewport = self.viewport();
        let mut ctx = DispatchContext {
            storage: &mut self.storage,
            views: self.painter.views_mut(),
            listeners: &self.listeners,
            overlays: &mut self.overlays,
            viewport,
        };
        let outcome = input(&mut self.handler, &mut ctx)?;
        self.apply_outcome(outcome);
        Ok(outcome)
    }
}
