use crate::error::SceneResult;
use crate::extensions::ExternalOverlay;
use crate::render::SurfaceBackend;

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Registers an external overlay with a unique identifier. Overlays
    /// receive every event that hit no primitive.
    pub fn register_overlay(&mut self, overlay: Box<dyn ExternalOverlay>) -> SceneResult<()> {
        self.ensure_live()?;
        self.overlays.register(overlay)
    }

    /// Unregisters an overlay by id. Returns `true` when removed.
    pub fn unregister_overlay(&mut self, overlay_id: &str) -> bool {
        self.overlays.unregister(overlay_id)
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.count()
    }

    #[must_use]
    pub fn has_overlay(&self, overlay_id: &str) -> bool {
        self.overlays.has(overlay_id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::extensions::{ExternalOverlay, OverlayContext};
    use crate::interaction::{EventKind, SceneEvent};
    use crate::render::NullBackend;
    use crate::shape::Shape;

    struct Recorder {
        id: &'static str,
        seen: Rc<RefCell<Vec<EventKind>>>,
    }

    impl ExternalOverlay for Recorder {
        fn id(&self) -> &str {
            self.id
        }

        fn on_event(&mut self, event: &SceneEvent, _context: OverlayContext) {
            self.seen.borrow_mut().push(event.kind);
        }
    }

    #[test]
    fn overlays_see_only_target_less_events() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(100, 100)))
                .expect("engine");
        engine.add_shape(Shape::rect(0.0, 0.0, 20.0, 20.0)).expect("add");
        let seen = Rc::new(RefCell::new(Vec::new()));
        engine
            .register_overlay(Box::new(Recorder {
                id: "tooltip",
                seen: Rc::clone(&seen),
            }))
            .expect("register");
        assert!(
            engine
                .register_overlay(Box::new(Recorder {
                    id: "tooltip",
                    seen: Rc::clone(&seen),
                }))
                .is_err()
        );
        engine.pointer_move(10.0, 10.0, 0.0).expect("move");
        engine.pointer_move(80.0, 80.0, 1.0).expect("move");
        assert_eq!(*seen.borrow(), vec![EventKind::MouseMove]);
        assert!(engine.has_overlay("tooltip"));
        assert!(engine.unregister_overlay("tooltip"));
        assert_eq!(engine.overlay_count(), 0);
    }
}
