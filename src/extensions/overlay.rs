use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{SceneError, SceneResult};
use crate::interaction::SceneEvent;
use crate::shape::ElementId;

/// Read-only engine state passed alongside broadcast events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayContext {
    pub viewport: Viewport,
    pub hovered: Option<ElementId>,
    pub dragging: Option<ElementId>,
}

/// Host-owned drawing or UI layer that lives outside the scene graph.
///
/// Overlays only observe events that hit no primitive; they cannot mutate
/// the scene directly.
pub trait ExternalOverlay {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &SceneEvent, context: OverlayContext);
}

/// Registered overlays in registration order, unique by id.
#[derive(Default)]
pub struct OverlayRegistry {
    overlays: Vec<Box<dyn ExternalOverlay>>,
}

impl std::fmt::Debug for OverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.overlays.iter().map(|overlay| overlay.id()))
            .finish()
    }
}

impl OverlayRegistry {
    pub fn register(&mut self, overlay: Box<dyn ExternalOverlay>) -> SceneResult<()> {
        let overlay_id = overlay.id().to_owned();
        if overlay_id.is_empty() {
            return Err(SceneError::InvalidData(
                "overlay id must not be empty".to_owned(),
            ));
        }
        if self.has(&overlay_id) {
            return Err(SceneError::InvalidData(format!(
                "overlay with id `{overlay_id}` is already registered"
            )));
        }
        self.overlays.push(overlay);
        Ok(())
    }

    /// Unregisters an overlay by id. Returns `true` when removed.
    pub fn unregister(&mut self, overlay_id: &str) -> bool {
        if let Some(position) = self
            .overlays
            .iter()
            .position(|entry| entry.id() == overlay_id)
        {
            self.overlays.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn has(&self, overlay_id: &str) -> bool {
        self.overlays.iter().any(|overlay| overlay.id() == overlay_id)
    }

    pub fn broadcast(&mut self, event: &SceneEvent, context: OverlayContext) {
        for overlay in &mut self.overlays {
            overlay.on_event(event, context);
        }
    }

    pub fn clear(&mut self) {
        self.overlays.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::interaction::EventKind;

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
    fn ids_are_unique_and_broadcast_reaches_all() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = OverlayRegistry::default();
        registry
            .register(Box::new(Recorder { id: "tooltip", seen: Rc::clone(&seen) }))
            .expect("register");
        assert!(registry
            .register(Box::new(Recorder { id: "tooltip", seen: Rc::clone(&seen) }))
            .is_err());
        assert!(registry
            .register(Box::new(Recorder { id: "", seen: Rc::clone(&seen) }))
            .is_err());
        registry.broadcast(
            &SceneEvent::new(EventKind::Click, 1.0, 2.0),
            OverlayContext {
                viewport: Viewport::new(10, 10),
                hovered: None,
                dragging: None,
            },
        );
        assert_eq!(*seen.borrow(), vec![EventKind::Click]);
        assert!(registry.unregister("tooltip"));
        assert!(!registry.unregister("tooltip"));
        assert_eq!(registry.count(), 0);
    }
}
