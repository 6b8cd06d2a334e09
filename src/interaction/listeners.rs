use tracing::trace;

use crate::scene::Storage;

use super::{EventCallback, EventHandlers, EventKind, SceneEvent};

/// Scene-level subscriptions: receive every event after element handlers
/// (unless propagation was stopped) and every event without a target.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    handlers: EventHandlers,
}

impl ListenerRegistry {
    pub fn on(&mut self, kind: EventKind, callback: EventCallback) {
        self.handlers.on(kind, callback);
    }

    /// Removes one listener by identity. Returns `true` when removed.
    pub fn off(&mut self, kind: EventKind, callback: &EventCallback) -> bool {
        self.handlers.off(kind, callback)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[must_use]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.handles(kind)
    }

    /// Invokes every listener registered for the event's kind, in
    /// registration order. Returns the number invoked.
    pub fn dispatch(&self, event: &mut SceneEvent, storage: &mut Storage) -> usize {
        let callbacks = self.handlers.callbacks_for(event.kind);
        for callback in &callbacks {
            callback(event, storage);
        }
        if !callbacks.is_empty() {
            trace!(kind = %event.kind, listeners = callbacks.len(), "scene listeners notified");
        }
        callbacks.len()
    }
}
