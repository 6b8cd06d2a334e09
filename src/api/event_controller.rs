use crate::error::{SceneError, SceneResult};
use crate::interaction::{EventCallback, EventKind, HandlerOutcome, SceneEvent};
use crate::render::SurfaceBackend;

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Subscribes a scene-level listener. Listeners see every event that
    /// was not cancelled while bubbling, plus target-less broadcasts.
    pub fn on(&mut self, kind: EventKind, callback: EventCallback) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.listeners.on(kind, callback);
        Ok(self)
    }

    /// Subscribes by event name, e.g. `"click"` or `"dragend"`.
    pub fn on_named(&mut self, name: &str, callback: EventCallback) -> SceneResult<&mut Self> {
        let kind = EventKind::from_name(name)
            .ok_or_else(|| SceneError::InvalidData(format!("unknown event name `{name}`")))?;
        self.on(kind, callback)
    }

    /// Removes a listener previously passed to [`SceneEngine::on`].
    /// Returns `false` when it was not subscribed.
    pub fn off(&mut self, kind: EventKind, callback: &EventCallback) -> SceneResult<bool> {
        self.ensure_live()?;
        Ok(self.listeners.off(kind, callback))
    }

    /// Replays a synthetic event through the normal dispatch path and
    /// returns it as the handlers left it.
    pub fn trigger(&mut self, event: SceneEvent) -> SceneResult<SceneEvent> {
        let mut delivered = None;
        self.with_input(|handler, ctx| {
            delivered = Some(handler.trigger(ctx, event)?);
            Ok(HandlerOutcome::default())
        })?;
        delivered.ok_or(SceneError::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::interaction::{EventCallback, EventKind, SceneEvent};
    use crate::render::NullBackend;
    use crate::scene::Storage;
    use crate::shape::Shape;

    #[test]
    fn off_detaches_the_same_callback() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(50, 50)))
                .expect("engine");
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let callback: EventCallback =
            Rc::new(move |_: &mut SceneEvent, _: &mut Storage| sink.set(sink.get() + 1));
        engine.on_named("click", Rc::clone(&callback)).expect("on");
        engine
            .trigger(SceneEvent::new(EventKind::Click, 1.0, 1.0))
            .expect("trigger");
        assert!(engine.off(EventKind::Click, &callback).expect("off"));
        assert!(!engine.off(EventKind::Click, &callback).expect("off"));
        engine
            .trigger(SceneEvent::new(EventKind::Click, 1.0, 1.0))
            .expect("trigger");
        assert_eq!(hits.get(), 1);
        assert!(engine.on_named("nope", callback).is_err());
    }

    #[test]
    fn triggered_events_bubble_from_their_target() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(50, 50)))
                .expect("engine");
        let clicked = Rc::new(Cell::new(false));
        let sink = Rc::clone(&clicked);
        let id = engine
            .add_shape(Shape::circle(5.0, 5.0, 2.0).on(
                EventKind::Click,
                Rc::new(move |event: &mut SceneEvent, _: &mut Storage| {
                    sink.set(true);
                    event.stop_propagation();
                }),
            ))
            .expect("add");
        let event = engine
            .trigger(SceneEvent::new(EventKind::Click, 5.0, 5.0).with_target(Some(id)))
            .expect("trigger");
        assert!(clicked.get());
        assert!(event.cancel_bubble);
    }
}
