use crate::error::SceneResult;
use crate::interaction::{EventKind, HandlerOutcome};
use crate::render::SurfaceBackend;

use super::SceneEngine;

/// Host input entry points. Coordinates are viewport pixels; `time_ms` is
/// the host's monotonic event time.
impl<B: SurfaceBackend> SceneEngine<B> {
    pub fn pointer_down(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_pointer_down(ctx, x, y, time_ms))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_pointer_move(ctx, x, y, time_ms))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_pointer_up(ctx, x, y, time_ms))
    }

    pub fn double_click(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_double_click(ctx, x, y, time_ms))
    }

    /// Pointer left the host widget.
    pub fn pointer_leave(&mut self, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_pointer_leave(ctx, time_ms))
    }

    /// Positive `delta` zooms in on zoomable layers.
    pub fn wheel(&mut self, x: f64, y: f64, delta: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_wheel(ctx, x, y, delta, time_ms))
    }

    pub fn touch_start(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_touch_start(ctx, x, y, time_ms))
    }

    pub fn touch_move(&mut self, x: f64, y: f64, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_touch_move(ctx, x, y, time_ms))
    }

    pub fn touch_end(&mut self, time_ms: f64) -> SceneResult<HandlerOutcome> {
        self.with_input(|handler, ctx| handler.on_touch_end(ctx, time_ms))
    }

    pub fn key_down(&mut self, key: &str, time_ms: f64) -> SceneResult<()> {
        self.key(EventKind::KeyDown, key, time_ms)
    }

    pub fn key_up(&mut self, key: &str, time_ms: f64) -> SceneResult<()> {
        self.key(EventKind::KeyUp, key, time_ms)
    }

    fn key(&mut self, kind: EventKind, key: &str, time_ms: f64) -> SceneResult<()> {
        self.with_input(|handler, ctx| {
            handler.on_key(ctx, kind, key, time_ms)?;
            Ok(HandlerOutcome::default())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::interaction::{DragState, EventKind, SceneEvent};
    use crate::render::NullBackend;
    use crate::scene::Storage;
    use crate::shape::{PropValue, Shape};

    #[test]
    fn drag_moves_shape_and_requests_refresh() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(200, 200)))
                .expect("engine");
        let id = engine
            .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0).draggable(true))
            .expect("add");
        engine.render().expect("render");
        engine.pointer_down(15.0, 15.0, 0.0).expect("down");
        engine.pointer_move(25.0, 20.0, 10.0).expect("move");
        assert!(matches!(engine.drag_state(), DragState::Dragging { .. }));
        engine.pointer_move(35.0, 25.0, 20.0).expect("move");
        engine.pointer_up(35.0, 25.0, 30.0).expect("up");
        assert!(engine.needs_refresh());
        assert_eq!(
            engine.get_property(id, "position"),
            Some(PropValue::Array(vec![20.0, 10.0]))
        );
    }

    #[test]
    fn key_events_reach_scene_listeners() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(50, 50)))
                .expect("engine");
        let keys = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&keys);
        engine
            .on(
                EventKind::KeyDown,
                Rc::new(move |event: &mut SceneEvent, _: &mut Storage| {
                    sink.borrow_mut().push(event.key.clone());
                }),
            )
            .expect("on");
        engine.key_down("Escape", 0.0).expect("key");
        engine.key_up("Escape", 1.0).expect("key");
        assert_eq!(*keys.borrow(), vec![Some("Escape".to_owned())]);
    }
}
