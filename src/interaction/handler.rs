use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{MIN_STROKE_HIT_WIDTH, Vec2, Viewport};
use crate::error::{SceneError, SceneResult};
use crate::extensions::{OverlayContext, OverlayRegistry};
use crate::render::LayerViews;
use crate::scene::Storage;
use crate::shape::ElementId;

use super::{EventKind, ListenerRegistry, SceneEvent};

/// Taps closer together than this fire a double click.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
const DOUBLE_TAP_SLOP: f64 = 10.0;

/// Pointer handling tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Minimum press duration before a move may start a drag.
    pub drag_dwell_ms: f64,
    /// Moves since press above which a click is suppressed.
    pub click_threshold: u32,
    pub min_stroke_width: f64,
    /// Zoom factor applied per wheel notch.
    pub wheel_zoom_step: f64,
    pub hover_enabled: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            drag_dwell_ms: 0.0,
            click_threshold: 5,
            min_stroke_width: MIN_STROKE_HIT_WIDTH,
            wheel_zoom_step: 1.1,
            hover_enabled: true,
        }
    }
}

impl HandlerConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if !self.drag_dwell_ms.is_finite() || self.drag_dwell_ms < 0.0 {
            return Err(SceneError::InvalidData(
                "drag dwell time must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_stroke_width.is_finite() || self.min_stroke_width <= 0.0 {
            return Err(SceneError::InvalidData(
                "minimum stroke hit width must be finite and > 0".to_owned(),
            ));
        }
        if !self.wheel_zoom_step.is_finite() || self.wheel_zoom_step <= 1.0 {
            return Err(SceneError::InvalidData(
                "wheel zoom step must be finite and > 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Pointer affordance the host should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
}

/// Drag-and-drop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A draggable shape was pressed; waiting for the first qualifying move.
    Primed { target: ElementId, pressed_at: f64 },
    Dragging {
        target: ElementId,
        last_over: Option<ElementId>,
    },
}

impl DragState {
    #[must_use]
    pub fn dragging(self) -> Option<ElementId> {
        match self {
            Self::Dragging { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// What the host should repaint after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerOutcome {
    pub refresh: bool,
    pub refresh_hover: bool,
}

impl HandlerOutcome {
    fn merge(&mut self, other: Self) {
        self.refresh |= other.refresh;
        self.refresh_hover |= other.refresh_hover;
    }
}

/// Everything dispatch needs from the engine for the duration of one event.
pub struct DispatchContext<'a> {
    pub storage: &'a mut Storage,
    pub views: &'a mut LayerViews,
    pub listeners: &'a ListenerRegistry,
    pub overlays: &'a mut OverlayRegistry,
    pub viewport: Viewport,
}

/// Translates raw pointer and keyboard input into scene events.
#[derive(Debug, Clone, Default)]
pub struct Handler {
    config: HandlerConfig,
    hovered: Option<ElementId>,
    pointer_down: bool,
    down_target: Option<ElementId>,
    drag: DragState,
    last: Vec2,
    moves_since_press: u32,
    cursor: Cursor,
    last_tap: Option<(f64, Vec2)>,
    disposed: bool,
}

impl Handler {
    pub fn new(config: HandlerConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> HandlerConfig {
        self.config
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    #[must_use]
    pub fn pointer_down_target(&self) -> Option<ElementId> {
        self.down_target
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn last_pointer(&self) -> Vec2 {
        self.last
    }

    fn ensure_live(&self) -> SceneResult<()> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Topmost interactive shape under the point, walking the paint list
    /// back to front. Each layer's pan/zoom is undone before testing.
    #[must_use]
    pub fn find_hover(&self, storage: &Storage, views: &LayerViews, x: f64, y: f64) -> Option<ElementId> {
        let exclude = self.drag.dragging();
        for entry in storage.cached_paint_list().iter().rev() {
            if Some(entry.id) == exclude {
                continue;
            }
            let Some(shape) = storage.shape(entry.id) else {
                continue;
            };
            if shape.invisible || shape.flags.is_silent() {
                continue;
            }
            let Some(inverse) = views.matrix(entry.z_tier).invert() else {
                continue;
            };
            let point = inverse.apply(Vec2::new(x, y));
            if shape.hit_test(&entry.world, self.config.min_stroke_width, point.x, point.y)
                && entry.clips_accept(point.x, point.y)
            {
                return Some(entry.id);
            }
        }
        None
    }

    pub fn on_pointer_down(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        ctx.storage.paint_list();
        self.last = Vec2::new(x, y);
        self.pointer_down = true;
        self.moves_since_press = 0;
        let target = self.find_hover(ctx.storage, ctx.views, x, y);
        self.down_target = target;
        self.drag = match target {
            Some(id) if ctx.storage.shape(id).is_some_and(|shape| shape.flags.draggable) => {
                DragState::Primed {
                    target: id,
                    pressed_at: time_ms,
                }
            }
            _ => DragState::Idle,
        };
        self.dispatch(ctx, SceneEvent::new(EventKind::MouseDown, x, y).with_target(target).with_time(time_ms));
        Ok(HandlerOutcome::default())
    }

    pub fn on_pointer_move(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        let mut outcome = HandlerOutcome::default();
        let delta = Vec2::new(x - self.last.x, y - self.last.y);
        self.last = Vec2::new(x, y);
        let had_hover = ctx.storage.has_hover();

        if let DragState::Primed { target, pressed_at } = self.drag {
            if self.pointer_down && time_ms - pressed_at >= self.config.drag_dwell_ms {
                self.drag = DragState::Dragging {
                    target,
                    last_over: None,
                };
                ctx.storage.set_drag_ghost(Some(target));
                debug!(%target, "drag started");
                self.dispatch(
                    ctx,
                    SceneEvent::new(EventKind::DragStart, x, y)
                        .with_target(Some(target))
                        .with_time(time_ms),
                );
                outcome.refresh = true;
            }
        }

        ctx.storage.paint_list();
        let hovered = self.find_hover(ctx.storage, ctx.views, x, y);
        let dragged = self.drag.dragging();
        if hovered != self.hovered {
            if let Some(previous) = self.hovered {
                self.dispatch(
                    ctx,
                    SceneEvent::new(EventKind::MouseOut, x, y)
                        .with_target(Some(previous))
                        .with_time(time_ms),
                );
            }
            if let Some(current) = hovered {
                self.dispatch(
                    ctx,
                    SceneEvent::new(EventKind::MouseOver, x, y)
                        .with_target(Some(current))
                        .with_time(time_ms),
                );
            }
        }
        if let DragState::Dragging { target, last_over } = self.drag {
            if hovered != last_over {
                if let Some(previous) = last_over {
                    self.dispatch(ctx, drag_event(EventKind::DragLeave, x, y, Some(previous), target, time_ms));
                }
                if let Some(current) = hovered {
                    self.dispatch(ctx, drag_event(EventKind::DragEnter, x, y, Some(current), target, time_ms));
                }
                self.drag = DragState::Dragging {
                    target,
                    last_over: hovered,
                };
            }
        }
        self.hovered = hovered;

        if let Some(target) = dragged {
            let tier = ctx.storage.shape(target).map_or(0, |shape| shape.z_tier);
            let scene_delta = ctx
                .views
                .matrix(tier)
                .invert()
                .map_or(delta, |inverse| inverse.apply_vector(delta));
            if ctx.storage.contains(target) {
                ctx.storage.drift(target, scene_delta.x, scene_delta.y)?;
            }
            self.moves_since_press += 1;
            if hovered.is_some() {
                self.dispatch(ctx, drag_event(EventKind::DragOver, x, y, hovered, target, time_ms));
            }
        } else if hovered.is_none() && self.pointer_down && (delta.x != 0.0 || delta.y != 0.0) {
            if ctx.views.pan(delta.x, delta.y) {
                outcome.refresh = true;
            }
            self.moves_since_press += 1;
        } else if self.pointer_down {
            self.moves_since_press += 1;
        }

        ctx.storage.clear_hover();
        if self.config.hover_enabled {
            if let Some(current) = hovered {
                if ctx.storage.shape(current).is_some_and(|shape| shape.flags.hoverable) {
                    ctx.storage.add_hover(current);
                }
            }
        }
        if let Some(target) = dragged {
            ctx.storage.add_hover(target);
        }
        self.cursor = self.resolve_cursor(ctx.storage, hovered);

        self.dispatch(
            ctx,
            SceneEvent::new(EventKind::MouseMove, x, y)
                .with_target(hovered)
                .with_time(time_ms),
        );
        outcome.refresh_hover = had_hover || ctx.storage.has_hover();
        Ok(outcome)
    }

    fn resolve_cursor(&self, storage: &Storage, hovered: Option<ElementId>) -> Cursor {
        if self.drag.dragging().is_some() {
            return Cursor::Move;
        }
        match hovered.and_then(|id| storage.shape(id)) {
            Some(shape) if shape.flags.draggable => Cursor::Move,
            Some(shape) if shape.flags.clickable => Cursor::Pointer,
            _ => Cursor::Default,
        }
    }

    pub fn on_pointer_up(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        let mut outcome = HandlerOutcome::default();
        ctx.storage.paint_list();
        let target = self.find_hover(ctx.storage, ctx.views, x, y);
        self.dispatch(
            ctx,
            SceneEvent::new(EventKind::MouseUp, x, y)
                .with_target(target)
                .with_time(time_ms),
        );
        let clicked = self.pointer_down && self.moves_since_press <= self.config.click_threshold;
        let mut click_target = target;
        if self.drag.dragging().is_some() {
            outcome.merge(self.finish_drag(ctx, x, y, target, time_ms));
            // The dragged shape is hittable again once the drag ends.
            ctx.storage.paint_list();
            click_target = self.find_hover(ctx.storage, ctx.views, x, y);
        }
        if clicked {
            self.dispatch(
                ctx,
                SceneEvent::new(EventKind::Click, x, y)
                    .with_target(click_target)
                    .with_time(time_ms),
            );
        }
        self.pointer_down = false;
        self.down_target = None;
        self.drag = DragState::Idle;
        self.moves_since_press = 0;
        self.cursor = self.resolve_cursor(ctx.storage, target);
        Ok(outcome)
    }

    fn finish_drag(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        drop_target: Option<ElementId>,
        time_ms: f64,
    ) -> HandlerOutcome {
        let Some(dragged) = self.drag.dragging() else {
            return HandlerOutcome::default();
        };
        if drop_target.is_some() {
            self.dispatch(ctx, drag_event(EventKind::Drop, x, y, drop_target, dragged, time_ms));
        }
        self.dispatch(ctx, drag_event(EventKind::DragEnd, x, y, Some(dragged), dragged, time_ms));
        ctx.storage.set_drag_ghost(None);
        ctx.storage.clear_hover();
        self.drag = DragState::Idle;
        debug!(%dragged, ?drop_target, "drag finished");
        HandlerOutcome {
            refresh: true,
            refresh_hover: true,
        }
    }

    /// Host-recognised double click.
    pub fn on_double_click(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        ctx.storage.paint_list();
        let target = self.find_hover(ctx.storage, ctx.views, x, y);
        self.dispatch(
            ctx,
            SceneEvent::new(EventKind::DblClick, x, y)
                .with_target(target)
                .with_time(time_ms),
        );
        Ok(HandlerOutcome::default())
    }

    /// Pointer left the viewport. An active drag still gets its drop and
    /// drag-end.
    pub fn on_pointer_leave(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        let Vec2 { x, y } = self.last;
        let mut outcome = HandlerOutcome::default();
        if let DragState::Dragging { last_over, .. } = self.drag {
            outcome.merge(self.finish_drag(ctx, x, y, last_over, time_ms));
        }
        if let Some(previous) = self.hovered.take() {
            self.dispatch(
                ctx,
                SceneEvent::new(EventKind::MouseOut, x, y)
                    .with_target(Some(previous))
                    .with_time(time_ms),
            );
        }
        if ctx.storage.has_hover() {
            ctx.storage.clear_hover();
            outcome.refresh_hover = true;
        }
        self.dispatch(ctx, SceneEvent::new(EventKind::GlobalOut, x, y).with_time(time_ms));
        self.pointer_down = false;
        self.down_target = None;
        self.drag = DragState::Idle;
        self.moves_since_press = 0;
        self.cursor = Cursor::Default;
        Ok(outcome)
    }

    /// Wheel input. Positive `delta` zooms in around the pointer on every
    /// zoomable layer.
    pub fn on_wheel(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        delta: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.ensure_live()?;
        let mut outcome = HandlerOutcome::default();
        if delta != 0.0 && delta.is_finite() {
            let factor = if delta > 0.0 {
                self.config.wheel_zoom_step
            } else {
                1.0 / self.config.wheel_zoom_step
            };
            outcome.refresh = ctx.views.zoom(x, y, factor);
        }
        ctx.storage.paint_list();
        let target = self.find_hover(ctx.storage, ctx.views, x, y);
        let mut event = SceneEvent::new(EventKind::MouseWheel, x, y)
            .with_target(target)
            .with_time(time_ms);
        event.wheel_delta = delta;
        self.dispatch(ctx, event);
        Ok(outcome)
    }

    pub fn on_touch_start(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.last = Vec2::new(x, y);
        let mut outcome = self.on_pointer_move(ctx, x, y, time_ms)?;
        outcome.merge(self.on_pointer_down(ctx, x, y, time_ms)?);
        Ok(outcome)
    }

    pub fn on_touch_move(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        self.on_pointer_move(ctx, x, y, time_ms)
    }

    /// Ends a touch at the last known point. Taps click; two taps inside
    /// [`DOUBLE_TAP_WINDOW_MS`] also double click.
    pub fn on_touch_end(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        time_ms: f64,
    ) -> SceneResult<HandlerOutcome> {
        let Vec2 { x, y } = self.last;
        let was_tap = self.moves_since_press <= self.config.click_threshold;
        let mut outcome = self.on_pointer_up(ctx, x, y, time_ms)?;
        if was_tap {
            let point = Vec2::new(x, y);
            match self.last_tap {
                Some((at, previous))
                    if time_ms - at <= DOUBLE_TAP_WINDOW_MS
                        && previous.distance(point) <= DOUBLE_TAP_SLOP =>
                {
                    outcome.merge(self.on_double_click(ctx, x, y, time_ms)?);
                    self.last_tap = None;
                }
                _ => self.last_tap = Some((time_ms, point)),
            }
        }
        if let Some(previous) = self.hovered.take() {
            self.dispatch(
                ctx,
                SceneEvent::new(EventKind::MouseOut, x, y)
                    .with_target(Some(previous))
                    .with_time(time_ms),
            );
        }
        if ctx.storage.has_hover() {
            ctx.storage.clear_hover();
            outcome.refresh_hover = true;
        }
        Ok(outcome)
    }

    /// Key events have no spatial target and are broadcast.
    pub fn on_key(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        kind: EventKind,
        key: &str,
        time_ms: f64,
    ) -> SceneResult<()> {
        self.ensure_live()?;
        if !matches!(kind, EventKind::KeyDown | EventKind::KeyUp) {
            return Err(SceneError::InvalidData(format!(
                "`{kind}` is not a keyboard event"
            )));
        }
        let mut event = SceneEvent::new(kind, self.last.x, self.last.y).with_time(time_ms);
        event.key = Some(key.to_owned());
        self.dispatch(ctx, event);
        Ok(())
    }

    /// Delivers a synthetic event as if the handler produced it.
    pub fn trigger(&mut self, ctx: &mut DispatchContext<'_>, event: SceneEvent) -> SceneResult<SceneEvent> {
        self.ensure_live()?;
        Ok(self.dispatch(ctx, event))
    }

    /// Bubbles an event from its target through the parent chain, then to
    /// scene listeners. Events with no live target are broadcast to
    /// listeners and external overlays.
    fn dispatch(&self, ctx: &mut DispatchContext<'_>, mut event: SceneEvent) -> SceneEvent {
        if event.target.is_some_and(|id| !ctx.storage.contains(id)) {
            event.target = None;
        }
        let Some(target) = event.target else {
            ctx.listeners.dispatch(&mut event, ctx.storage);
            let context = OverlayContext {
                viewport: ctx.viewport,
                hovered: self.hovered,
                dragging: self.drag.dragging(),
            };
            ctx.overlays.broadcast(&event, context);
            return event;
        };
        let mut current = Some(target);
        'bubble: while let Some(id) = current {
            let callbacks = match ctx.storage.get(id) {
                Some(element) => element.handlers().callbacks_for(event.kind),
                None => break,
            };
            for callback in &callbacks {
                callback(&mut event, ctx.storage);
                if event.cancel_bubble {
                    break 'bubble;
                }
            }
            current = ctx.storage.get(id).and_then(|element| element.parent());
        }
        if !event.cancel_bubble {
            ctx.listeners.dispatch(&mut event, ctx.storage);
        }
        trace!(kind = %event.kind, %target, "event dispatched");
        event
    }

    /// Drops pointer state and rejects later input. Idempotent.
    pub fn dispose(&mut self) {
        self.hovered = None;
        self.pointer_down = false;
        self.down_target = None;
        self.drag = DragState::Idle;
        self.last_tap = None;
        self.disposed = true;
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn drag_event(
    kind: EventKind,
    x: f64,
    y: f64,
    target: Option<ElementId>,
    dragged: ElementId,
    time_ms: f64,
) -> SceneEvent {
    let mut event = SceneEvent::new(kind, x, y)
        .with_target(target)
        .with_time(time_ms);
    event.dragged = Some(dragged);
    event
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::interaction::EventCallback;
    use crate::render::LayerConfig;
    use crate::shape::Shape;

    struct Fixture {
        storage: Storage,
        views: LayerViews,
        listeners: ListenerRegistry,
        overlays: OverlayRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                storage: Storage::new(),
                views: LayerViews::default(),
                listeners: ListenerRegistry::default(),
                overlays: OverlayRegistry::default(),
            }
        }

        fn ctx(&mut self) -> DispatchContext<'_> {
            DispatchContext {
                storage: &mut self.storage,
                views: &mut self.views,
                listeners: &self.listeners,
                overlays: &mut self.overlays,
                viewport: Viewport::new(200, 200),
            }
        }
    }

    fn record(log: &Rc<RefCell<Vec<EventKind>>>) -> EventCallback {
        let log = Rc::clone(log);
        Rc::new(move |event: &mut SceneEvent, _: &mut Storage| log.borrow_mut().push(event.kind))
    }

    #[test]
    fn topmost_shape_wins() {
        let mut fixture = Fixture::new();
        let below = fixture
            .storage
            .add_root(Shape::rect(0.0, 0.0, 50.0, 50.0).with_z(0, 0.0).clickable(true))
            .expect("add");
        let above = fixture
            .storage
            .add_root(Shape::rect(10.0, 10.0, 10.0, 10.0).with_z(0, 1.0).clickable(true))
            .expect("add");
        fixture.storage.paint_list();
        let handler = Handler::default();
        assert_eq!(handler.find_hover(&fixture.storage, &fixture.views, 15.0, 15.0), Some(above));
        assert_eq!(handler.find_hover(&fixture.storage, &fixture.views, 40.0, 40.0), Some(below));
        assert_eq!(handler.find_hover(&fixture.storage, &fixture.views, 90.0, 90.0), None);
    }

    #[test]
    fn silent_shapes_are_skipped() {
        let mut fixture = Fixture::new();
        fixture
            .storage
            .add_root(Shape::rect(0.0, 0.0, 50.0, 50.0).hoverable(false))
            .expect("add");
        fixture.storage.paint_list();
        let handler = Handler::default();
        assert_eq!(handler.find_hover(&fixture.storage, &fixture.views, 10.0, 10.0), None);
    }

    #[test]
    fn click_bubbles_to_group_unless_stopped() {
        let mut fixture = Fixture::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let group_log = Rc::clone(&log);
        let group = crate::shape::Group::new()
            .on(
                EventKind::Click,
                Rc::new(move |_: &mut SceneEvent, _: &mut Storage| {
                    group_log.borrow_mut().push(EventKind::DblClick)
                }),
            )
            .with_child(Shape::rect(0.0, 0.0, 20.0, 20.0).clickable(true).on(EventKind::Click, record(&log)));
        fixture.storage.add_root(group).expect("add");
        let mut handler = Handler::default();
        handler.on_pointer_down(&mut fixture.ctx(), 5.0, 5.0, 0.0).expect("down");
        handler.on_pointer_up(&mut fixture.ctx(), 5.0, 5.0, 10.0).expect("up");
        assert_eq!(*log.borrow(), vec![EventKind::Click, EventKind::DblClick]);
    }

    #[test]
    fn pressing_empty_space_pans_pannable_layers() {
        let mut fixture = Fixture::new();
        fixture
            .views
            .configure(0, LayerConfig { pannable: true, ..LayerConfig::default() })
            .expect("configure");
        let mut handler = Handler::default();
        handler.on_pointer_down(&mut fixture.ctx(), 10.0, 10.0, 0.0).expect("down");
        let outcome = handler.on_pointer_move(&mut fixture.ctx(), 30.0, 15.0, 5.0).expect("move");
        assert!(outcome.refresh);
        let view = fixture.views.view(0);
        assert_eq!((view.offset.x, view.offset.y), (20.0, 5.0));
    }

    #[test]
    fn leave_during_drag_fires_drag_end() {
        let mut fixture = Fixture::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        fixture.listeners.on(EventKind::DragEnd, record(&log));
        fixture.listeners.on(EventKind::GlobalOut, record(&log));
        let id = fixture
            .storage
            .add_root(Shape::circle(20.0, 20.0, 10.0).draggable(true))
            .expect("add");
        let mut handler = Handler::default();
        handler.on_pointer_down(&mut fixture.ctx(), 20.0, 20.0, 0.0).expect("down");
        handler.on_pointer_move(&mut fixture.ctx(), 25.0, 20.0, 16.0).expect("move");
        assert_eq!(fixture.storage.drag_ghost(), Some(id));
        handler.on_pointer_leave(&mut fixture.ctx(), 32.0).expect("leave");
        assert_eq!(fixture.storage.drag_ghost(), None);
        assert_eq!(*log.borrow(), vec![EventKind::DragEnd, EventKind::GlobalOut]);
        assert_eq!(handler.drag_state(), DragState::Idle);
    }

    #[test]
    fn double_tap_fires_dblclick() {
        let mut fixture = Fixture::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        fixture.listeners.on(EventKind::DblClick, record(&log));
        let mut handler = Handler::default();
        for start in [0.0, 200.0] {
            handler.on_touch_start(&mut fixture.ctx(), 5.0, 5.0, start).expect("start");
            handler.on_touch_end(&mut fixture.ctx(), start + 50.0).expect("end");
        }
        assert_eq!(*log.borrow(), vec![EventKind::DblClick]);
    }

    #[test]
    fn disposed_handler_rejects_input() {
        let mut fixture = Fixture::new();
        let mut handler = Handler::default();
        handler.dispose();
        assert!(matches!(
            handler.on_pointer_move(&mut fixture.ctx(), 1.0, 1.0, 0.0),
            Err(SceneError::Disposed)
        ));
    }
}
