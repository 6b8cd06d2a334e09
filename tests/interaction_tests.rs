use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::{Vec2, Viewport};
use scenic_rs::interaction::{Cursor, DragState, EventCallback, EventKind, SceneEvent};
use scenic_rs::render::{LayerConfig, NullBackend};
use scenic_rs::scene::Storage;
use scenic_rs::shape::{ClipPath, ElementId, Group, PropValue, Shape};

fn engine() -> SceneEngine<NullBackend> {
    SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(300, 200)))
        .expect("engine init")
}

type Log = Rc<RefCell<Vec<(EventKind, Option<ElementId>)>>>;

fn recorder(log: &Log, kinds: &'static [EventKind]) -> EventCallback {
    let log = Rc::clone(log);
    Rc::new(move |event: &mut SceneEvent, _: &mut Storage| {
        if kinds.contains(&event.kind) {
            log.borrow_mut().push((event.kind, event.target));
        }
    })
}

const DRAG_KINDS: &[EventKind] = &[
    EventKind::DragStart,
    EventKind::DragEnter,
    EventKind::DragOver,
    EventKind::DragLeave,
    EventKind::Drop,
    EventKind::DragEnd,
];

fn listen_all(engine: &mut SceneEngine<NullBackend>, log: &Log, kinds: &'static [EventKind]) {
    for kind in kinds {
        engine.on(*kind, recorder(log, kinds)).expect("listen");
    }
}

#[test]
fn drag_and_drop_emits_events_in_order_and_moves_the_shape() {
    let mut engine = engine();
    let dragged = engine
        .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0).draggable(true))
        .expect("add");
    let zone = engine
        .add_shape(Shape::rect(100.0, 0.0, 50.0, 50.0))
        .expect("add");
    engine.render().expect("render");
    let log: Log = Rc::default();
    listen_all(&mut engine, &log, DRAG_KINDS);

    engine.pointer_down(15.0, 15.0, 0.0).expect("down");
    assert!(matches!(engine.drag_state(), DragState::Primed { .. }));
    engine.pointer_move(20.0, 15.0, 10.0).expect("move");
    assert_eq!(engine.cursor(), Cursor::Move);
    engine.pointer_move(110.0, 20.0, 20.0).expect("move");
    engine.pointer_move(115.0, 20.0, 30.0).expect("move");
    let outcome = engine.pointer_up(115.0, 20.0, 40.0).expect("up");
    assert!(outcome.refresh);
    assert_eq!(engine.drag_state(), DragState::Idle);

    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::DragStart, Some(dragged)),
            (EventKind::DragEnter, Some(zone)),
            (EventKind::DragOver, Some(zone)),
            (EventKind::DragOver, Some(zone)),
            (EventKind::Drop, Some(zone)),
            (EventKind::DragEnd, Some(dragged)),
        ]
    );
    assert_eq!(
        engine.get_property(dragged, "position"),
        Some(PropValue::Array(vec![100.0, 5.0]))
    );
    assert_eq!(engine.storage().drag_ghost(), None);
}

#[test]
fn leaving_a_drop_zone_emits_drag_leave_and_no_drop() {
    let mut engine = engine();
    let dragged = engine
        .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0).draggable(true))
        .expect("add");
    let zone = engine
        .add_shape(Shape::rect(100.0, 0.0, 50.0, 50.0))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(&mut engine, &log, DRAG_KINDS);

    engine.pointer_down(15.0, 15.0, 0.0).expect("down");
    engine.pointer_move(110.0, 20.0, 10.0).expect("move");
    engine.pointer_move(250.0, 150.0, 20.0).expect("move");
    engine.pointer_up(250.0, 150.0, 30.0).expect("up");

    let kinds: Vec<EventKind> = log.borrow().iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::DragStart,
            EventKind::DragEnter,
            EventKind::DragOver,
            EventKind::DragLeave,
            EventKind::DragEnd,
        ]
    );
    assert!(log.borrow().contains(&(EventKind::DragLeave, Some(zone))));
    assert_eq!(
        engine.get_property(dragged, "position"),
        Some(PropValue::Array(vec![235.0, 135.0]))
    );
}

#[test]
fn press_and_release_without_motion_clicks_the_target() {
    let mut engine = engine();
    let button = engine
        .add_shape(Shape::circle(50.0, 50.0, 10.0).clickable(true))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(
        &mut engine,
        &log,
        &[EventKind::MouseDown, EventKind::MouseUp, EventKind::Click],
    );

    engine.pointer_down(52.0, 50.0, 0.0).expect("down");
    engine.pointer_up(52.0, 50.0, 5.0).expect("up");
    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::MouseDown, Some(button)),
            (EventKind::MouseUp, Some(button)),
            (EventKind::Click, Some(button)),
        ]
    );
}

#[test]
fn hover_tracks_the_pointer_and_leave_clears_it() {
    let mut engine = engine();
    let target = engine
        .add_shape(Shape::rect(0.0, 0.0, 40.0, 40.0))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(
        &mut engine,
        &log,
        &[EventKind::MouseOver, EventKind::MouseOut, EventKind::GlobalOut],
    );

    let outcome = engine.pointer_move(20.0, 20.0, 0.0).expect("move");
    assert!(outcome.refresh_hover);
    assert_eq!(engine.hovered(), Some(target));
    assert!(engine.storage().is_hovered(target));

    engine.pointer_leave(10.0).expect("leave");
    assert_eq!(engine.hovered(), None);
    assert!(!engine.storage().has_hover());
    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::MouseOver, Some(target)),
            (EventKind::MouseOut, Some(target)),
            (EventKind::GlobalOut, None),
        ]
    );
}

#[test]
fn dragging_empty_space_pans_pannable_layers() {
    let mut engine = engine();
    engine
        .configure_layer(
            0,
            LayerConfig {
                pannable: true,
                ..LayerConfig::default()
            },
        )
        .expect("configure");
    let id = engine
        .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0))
        .expect("add");
    engine.render().expect("render");

    engine.pointer_down(200.0, 150.0, 0.0).expect("down");
    let outcome = engine.pointer_move(230.0, 150.0, 10.0).expect("move");
    engine.pointer_up(230.0, 150.0, 20.0).expect("up");
    assert!(outcome.refresh);
    assert_eq!(engine.layer_view(0).offset, Vec2::new(30.0, 0.0));
    assert!(engine.is_layer_dirty(0));

    assert_eq!(engine.hit_test(45.0, 15.0).expect("hit"), Some(id));
    assert_eq!(engine.hit_test(15.0, 15.0).expect("hit"), None);
}

#[test]
fn wheel_zoom_keeps_the_anchor_point_fixed() {
    let mut engine = engine();
    engine
        .configure_layer(
            0,
            LayerConfig {
                zoomable: true,
                ..LayerConfig::default()
            },
        )
        .expect("configure");
    let id = engine
        .add_shape(Shape::rect(100.0, 100.0, 10.0, 10.0))
        .expect("add");

    engine.wheel(100.0, 100.0, 1.0, 0.0).expect("wheel");
    engine.wheel(100.0, 100.0, 1.0, 1.0).expect("wheel");
    let view = engine.layer_view(0);
    assert_abs_diff_eq!(view.zoom, 1.21, epsilon = 1e-12);
    let anchor = view.matrix().apply(Vec2::new(100.0, 100.0));
    assert_abs_diff_eq!(anchor.x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(anchor.y, 100.0, epsilon = 1e-9);

    // 10 scene units now span 12.1 pixels.
    assert_eq!(engine.hit_test(111.5, 105.0).expect("hit"), Some(id));
    engine.wheel(100.0, 100.0, -1.0, 2.0).expect("wheel");
    assert_abs_diff_eq!(engine.layer_view(0).zoom, 1.1, epsilon = 1e-12);
}

#[test]
fn shape_handlers_bubble_to_groups_before_scene_listeners() {
    let mut engine = engine();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let group = engine
        .add_group(Group::new().on(EventKind::Click, {
            let order = Rc::clone(&order);
            Rc::new(move |_: &mut SceneEvent, _: &mut Storage| order.borrow_mut().push("group"))
        }))
        .expect("group");
    let child = Shape::rect(0.0, 0.0, 30.0, 30.0).on(EventKind::Click, {
        let order = Rc::clone(&order);
        Rc::new(move |_: &mut SceneEvent, _: &mut Storage| order.borrow_mut().push("shape"))
    });
    engine.add_child(group, child).expect("child");
    engine
        .on(EventKind::Click, {
            let order = Rc::clone(&order);
            Rc::new(move |_: &mut SceneEvent, _: &mut Storage| order.borrow_mut().push("scene"))
        })
        .expect("listen");

    engine.pointer_down(5.0, 5.0, 0.0).expect("down");
    engine.pointer_up(5.0, 5.0, 1.0).expect("up");
    assert_eq!(*order.borrow(), vec!["shape", "group", "scene"]);
}

#[test]
fn touch_taps_produce_a_double_click() {
    let mut engine = engine();
    let target = engine
        .add_shape(Shape::circle(40.0, 40.0, 15.0))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(&mut engine, &log, &[EventKind::Click, EventKind::DblClick]);

    engine.touch_start(40.0, 40.0, 0.0).expect("start");
    engine.touch_end(20.0).expect("end");
    engine.touch_start(41.0, 40.0, 120.0).expect("start");
    engine.touch_end(140.0).expect("end");
    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::Click, Some(target)),
            (EventKind::Click, Some(target)),
            (EventKind::DblClick, Some(target)),
        ]
    );
}

#[test]
fn group_clips_reject_hits_outside_their_geometry() {
    let mut engine = engine();
    let window = Shape::rect(0.0, 0.0, 20.0, 20.0).kind;
    let group = engine
        .add_group(
            Group::new()
                .with_position(10.0, 10.0)
                .with_clip(ClipPath::new(window)),
        )
        .expect("group");
    let content = engine
        .add_child(group, Shape::rect(0.0, 0.0, 50.0, 50.0))
        .expect("child");
    engine.render().expect("render");

    assert_eq!(engine.hit_test(20.0, 20.0).expect("hit"), Some(content));
    assert_eq!(engine.hit_test(40.0, 40.0).expect("hit"), None);
    assert_eq!(engine.hit_test(5.0, 5.0).expect("hit"), None);

    engine.pointer_move(40.0, 40.0, 0.0).expect("move");
    assert_eq!(engine.hovered(), None);
    engine.pointer_move(25.0, 15.0, 10.0).expect("move");
    assert_eq!(engine.hovered(), Some(content));
}

const DRAG_AND_CLICK: &[EventKind] = &[EventKind::DragStart, EventKind::DragEnd, EventKind::Click];

#[test]
fn short_jitter_on_a_draggable_shape_still_clicks() {
    let mut engine = engine();
    let handle = engine
        .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0).draggable(true).clickable(true))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(&mut engine, &log, DRAG_AND_CLICK);

    engine.pointer_down(15.0, 15.0, 0.0).expect("down");
    engine.pointer_move(16.0, 15.0, 5.0).expect("move");
    engine.pointer_up(16.0, 15.0, 10.0).expect("up");
    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::DragStart, Some(handle)),
            (EventKind::DragEnd, Some(handle)),
            (EventKind::Click, Some(handle)),
        ]
    );
    assert_eq!(
        engine.get_property(handle, "position"),
        Some(PropValue::Array(vec![1.0, 0.0]))
    );
}

#[test]
fn long_drags_suppress_the_click() {
    let mut engine = engine();
    let handle = engine
        .add_shape(Shape::rect(10.0, 10.0, 20.0, 20.0).draggable(true).clickable(true))
        .expect("add");
    let log: Log = Rc::default();
    listen_all(&mut engine, &log, DRAG_AND_CLICK);

    engine.pointer_down(15.0, 15.0, 0.0).expect("down");
    for step in 1..=8 {
        let x = 15.0 + f64::from(step) * 10.0;
        engine.pointer_move(x, 15.0, f64::from(step) * 10.0).expect("move");
    }
    engine.pointer_up(95.0, 15.0, 100.0).expect("up");
    assert_eq!(
        *log.borrow(),
        vec![
            (EventKind::DragStart, Some(handle)),
            (EventKind::DragEnd, Some(handle)),
        ]
    );
}
