use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use scenic_rs::animation::{Clip, Easing, EasingKind, Scheduler};
use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::{Vec2, Viewport};
use scenic_rs::render::NullBackend;
use scenic_rs::scene::Storage;
use scenic_rs::shape::{ElementId, PropValue, Shape};

fn engine() -> SceneEngine<NullBackend> {
    SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(120, 120)))
        .expect("engine init")
}

fn number(engine: &SceneEngine<NullBackend>, id: ElementId, path: &str) -> f64 {
    match engine.get_property(id, path) {
        Some(PropValue::Number(value)) => value,
        other => panic!("expected number at {path}, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn monotonic_curves_never_decrease(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for kind in [EasingKind::Linear, EasingKind::QuadraticIn, EasingKind::QuadraticOut] {
            prop_assert!(kind.apply(lo) <= kind.apply(hi) + 1e-12, "{kind:?} at {lo} vs {hi}");
        }
    }

    #[test]
    fn easing_clamps_progress_outside_the_unit_interval(progress in -10.0f64..10.0) {
        let easing = Easing::from(EasingKind::QuadraticOut);
        let value = easing.apply(progress);
        prop_assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn every_named_curve_fixes_its_endpoints() {
    for kind in EasingKind::ALL {
        assert_abs_diff_eq!(kind.apply(0.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(kind.apply(1.0), 1.0, epsilon = 1e-9);
        assert_eq!(EasingKind::from_name(kind.name()), Some(kind));
    }
    assert!(Easing::from_name("wobbly").is_err());
}

#[test]
fn done_fires_exactly_once_however_many_frames_follow() {
    let mut scheduler = Scheduler::default();
    let mut storage = Storage::new();
    let done = Rc::new(Cell::new(0));
    let sink = Rc::clone(&done);
    let clip = Clip::new(50.0, Box::new(|_, _| Ok(())))
        .expect("clip")
        .on_done(Box::new(move |_: &mut Storage, _: &mut Scheduler| {
            sink.set(sink.get() + 1);
        }));
    scheduler.add(clip);
    for frame in 0..20 {
        scheduler.step(f64::from(frame) * 16.0, &mut storage);
    }
    assert_eq!(done.get(), 1);
    assert!(scheduler.is_empty());
}

#[test]
fn done_callbacks_can_chain_the_next_clip() {
    let mut scheduler = Scheduler::default();
    let mut storage = Storage::new();
    let frames = Rc::new(RefCell::new(Vec::new()));
    let second_frames = Rc::clone(&frames);
    let first = Clip::new(10.0, Box::new(|_, _| Ok(())))
        .expect("clip")
        .on_done(Box::new(move |_: &mut Storage, scheduler: &mut Scheduler| {
            let sink = Rc::clone(&second_frames);
            let next = Clip::new(
                10.0,
                Box::new(move |_, schedule| {
                    sink.borrow_mut().push(schedule);
                    Ok(())
                }),
            )
            .expect("clip");
            scheduler.add(next);
        }));
    scheduler.add(first);

    let report = scheduler.step(0.0, &mut storage);
    assert_eq!(report.completed, 0);
    let report = scheduler.step(10.0, &mut storage);
    assert_eq!(report.completed, 1);
    assert_eq!(scheduler.len(), 1);
    assert!(frames.borrow().is_empty());
    scheduler.step(20.0, &mut storage);
    scheduler.step(30.0, &mut storage);
    assert_eq!(*frames.borrow(), vec![0.0, 1.0]);
    assert!(scheduler.is_empty());
}

#[test]
fn looped_animation_never_completes_until_stopped() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(0.0, 0.0, 5.0)).expect("add");
    let done = Rc::new(Cell::new(false));
    let sink = Rc::clone(&done);
    let animator = engine
        .animate(id, "style", true)
        .expect("animate")
        .when(100.0, [("r", 15.0)])
        .done(move |_, _| sink.set(true));
    let handle = engine.start_animation(animator, "linear").expect("start");
    for frame in 0..=40 {
        engine.tick(f64::from(frame) * 25.0).expect("tick");
    }
    assert!(engine.is_animating(handle));
    assert!(!done.get());
    assert!(engine.stop_animation(handle));
    assert!(!done.get());
    assert_eq!(engine.clip_count(), 0);
}

#[test]
fn multi_keyframe_position_tween_passes_through_each_frame() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::rect(0.0, 0.0, 4.0, 4.0)).expect("add");
    let animator = engine
        .animate(id, "", false)
        .expect("animate")
        .when(100.0, [("position", Vec2::new(100.0, 0.0))])
        .when(200.0, [("position", Vec2::new(100.0, 50.0))]);
    engine.start_animation(animator, "linear").expect("start");

    engine.tick(0.0).expect("tick");
    engine.tick(50.0).expect("tick");
    assert_eq!(
        engine.get_property(id, "position"),
        Some(PropValue::Array(vec![50.0, 0.0]))
    );
    engine.tick(150.0).expect("tick");
    assert_eq!(
        engine.get_property(id, "position"),
        Some(PropValue::Array(vec![100.0, 25.0]))
    );
    engine.tick(200.0).expect("tick");
    assert_eq!(
        engine.get_property(id, "position"),
        Some(PropValue::Array(vec![100.0, 50.0]))
    );
    assert_eq!(engine.clip_count(), 0);
}

#[test]
fn paused_engine_holds_animated_values() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(10.0, 0.0, 2.0)).expect("add");
    let animator = engine
        .animate(id, "style", false)
        .expect("animate")
        .when(100.0, [("x", 110.0)]);
    engine
        .start_animation_with(animator, EasingKind::Linear)
        .expect("start");
    engine.tick(0.0).expect("tick");
    engine.tick(40.0).expect("tick");
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 50.0, epsilon = 1e-9);

    engine.pause_animations();
    let frame = engine.tick(80.0).expect("tick");
    assert_eq!(frame.animation.stepped, 0);
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 50.0, epsilon = 1e-9);
    engine.resume_animations();
    engine.tick(100.0).expect("tick");
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 110.0, epsilon = 1e-9);
}

#[test]
fn animation_frames_mark_the_engine_for_refresh() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(10.0, 10.0, 2.0)).expect("add");
    engine.tick(0.0).expect("tick");
    assert!(!engine.needs_refresh());
    let animator = engine
        .animate(id, "style", false)
        .expect("animate")
        .when(30.0, [("r", 6.0)]);
    engine.start_animation(animator, "cubicOut").expect("start");
    let frame = engine.tick(16.0).expect("tick");
    assert!(frame.animation.changed());
    assert_eq!(
        frame.refresh.map(|report| report.repainted_tiers),
        Some(vec![0])
    );
    assert!(!engine.needs_refresh());
}

#[test]
fn properties_ending_early_hold_their_last_keyframe() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(0.0, 0.0, 2.0)).expect("add");
    let animator = engine
        .animate(id, "style", false)
        .expect("animate")
        .when(50.0, [("x", 50.0)])
        .when(100.0, [("y", 100.0)]);
    engine
        .start_animation_with(animator, EasingKind::Linear)
        .expect("start");

    engine.tick(0.0).expect("tick");
    engine.tick(25.0).expect("tick");
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(number(&engine, id, "style.y"), 25.0, epsilon = 1e-9);
    engine.tick(75.0).expect("tick");
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(number(&engine, id, "style.y"), 75.0, epsilon = 1e-9);
    engine.tick(100.0).expect("tick");
    assert_abs_diff_eq!(number(&engine, id, "style.x"), 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(number(&engine, id, "style.y"), 100.0, epsilon = 1e-9);
    assert_eq!(engine.clip_count(), 0);
}
