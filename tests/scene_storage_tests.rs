use proptest::prelude::*;
use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::Viewport;
use scenic_rs::render::{NullBackend, NullSurface};
use scenic_rs::scene::Storage;
use scenic_rs::shape::{ElementId, Group, Shape, ShapePatch};
use scenic_rs::SceneError;

fn engine() -> SceneEngine<NullBackend> {
    SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(200, 150)))
        .expect("engine init")
}

fn generation(surface: &NullSurface) -> u64 {
    surface.generation()
}

proptest! {
    #[test]
    fn paint_list_is_sorted_and_stable(
        keys in prop::collection::vec((-2i32..3, 0u8..4), 1..40)
    ) {
        let mut storage = Storage::new();
        let mut inserted = Vec::new();
        for (tier, order) in &keys {
            let id = storage
                .add_root(Shape::circle(0.0, 0.0, 1.0).with_z(*tier, f64::from(*order)))
                .expect("add");
            inserted.push((*tier, *order, id));
        }
        let mut expected = inserted.clone();
        expected.sort_by_key(|(tier, order, _)| (*tier, *order));
        let expected_ids: Vec<ElementId> = expected.iter().map(|(_, _, id)| *id).collect();

        let first: Vec<ElementId> = storage.paint_list().iter().map(|entry| entry.id).collect();
        prop_assert_eq!(&first, &expected_ids);
        storage.rebuild_paint_list();
        let second: Vec<ElementId> = storage.paint_list().iter().map(|entry| entry.id).collect();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn group_children_follow_depth_first_order_within_a_tier() {
    let mut storage = Storage::new();
    let a = Shape::rect(0.0, 0.0, 1.0, 1.0);
    let b = Shape::rect(0.0, 0.0, 1.0, 1.0);
    let (a_id, b_id) = (a.id(), b.id());
    let before = storage.add_root(Shape::circle(0.0, 0.0, 1.0)).expect("add");
    storage
        .add_root(Group::new().with_child(a).with_child(b))
        .expect("group");
    let after = storage.add_root(Shape::circle(0.0, 0.0, 1.0)).expect("add");
    let order: Vec<ElementId> = storage.paint_list().iter().map(|entry| entry.id).collect();
    assert_eq!(order, vec![before, a_id, b_id, after]);
}

#[test]
fn refresh_repaints_only_the_mutated_layer() {
    let mut engine = engine();
    let moved = engine
        .add_shape(Shape::circle(20.0, 20.0, 5.0).with_z(0, 0.0))
        .expect("add");
    engine
        .add_shape(Shape::circle(60.0, 60.0, 5.0).with_z(1, 0.0))
        .expect("add");
    engine
        .add_shape(Shape::circle(90.0, 90.0, 5.0).with_z(2, 0.0))
        .expect("add");
    engine.refresh().expect("refresh");

    let painter = engine.painter();
    let before: Vec<u64> = [0, 1, 2]
        .iter()
        .map(|tier| generation(painter.layer(*tier).expect("layer").surface()))
        .collect();

    engine
        .modify_shape(moved, &ShapePatch::new().position(4.0, 0.0))
        .expect("modify");
    assert!(engine.is_layer_dirty(0));
    assert!(!engine.is_layer_dirty(1));
    assert!(!engine.is_layer_dirty(2));
    engine.refresh().expect("refresh");

    let painter = engine.painter();
    let after: Vec<u64> = [0, 1, 2]
        .iter()
        .map(|tier| generation(painter.layer(*tier).expect("layer").surface()))
        .collect();
    assert_ne!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
}

#[test]
fn moving_a_shape_between_tiers_dirties_both() {
    let mut engine = engine();
    let id = engine
        .add_shape(Shape::circle(20.0, 20.0, 5.0).with_z(0, 0.0))
        .expect("add");
    engine
        .add_shape(Shape::circle(20.0, 20.0, 5.0).with_z(3, 0.0))
        .expect("add");
    engine.refresh().expect("refresh");
    engine
        .modify_shape(id, &ShapePatch::new().z_tier(3))
        .expect("modify");
    assert!(engine.is_layer_dirty(0));
    assert!(engine.is_layer_dirty(3));
    let report = engine.refresh().expect("refresh");
    assert_eq!(report.repainted_tiers, vec![3, 0]);
    assert_eq!(engine.painter().layer(3).expect("layer").element_count(), 2);
}

#[test]
fn invalid_patch_leaves_shape_untouched() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(20.0, 20.0, 5.0)).expect("add");
    let result = engine.modify_shape(id, &ShapePatch::new().geometry("r", -3.0));
    assert!(result.is_err());
    assert_eq!(
        engine.get_property(id, "style.r"),
        Some(scenic_rs::shape::PropValue::Number(5.0))
    );
}

#[test]
fn disposed_engine_rejects_mutation_and_disposes_twice() {
    let mut engine = engine();
    let id = engine.add_shape(Shape::circle(20.0, 20.0, 5.0)).expect("add");
    engine.render().expect("render");
    engine.dispose();
    engine.dispose();
    assert!(engine.is_disposed());
    assert!(matches!(
        engine.add_shape(Shape::circle(0.0, 0.0, 1.0)),
        Err(SceneError::Disposed)
    ));
    assert!(matches!(
        engine.modify_shape(id, &ShapePatch::new().position(1.0, 1.0)),
        Err(SceneError::Disposed)
    ));
    assert!(matches!(engine.render(), Err(SceneError::Disposed)));
    assert!(matches!(engine.tick(16.0), Err(SceneError::Disposed)));
    assert!(matches!(
        engine.pointer_move(1.0, 1.0, 0.0),
        Err(SceneError::Disposed)
    ));
    assert!(matches!(engine.resize(10, 10), Err(SceneError::Disposed)));
    assert_eq!(engine.clip_count(), 0);
    assert!(engine.painter().layers().is_empty());
}

#[test]
fn disposed_storage_rejects_every_mutator() {
    let mut storage = Storage::new();
    let id = storage.add_root(Shape::circle(0.0, 0.0, 1.0)).expect("add");
    storage.dispose();
    storage.dispose();
    assert!(storage.is_empty());
    assert!(matches!(storage.remove(id), Err(SceneError::Disposed)));
    assert!(matches!(
        storage.mutate(id, &ShapePatch::new().position(1.0, 1.0)),
        Err(SceneError::Disposed)
    ));
    assert!(matches!(storage.clear(), Err(SceneError::Disposed)));
}
