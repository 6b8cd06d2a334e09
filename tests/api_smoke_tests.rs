use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::Viewport;
use scenic_rs::interaction::Cursor;
use scenic_rs::render::{Color, NullBackend};
use scenic_rs::shape::{Group, PaintStyle, PropValue, Shape, ShapePatch};

#[test]
fn engine_smoke_flow() {
    let config = EngineConfig::new(Viewport::new(800, 600)).with_background(Color::WHITE);
    let mut engine = SceneEngine::new(NullBackend::new(), config).expect("engine init");

    let group = engine
        .add_group(Group::new().with_position(100.0, 100.0))
        .expect("group");
    let dot = engine
        .add_child(
            group,
            Shape::circle(0.0, 0.0, 20.0)
                .with_style(PaintStyle::filled(Color::rgb(0.2, 0.4, 0.8)))
                .clickable(true),
        )
        .expect("child");
    let label = engine
        .add_shape(Shape::text(10.0, 10.0, "scene", 14.0).with_z(1, 0.0))
        .expect("text");
    assert_eq!(engine.element_count(), 3);

    engine.render().expect("render should succeed");
    assert_eq!(engine.layer_tiers(), vec![0, 1]);

    assert_eq!(engine.hit_test(110.0, 105.0).expect("hit"), Some(dot));
    engine.pointer_move(110.0, 105.0, 0.0).expect("move");
    assert_eq!(engine.cursor(), Cursor::Pointer);

    engine
        .modify_shape(group, &ShapePatch::new().position(300.0, 100.0))
        .expect("move group");
    assert_eq!(engine.hit_test(110.0, 105.0).expect("hit"), None);
    assert_eq!(engine.hit_test(305.0, 100.0).expect("hit"), Some(dot));

    engine
        .set_property(label, "style.text", PropValue::Text("renamed".to_owned()))
        .expect("set text");
    assert_eq!(
        engine.get_property(label, "style.text"),
        Some(PropValue::Text("renamed".to_owned()))
    );

    let frame = engine.tick(16.0).expect("tick");
    assert!(frame.presented());
    engine.remove_group(group).expect("remove group");
    assert!(!engine.contains(dot));
    assert_eq!(engine.element_count(), 1);

    engine.resize(400, 300).expect("resize");
    assert_eq!((engine.get_width(), engine.get_height()), (400, 300));
    engine.dispose();
    assert!(engine.is_disposed());
}
