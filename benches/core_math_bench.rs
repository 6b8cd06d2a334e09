use criterion::{Criterion, criterion_group, criterion_main};
use scenic_rs::api::{EngineConfig, SceneEngine};
use scenic_rs::core::contain::point_in_polygon;
use scenic_rs::core::{MIN_STROKE_HIT_WIDTH, Matrix, Smoothing, Vec2, Viewport};
use scenic_rs::render::{Color, NullBackend};
use scenic_rs::scene::Storage;
use scenic_rs::shape::{PaintStyle, Shape};
use std::hint::black_box;

fn star(points: usize, outer: f64, inner: f64) -> Vec<Vec2> {
    (0..points * 2)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::PI / points as f64;
            let radius = if i % 2 == 0 { outer } else { inner };
            Vec2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn bench_polygon_winding_64(c: &mut Criterion) {
    let polygon = star(32, 100.0, 40.0);

    c.bench_function("polygon_winding_64", |b| {
        b.iter(|| point_in_polygon(black_box(&polygon), black_box(12.5), black_box(-7.25)))
    });
}

fn bench_shape_hit_transformed(c: &mut Criterion) {
    let shape = Shape::polygon(star(16, 60.0, 25.0), Smoothing::None)
        .with_style(PaintStyle::filled(Color::BLACK).with_stroke(Color::WHITE, 2.0));
    let world = Matrix::translation(400.0, 300.0)
        .multiply(&Matrix::rotation(0.3))
        .multiply(&Matrix::scaling(1.5, 1.5));

    c.bench_function("shape_hit_transformed", |b| {
        b.iter(|| {
            shape.hit_test(
                black_box(&world),
                MIN_STROKE_HIT_WIDTH,
                black_box(420.0),
                black_box(310.0),
            )
        })
    });
}

fn bench_paint_list_rebuild_10k(c: &mut Criterion) {
    let mut storage = Storage::new();
    for i in 0..10_000 {
        let x = f64::from(i % 100) * 8.0;
        let y = f64::from(i / 100) * 8.0;
        storage
            .add_root(Shape::circle(x, y, 3.0).with_z(i % 4, f64::from(i % 7)))
            .expect("add shape");
    }

    c.bench_function("paint_list_rebuild_10k", |b| {
        b.iter(|| {
            storage.rebuild_paint_list();
            black_box(storage.cached_paint_list().len())
        })
    });
}

fn bench_engine_hit_test_10k(c: &mut Criterion) {
    let config = EngineConfig::new(Viewport::new(1600, 900));
    let mut engine = SceneEngine::new(NullBackend::new(), config).expect("engine init");
    for i in 0..10_000 {
        let x = f64::from(i % 100) * 16.0;
        let y = f64::from(i / 100) * 9.0;
        engine
            .add_shape(Shape::rect(x, y, 12.0, 6.0))
            .expect("add shape");
    }
    engine.render().expect("initial render");

    c.bench_function("engine_hit_test_10k", |b| {
        b.iter(|| {
            engine
                .hit_test(black_box(803.0), black_box(452.0))
                .expect("hit test")
        })
    });
}

criterion_group!(
    benches,
    bench_polygon_winding_64,
    bench_shape_hit_transformed,
    bench_paint_list_rebuild_10k,
    bench_engine_hit_test_10k
);
criterion_main!(benches);
