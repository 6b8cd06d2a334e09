use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use scenic_rs::SceneResult;
use scenic_rs::api::EngineConfig;
use scenic_rs::core::{Vec2, Viewport};
use scenic_rs::interaction::{EventKind, SceneEvent};
use scenic_rs::platform_gtk::GtkSceneAdapter;
use scenic_rs::render::{Color, LayerConfig, LoadingOptions};
use scenic_rs::scene::Storage;
use scenic_rs::shape::{PaintPatch, PaintStyle, Shape};

fn main() {
    let _ = scenic_rs::telemetry::init_default_tracing();
    let app = gtk::Application::builder()
        .application_id("rs.scenic.demos.gtk_scene_lab")
        .build();
    app.connect_activate(build_ui);
    app.run();
}

fn build_ui(app: &gtk::Application) {
    let adapter = match build_adapter() {
        Ok(adapter) => adapter,
        Err(err) => {
            eprintln!("failed to initialize scene lab: {err}");
            return;
        }
    };
    let engine = adapter.engine();

    let status = gtk::Label::new(Some("drag the squares onto the target"));
    status.set_xalign(0.0);
    {
        let status = status.clone();
        let result = engine.borrow_mut().on(
            EventKind::Drop,
            Rc::new(move |event: &mut SceneEvent, _: &mut Storage| {
                status.set_text(&format!("dropped {:?} on {:?}", event.dragged, event.target));
            }),
        );
        if let Err(err) = result {
            eprintln!("failed to subscribe to drops: {err}");
        }
    }

    let controls = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    let reset_button = gtk::Button::with_label("Reset View");
    controls.append(&reset_button);
    let loading_toggle = gtk::ToggleButton::with_label("Loading");
    controls.append(&loading_toggle);
    let export_button = gtk::Button::with_label("Export PNG");
    controls.append(&export_button);

    reset_button.connect_clicked({
        let engine = Rc::clone(&engine);
        move |_| {
            if let Err(err) = engine.borrow_mut().reset_layer_view(0) {
                eprintln!("reset failed: {err}");
            }
        }
    });
    loading_toggle.connect_toggled({
        let engine = Rc::clone(&engine);
        move |toggle| {
            let mut engine = engine.borrow_mut();
            let result = if toggle.is_active() {
                engine.show_loading(LoadingOptions::default()).map(|_| ())
            } else {
                engine.hide_loading().map(|_| ())
            };
            if let Err(err) = result {
                eprintln!("loading toggle failed: {err}");
            }
        }
    });
    export_button.connect_clicked({
        let engine = Rc::clone(&engine);
        let status = status.clone();
        move |_| {
            let path = std::env::temp_dir().join("scenic-lab.png");
            let written = engine
                .borrow_mut()
                .to_image_named("png", Some(Color::WHITE))
                .and_then(|bytes| {
                    std::fs::write(&path, bytes).map_err(|err| {
                        scenic_rs::SceneError::Encode(format!("failed to write export: {err}"))
                    })
                });
            match written {
                Ok(()) => status.set_text(&format!("exported to {}", path.display())),
                Err(err) => status.set_text(&format!("export failed: {err}")),
            }
        }
    });

    let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.append(&controls);
    let area = adapter.widget().clone();
    area.set_vexpand(true);
    area.set_hexpand(true);
    root.append(&area);
    root.append(&status);

    let window = gtk::ApplicationWindow::builder()
        .application(app)
        .title("scenic-rs scene lab")
        .default_width(900)
        .default_height(600)
        .child(&root)
        .build();
    window.present();
}

fn build_adapter() -> SceneResult<GtkSceneAdapter> {
    let config = EngineConfig::new(Viewport::new(900, 540)).with_background(Color::WHITE);
    let adapter = GtkSceneAdapter::new(config)?;
    {
        let engine = adapter.engine();
        let mut engine = engine.borrow_mut();
        engine.configure_layer(
            0,
            LayerConfig {
                zoomable: true,
                pannable: true,
                ..LayerConfig::default()
            },
        )?;

        engine.add_shape(
            Shape::rect(600.0, 180.0, 200.0, 200.0)
                .with_style(PaintStyle::stroked(Color::rgb(0.2, 0.2, 0.2), 2.0))
                .with_z(0, 0.0),
        )?;
        let palette = [
            Color::rgb(0.85, 0.25, 0.25),
            Color::rgb(0.25, 0.6, 0.3),
            Color::rgb(0.2, 0.4, 0.85),
        ];
        for (index, color) in palette.into_iter().enumerate() {
            let offset = index as f64 * 110.0;
            engine.add_shape(
                Shape::rect(80.0 + offset, 220.0, 80.0, 80.0)
                    .with_style(PaintStyle::filled(color))
                    .with_highlight(PaintPatch::new().stroke(Color::BLACK).line_width(3.0))
                    .with_z(0, 1.0)
                    .draggable(true),
            )?;
        }

        let spinner = engine.add_shape(
            Shape::sector(120.0, 90.0, 20.0, 40.0, 0.0, 1.5)
                .with_style(PaintStyle::filled(Color::rgb(0.95, 0.65, 0.1)))
                .with_rotation(0.0, Vec2::new(120.0, 90.0))
                .with_z(1, 0.0),
        )?;
        let animator = engine
            .animate(spinner, "", true)?
            .when(0.0, [("rotation", 0.0)])
            .when(2_000.0, [("rotation", std::f64::consts::TAU)]);
        engine.start_animation(animator, "linear")?;
    }
    Ok(adapter)
}
