//! GTK4 host adapter: a `DrawingArea` that presents the engine frame,
//! drives [`SceneEngine::tick`] from the widget frame clock and forwards
//! pointer, wheel and keyboard input.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4 as gtk;
use gtk::glib;
use gtk::prelude::*;
use tracing::warn;

use crate::api::{EngineConfig, SceneEngine};
use crate::error::SceneResult;
use crate::render::CairoBackend;

pub type SharedEngine = Rc<RefCell<SceneEngine<CairoBackend>>>;

fn now_ms() -> f64 {
    glib::monotonic_time() as f64 / 1_000.0
}

fn report<T>(what: &str, result: SceneResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "{what} failed");
            None
        }
    }
}

pub struct GtkSceneAdapter {
    engine: SharedEngine,
    area: gtk::DrawingArea,
}

impl GtkSceneAdapter {
    /// Creates the engine and the widget hosting it.
    pub fn new(config: EngineConfig) -> SceneResult<Self> {
        let engine = SceneEngine::new(CairoBackend::new(), config)?;
        Ok(Self::with_engine(Rc::new(RefCell::new(engine))))
    }

    #[must_use]
    pub fn with_engine(engine: SharedEngine) -> Self {
        let area = gtk::DrawingArea::new();
        {
            let engine = engine.borrow();
            area.set_content_width(engine.get_width() as i32);
            area.set_content_height(engine.get_height() as i32);
        }
        area.set_focusable(true);
        let adapter = Self { engine, area };
        adapter.install_draw();
        adapter.install_frame_clock();
        adapter.install_pointer();
        adapter.install_wheel();
        adapter.install_keys();
        adapter
    }

    #[must_use]
    pub fn engine(&self) -> SharedEngine {
        Rc::clone(&self.engine)
    }

    #[must_use]
    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.area
    }

    fn install_draw(&self) {
        let engine = Rc::clone(&self.engine);
        self.area.set_draw_func(move |_, cr, _width, _height| {
            let engine = engine.borrow();
            if engine.is_disposed() {
                return;
            }
            let ratio = engine.config().pixel_ratio;
            if ratio != 1.0 {
                cr.scale(1.0 / ratio, 1.0 / ratio);
            }
            report("frame presentation", engine.frame().paint_onto(cr));
        });

        let engine = Rc::clone(&self.engine);
        self.area.connect_resize(move |area, width, height| {
            if width <= 0 || height <= 0 {
                return;
            }
            let mut engine = engine.borrow_mut();
            if report("resize", engine.resize(width as u32, height as u32)).is_some() {
                area.queue_draw();
            }
        });
    }

    fn install_frame_clock(&self) {
        let engine = Rc::clone(&self.engine);
        self.area.add_tick_callback(move |area, clock| {
            let mut engine = engine.borrow_mut();
            if engine.is_disposed() {
                return glib::ControlFlow::Break;
            }
            let now = clock.frame_time() as f64 / 1_000.0;
            if let Some(frame) = report("frame tick", engine.tick(now)) {
                if frame.presented() {
                    area.queue_draw();
                }
            }
            glib::ControlFlow::Continue
        });
    }

    fn install_pointer(&self) {
        let click = gtk::GestureClick::new();
        click.set_button(gtk::gdk::BUTTON_PRIMARY);
        let engine = Rc::clone(&self.engine);
        let area = self.area.clone();
        click.connect_pressed(move |_, n_press, x, y| {
            area.grab_focus();
            let mut engine = engine.borrow_mut();
            report("pointer down", engine.pointer_down(x, y, now_ms()));
            if n_press == 2 {
                report("double click", engine.double_click(x, y, now_ms()));
            }
        });
        let engine = Rc::clone(&self.engine);
        click.connect_released(move |_, _, x, y| {
            report("pointer up", engine.borrow_mut().pointer_up(x, y, now_ms()));
        });
        self.area.add_controller(click);

        let motion = gtk::EventControllerMotion::new();
        let engine = Rc::clone(&self.engine);
        motion.connect_motion(move |_, x, y| {
            report("pointer move", engine.borrow_mut().pointer_move(x, y, now_ms()));
        });
        let engine = Rc::clone(&self.engine);
        motion.connect_leave(move |_| {
            report("pointer leave", engine.borrow_mut().pointer_leave(now_ms()));
        });
        self.area.add_controller(motion);
    }

    fn install_wheel(&self) {
        let pointer = Rc::new(Cell::new((0.0_f64, 0.0_f64)));
        let motion = gtk::EventControllerMotion::new();
        let tracked = Rc::clone(&pointer);
        motion.connect_motion(move |_, x, y| tracked.set((x, y)));
        self.area.add_controller(motion);

        let scroll = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL);
        let engine = Rc::clone(&self.engine);
        scroll.connect_scroll(move |_, _dx, dy| {
            let (x, y) = pointer.get();
            // GTK reports positive dy when scrolling down, which zooms out.
            report("wheel", engine.borrow_mut().wheel(x, y, -dy, now_ms()));
            glib::Propagation::Stop
        });
        self.area.add_controller(scroll);
    }

    fn install_keys(&self) {
        let keys = gtk::EventControllerKey::new();
        let engine = Rc::clone(&self.engine);
        keys.connect_key_pressed(move |_, key, _code, _modifiers| {
            if let Some(name) = key.name() {
                report("key down", engine.borrow_mut().key_down(&name, now_ms()));
            }
            glib::Propagation::Proceed
        });
        let engine = Rc::clone(&self.engine);
        keys.connect_key_released(move |_, key, _code, _modifiers| {
            if let Some(name) = key.name() {
                report("key up", engine.borrow_mut().key_up(&name, now_ms()));
            }
        });
        self.area.add_controller(keys);
    }
}
