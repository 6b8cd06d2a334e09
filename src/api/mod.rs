//! Public engine facade: scene mutation, frame control, input, animation,
//! export and diagnostics, each in its own controller file.

mod animation_controller;
mod engine;
mod engine_config;
mod engine_init;
mod engine_snapshot;
mod event_controller;
mod export_controller;
mod interaction_controller;
mod layer_controller;
mod loading_controller;
mod overlay_registry;
mod render_controller;
mod scene_controller;

pub use engine::SceneEngine;
pub use engine_config::EngineConfig;
pub use engine_snapshot::{EngineSnapshot, LayerSnapshot};
pub use render_controller::FrameReport;
