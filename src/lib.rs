//! scenic-rs: retained-mode 2D scene engine.
//!
//! Shapes and groups live in a scene graph, are painted onto one raster
//! layer per z-tier, hit-tested for pointer interaction and animated by a
//! frame-clocked scheduler. Hosts drive everything through
//! [`SceneEngine`].

pub mod animation;
pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod shape;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{EngineConfig, EngineSnapshot, FrameReport, SceneEngine};
pub use error::{SceneError, SceneResult};
