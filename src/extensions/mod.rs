//! Host-side hooks that live outside the scene graph.

mod overlay;

pub use overlay::{ExternalOverlay, OverlayContext, OverlayRegistry};
