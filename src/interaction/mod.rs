//! Pointer/keyboard input: hit testing, drag-and-drop and event delivery.

mod event;
mod handler;
mod listeners;

pub use event::{EventCallback, EventHandlers, EventKind, SceneEvent};
pub use handler::{
    Cursor, DOUBLE_TAP_WINDOW_MS, DispatchContext, DragState, Handler, HandlerConfig,
    HandlerOutcome,
};
pub use listeners::ListenerRegistry;
