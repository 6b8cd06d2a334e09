use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::scene::Storage;
use crate::shape::ElementId;

/// Semantic events produced by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    MouseWheel,
    /// Pointer left the viewport.
    GlobalOut,
    DragStart,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
    KeyDown,
    KeyUp,
}

impl EventKind {
    pub const ALL: [EventKind; 17] = [
        Self::Click,
        Self::DblClick,
        Self::MouseDown,
        Self::MouseUp,
        Self::MouseMove,
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseWheel,
        Self::GlobalOut,
        Self::DragStart,
        Self::DragEnter,
        Self::DragOver,
        Self::DragLeave,
        Self::Drop,
        Self::DragEnd,
        Self::KeyDown,
        Self::KeyUp,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseWheel => "mousewheel",
            Self::GlobalOut => "globalout",
            Self::DragStart => "dragstart",
            Self::DragEnter => "dragenter",
            Self::DragOver => "dragover",
            Self::DragLeave => "dragleave",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event packet handed to handlers. Setting `cancel_bubble` stops delivery
/// to parents and scene-level listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEvent {
    pub kind: EventKind,
    pub x: f64,
    pub y: f64,
    pub target: Option<ElementId>,
    /// Element being dragged, for drag-over and drop events.
    pub dragged: Option<ElementId>,
    pub wheel_delta: f64,
    pub key: Option<String>,
    pub time_ms: f64,
    pub cancel_bubble: bool,
}

impl SceneEvent {
    #[must_use]
    pub fn new(kind: EventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            target: None,
            dragged: None,
            wheel_delta: 0.0,
            key: None,
            time_ms: 0.0,
            cancel_bubble: false,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<ElementId>) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_time(mut self, time_ms: f64) -> Self {
        self.time_ms = time_ms;
        self
    }

    pub fn stop_propagation(&mut self) {
        self.cancel_bubble = true;
    }
}

/// Handlers may mutate the scene through the storage they receive.
pub type EventCallback = Rc<dyn Fn(&mut SceneEvent, &mut Storage)>;

/// Per-element handler table.
#[derive(Clone, Default)]
pub struct EventHandlers {
    entries: SmallVec<[(EventKind, EventCallback); 2]>,
}

impl EventHandlers {
    pub fn on(&mut self, kind: EventKind, callback: EventCallback) {
        self.entries.push((kind, callback));
    }

    /// Removes one handler by identity. Returns `true` when removed.
    pub fn off(&mut self, kind: EventKind, callback: &EventCallback) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(entry_kind, entry)| !(*entry_kind == kind && Rc::ptr_eq(entry, callback)));
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|(entry_kind, _)| *entry_kind == kind)
    }

    /// Clones the callbacks registered for `kind` so they can run while the
    /// owning element is mutably reachable.
    #[must_use]
    pub fn callbacks_for(&self, kind: EventKind) -> SmallVec<[EventCallback; 2]> {
        self.entries
            .iter()
            .filter(|(entry_kind, _)| *entry_kind == kind)
            .map(|(_, callback)| Rc::clone(callback))
            .collect()
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(kind, _)| kind.name()))
            .finish()
    }
}
