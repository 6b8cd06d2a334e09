//! Scene graph storage and paint-list derivation.

mod storage;

pub use storage::{ClipRef, PaintEntry, Storage};
