//! Frame-clocked animation: clips, easing, keyframe tweens.

mod animator;
mod clip;
mod easing;
pub mod interpolate;
mod scheduler;

pub use animator::{Animator, AnimatorHandle, DuringCallback};
pub use clip::{Clip, ClipId, ClipState, DoneCallback, FrameCallback, StepOutcome};
pub use easing::{Easing, EasingKind};
pub use scheduler::{Scheduler, TickReport};
