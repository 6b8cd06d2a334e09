use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::scene::Storage;
use crate::shape::ElementId;

use super::{Easing, Scheduler};

static NEXT_CLIP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a scheduled clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(u64);

impl ClipId {
    fn next() -> Self {
        Self(NEXT_CLIP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

/// Called every frame with the eased schedule in `[0, 1]` (overshooting
/// curves may leave that range).
pub type FrameCallback = Box<dyn FnMut(&mut Storage, f64) -> SceneResult<()>>;

/// Runs once after a clip completed and was removed from the scheduler.
pub type DoneCallback = Box<dyn FnOnce(&mut Storage, &mut Scheduler)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipState {
    /// Waiting for its first step or for its delay to elapse.
    Scheduled,
    Running,
    Completed,
    Cancelled,
}

/// Result of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Pending,
    Running,
    Restarted,
    Completed,
}

/// One time-driven effect: progress through an easing into a frame callback.
pub struct Clip {
    id: ClipId,
    target: Option<ElementId>,
    duration_ms: f64,
    delay_ms: f64,
    gap_ms: f64,
    looped: bool,
    easing: Easing,
    start_ms: Option<f64>,
    state: ClipState,
    on_frame: FrameCallback,
    on_done: Vec<DoneCallback>,
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("looped", &self.looped)
            .field("easing", &self.easing)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Clip {
    pub fn new(duration_ms: f64, on_frame: FrameCallback) -> SceneResult<Self> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(SceneError::InvalidData(
                "clip duration must be finite and >= 0".to_owned(),
            ));
        }
        Ok(Self {
            id: ClipId::next(),
            target: None,
            duration_ms,
            delay_ms: 0.0,
            gap_ms: 0.0,
            looped: false,
            easing: Easing::default(),
            start_ms: None,
            state: ClipState::Scheduled,
            on_frame,
            on_done: Vec::new(),
        })
    }

    /// Ties the clip to an element; the scheduler cancels it once the element
    /// leaves the scene.
    #[must_use]
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> SceneResult<Self> {
        if !delay_ms.is_finite() || delay_ms < 0.0 {
            return Err(SceneError::InvalidData(
                "clip delay must be finite and >= 0".to_owned(),
            ));
        }
        self.delay_ms = delay_ms;
        Ok(self)
    }

    /// Pause between loop iterations.
    #[must_use]
    pub fn with_gap(mut self, gap_ms: f64) -> Self {
        self.gap_ms = if gap_ms.is_finite() { gap_ms.max(0.0) } else { 0.0 };
        self
    }

    #[must_use]
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn on_done(mut self, callback: DoneCallback) -> Self {
        self.on_done.push(callback);
        self
    }

    #[must_use]
    pub fn id(&self) -> ClipId {
        self.id
    }

    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    #[must_use]
    pub fn state(&self) -> ClipState {
        self.state
    }

    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[must_use]
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub(crate) fn cancel(&mut self) {
        self.state = ClipState::Cancelled;
    }

    pub(crate) fn take_done(&mut self) -> Vec<DoneCallback> {
        std::mem::take(&mut self.on_done)
    }

    /// Advances to `now_ms`. The first call anchors the start time (plus
    /// delay). A looping clip restarts keeping its overshoot so iterations do
    /// not drift.
    pub fn step(&mut self, now_ms: f64, storage: &mut Storage) -> SceneResult<StepOutcome> {
        if matches!(self.state, ClipState::Completed | ClipState::Cancelled) {
            return Ok(StepOutcome::Completed);
        }
        let start = *self.start_ms.get_or_insert(now_ms + self.delay_ms);
        if now_ms < start {
            return Ok(StepOutcome::Pending);
        }
        self.state = ClipState::Running;
        let elapsed = now_ms - start;
        let progress = if self.duration_ms > 0.0 {
            (elapsed / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let schedule = self.easing.apply(progress);
        (self.on_frame)(storage, schedule)?;

        if progress < 1.0 {
            return Ok(StepOutcome::Running);
        }
        if self.looped {
            let remainder = if self.duration_ms > 0.0 {
                elapsed % self.duration_ms
            } else {
                0.0
            };
            self.start_ms = Some(now_ms - remainder + self.gap_ms);
            return Ok(StepOutcome::Restarted);
        }
        self.state = ClipState::Completed;
        Ok(StepOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_abs_diff_eq;

    use super::*;

    fn recording_clip(duration_ms: f64) -> (Clip, Rc<RefCell<Vec<f64>>>) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        let clip = Clip::new(
            duration_ms,
            Box::new(move |_, schedule| {
                sink.borrow_mut().push(schedule);
                Ok(())
            }),
        )
        .expect("clip");
        (clip, frames)
    }

    #[test]
    fn delay_holds_the_first_frame() {
        let (clip, frames) = recording_clip(100.0);
        let mut clip = clip.with_delay(50.0).expect("delay");
        let mut storage = Storage::new();
        assert_eq!(clip.step(0.0, &mut storage).expect("step"), StepOutcome::Pending);
        assert_eq!(clip.step(40.0, &mut storage).expect("step"), StepOutcome::Pending);
        assert_eq!(clip.step(100.0, &mut storage).expect("step"), StepOutcome::Running);
        assert_eq!(clip.step(150.0, &mut storage).expect("step"), StepOutcome::Completed);
        assert_eq!(*frames.borrow(), vec![0.5, 1.0]);
        assert_eq!(clip.state(), ClipState::Completed);
    }

    #[test]
    fn loop_keeps_overshoot() {
        let (clip, frames) = recording_clip(100.0);
        let mut clip = clip.looped(true);
        let mut storage = Storage::new();
        clip.step(0.0, &mut storage).expect("step");
        assert_eq!(clip.step(130.0, &mut storage).expect("step"), StepOutcome::Restarted);
        clip.step(160.0, &mut storage).expect("step");
        assert_abs_diff_eq!(*frames.borrow().last().expect("frame"), 0.6, epsilon = 1e-9);
    }

    #[test]
    fn rejects_negative_duration() {
        assert!(Clip::new(-1.0, Box::new(|_, _| Ok(()))).is_err());
    }
}
