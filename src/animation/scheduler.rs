use tracing::{debug, warn};

use crate::error::SceneError;
use crate::scene::Storage;

use super::{Clip, ClipId, ClipState, DoneCallback, StepOutcome};

/// Counts from one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub stepped: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl TickReport {
    /// Whether any clip produced a frame, i.e. the scene may have changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.stepped > 0
    }
}

/// Frame-clocked list of clips, stepped in registration order.
#[derive(Debug, Default)]
pub struct Scheduler {
    clips: Vec<Clip>,
    paused: bool,
}

impl Scheduler {
    pub fn add(&mut self, clip: Clip) -> ClipId {
        let id = clip.id();
        debug!(clip = %id, target = ?clip.target(), "clip scheduled");
        self.clips.push(clip);
        id
    }

    /// Removes a clip without running its completion callbacks.
    pub fn stop(&mut self, id: ClipId) -> bool {
        let Some(position) = self.clips.iter().position(|clip| clip.id() == id) else {
            return false;
        };
        let mut clip = self.clips.remove(position);
        clip.cancel();
        debug!(clip = %id, "clip stopped");
        true
    }

    /// Stops every clip targeting `target`. Returns how many were removed.
    pub fn stop_target(&mut self, target: crate::shape::ElementId) -> usize {
        let before = self.clips.len();
        self.clips.retain(|clip| clip.target() != Some(target));
        before - self.clips.len()
    }

    /// Drops every clip without completion callbacks.
    pub fn clear(&mut self) {
        self.clips.clear();
    }

    #[must_use]
    pub fn contains(&self, id: ClipId) -> bool {
        self.clips.iter().any(|clip| clip.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Steps every clip once, then runs completion callbacks of the clips
    /// that finished. Clips started from those callbacks are first stepped
    /// on the next tick.
    ///
    /// A clip whose target left the scene is cancelled silently; a clip whose
    /// frame callback fails is logged and dropped.
    pub fn step(&mut self, now_ms: f64, storage: &mut Storage) -> TickReport {
        let mut report = TickReport::default();
        if self.paused {
            return report;
        }
        let mut deferred: Vec<DoneCallback> = Vec::new();
        let mut index = 0;
        while index < self.clips.len() {
            let clip = &mut self.clips[index];
            if let Some(target) = clip.target() {
                if !storage.contains(target) {
                    debug!(clip = %clip.id(), %target, "clip target gone; cancelling");
                    clip.cancel();
                    self.clips.remove(index);
                    report.cancelled += 1;
                    continue;
                }
            }
            match clip.step(now_ms, storage) {
                Ok(StepOutcome::Pending) => index += 1,
                Ok(StepOutcome::Running | StepOutcome::Restarted) => {
                    report.stepped += 1;
                    index += 1;
                }
                Ok(StepOutcome::Completed) => {
                    report.stepped += 1;
                    report.completed += 1;
                    let mut finished = self.clips.remove(index);
                    debug!(clip = %finished.id(), "clip completed");
                    deferred.extend(finished.take_done());
                }
                Err(SceneError::MissingTarget(target)) => {
                    debug!(clip = %clip.id(), %target, "clip target gone; cancelling");
                    clip.cancel();
                    self.clips.remove(index);
                    report.cancelled += 1;
                }
                Err(err) => {
                    warn!(clip = %clip.id(), error = %err, "dropping clip that failed to step");
                    clip.cancel();
                    self.clips.remove(index);
                    report.failed += 1;
                }
            }
        }
        for callback in deferred {
            callback(storage, self);
        }
        report
    }

    /// States of the scheduled clips, for diagnostics.
    #[must_use]
    pub fn states(&self) -> Vec<(ClipId, ClipState)> {
        self.clips.iter().map(|clip| (clip.id(), clip.state())).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::shape::Shape;

    fn counting_clip(duration_ms: f64, frames: &Rc<Cell<u32>>) -> Clip {
        let frames = Rc::clone(frames);
        Clip::new(
            duration_ms,
            Box::new(move |_, _| {
                frames.set(frames.get() + 1);
                Ok(())
            }),
        )
        .expect("clip")
    }

    #[test]
    fn done_callback_fires_once_after_removal() {
        let mut scheduler = Scheduler::default();
        let mut storage = Storage::new();
        let frames = Rc::new(Cell::new(0));
        let done = Rc::new(Cell::new(0));
        let done_sink = Rc::clone(&done);
        let chained_frames = Rc::clone(&frames);
        let clip = counting_clip(100.0, &frames).on_done(Box::new(move |_, scheduler| {
            assert!(scheduler.is_empty());
            done_sink.set(done_sink.get() + 1);
            scheduler.add(counting_clip(100.0, &chained_frames));
        }));
        scheduler.add(clip);
        scheduler.step(0.0, &mut storage);
        let report = scheduler.step(100.0, &mut storage);
        assert_eq!(report.completed, 1);
        assert_eq!(done.get(), 1);
        // The chained clip exists but was not stepped in the same tick.
        assert_eq!(frames.get(), 2);
        assert_eq!(scheduler.len(), 1);
        scheduler.step(200.0, &mut storage);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn stop_skips_done_callbacks() {
        let mut scheduler = Scheduler::default();
        let mut storage = Storage::new();
        let done = Rc::new(Cell::new(false));
        let sink = Rc::clone(&done);
        let id = scheduler.add(
            Clip::new(10.0, Box::new(|_, _| Ok(())))
                .expect("clip")
                .on_done(Box::new(move |_, _| sink.set(true))),
        );
        assert!(scheduler.stop(id));
        assert!(!scheduler.stop(id));
        scheduler.step(100.0, &mut storage);
        assert!(!done.get());
    }

    #[test]
    fn removed_target_cancels_silently() {
        let mut scheduler = Scheduler::default();
        let mut storage = Storage::new();
        let id = storage.add_root(Shape::circle(0.0, 0.0, 1.0)).expect("add");
        let frames = Rc::new(Cell::new(0));
        scheduler.add(counting_clip(100.0, &frames).with_target(id));
        scheduler.step(0.0, &mut storage);
        storage.remove(id).expect("remove");
        let report = scheduler.step(50.0, &mut storage);
        assert_eq!(report.cancelled, 1);
        assert_eq!(frames.get(), 1);
        assert!(scheduler.is_empty());
    }
}
