use tracing::debug;

use crate::animation::{Animator, AnimatorHandle, Clip, ClipId, Easing};
use crate::error::{SceneError, SceneResult};
use crate::render::SurfaceBackend;
use crate::shape::ElementId;

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Starts describing a keyframe animation of `target`. `path` prefixes
    /// the keys passed to [`Animator::when`]: `""` animates top-level
    /// properties such as `position`, `"style"` animates style and geometry.
    pub fn animate(&self, target: ElementId, path: &str, looped: bool) -> SceneResult<Animator> {
        self.ensure_live()?;
        if !self.storage.contains(target) {
            return Err(SceneError::MissingTarget(target));
        }
        Ok(Animator::new(target, path, looped))
    }

    /// Schedules an animator with an easing resolved by name (`"linear"`,
    /// `"cubicOut"`, `"spline"` and so on).
    pub fn start_animation(&mut self, animator: Animator, easing: &str) -> SceneResult<AnimatorHandle> {
        self.ensure_live()?;
        let target = animator.target();
        let clip = animator.build_named(&self.storage, easing)?;
        let handle = AnimatorHandle {
            clip: self.scheduler.add(clip),
            target,
        };
        self.needs_refresh = true;
        Ok(handle)
    }

    /// Schedules an animator with an explicit easing, e.g. a custom curve.
    pub fn start_animation_with(
        &mut self,
        animator: Animator,
        easing: impl Into<Easing>,
    ) -> SceneResult<AnimatorHandle> {
        self.ensure_live()?;
        let handle = animator.start(&self.storage, &mut self.scheduler, easing)?;
        self.needs_refresh = true;
        Ok(handle)
    }

    /// Stops an animation immediately, without its completion callbacks.
    /// The animated properties keep their current values.
    pub fn stop_animation(&mut self, handle: AnimatorHandle) -> bool {
        let stopped = self.scheduler.stop(handle.clip);
        if stopped {
            debug!(clip = %handle.clip, target = %handle.target, "animation stopped");
        }
        stopped
    }

    /// Stops every animation of one element.
    pub fn stop_animations_of(&mut self, target: ElementId) -> usize {
        self.scheduler.stop_target(target)
    }

    /// Schedules a raw clip.
    pub fn add_clip(&mut self, clip: Clip) -> SceneResult<ClipId> {
        self.ensure_live()?;
        Ok(self.scheduler.add(clip))
    }

    #[must_use]
    pub fn is_animating(&self, handle: AnimatorHandle) -> bool {
        self.scheduler.contains(handle.clip)
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pause_animations(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume_animations(&mut self) {
        self.scheduler.resume();
    }
}
