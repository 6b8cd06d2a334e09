use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::scene::Storage;
use crate::shape::{ElementId, PropValue};

use super::interpolate::{catmull_rom_value, is_interpolable, lerp_value};
use super::{Clip, ClipId, DoneCallback, Easing, Scheduler};

/// Called after every frame's values were applied.
pub type DuringCallback = Box<dyn FnMut(&mut Storage, ElementId, f64)>;

/// Handle of a started animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimatorHandle {
    pub clip: ClipId,
    pub target: ElementId,
}

#[derive(Debug, Clone, PartialEq)]
struct Keyframe {
    time_ms: f64,
    value: PropValue,
}

/// Keyframes of one property, with the last resolved segment cached.
#[derive(Debug, Clone)]
struct Track {
    path: String,
    keyframes: Vec<Keyframe>,
    percents: Vec<f64>,
    interpolable: bool,
    last_frame: usize,
    last_percent: f64,
}

impl Track {
    fn new(path: String, keyframes: Vec<Keyframe>, duration_ms: f64) -> Self {
        let percents = keyframes
            .iter()
            .map(|frame| {
                if duration_ms > 0.0 {
                    frame.time_ms / duration_ms
                } else {
                    1.0
                }
            })
            .collect();
        let interpolable = keyframes
            .windows(2)
            .all(|pair| is_interpolable(&pair[0].value, &pair[1].value));
        Self {
            path,
            keyframes,
            percents,
            interpolable,
            last_frame: 0,
            last_percent: 0.0,
        }
    }

    /// Index of the segment `[frame, frame + 1]` holding `percent`, scanning
    /// from the previously resolved segment.
    fn locate(&mut self, percent: f64) -> usize {
        let len = self.percents.len();
        let last_segment = len.saturating_sub(2);
        let frame = if percent < self.last_percent {
            let mut frame = (self.last_frame + 1).min(len - 1);
            while frame > 0 && self.percents[frame] > percent {
                frame -= 1;
            }
            frame.min(last_segment)
        } else {
            let mut frame = self.last_frame;
            while frame < len && self.percents[frame] <= percent {
                frame += 1;
            }
            frame.saturating_sub(1).min(last_segment)
        };
        self.last_frame = frame;
        self.last_percent = percent;
        frame
    }

    fn value_at(&mut self, percent: f64, spline: bool) -> PropValue {
        let len = self.keyframes.len();
        if len == 1 {
            return self.keyframes[0].value.clone();
        }
        // Tracks ending before the clip hold their final value.
        let end = self.percents[len - 1];
        if end < 1.0 && percent >= end {
            return self.keyframes[len - 1].value.clone();
        }
        let frame = self.locate(percent);
        let range = self.percents[frame + 1] - self.percents[frame];
        let weight = if range > 0.0 {
            (percent - self.percents[frame]) / range
        } else {
            1.0
        };
        let current = &self.keyframes[frame].value;
        let next = &self.keyframes[frame + 1].value;
        if !self.interpolable {
            return if weight < 1.0 { current.clone() } else { next.clone() };
        }
        let blended = if spline {
            let before = &self.keyframes[frame.saturating_sub(1)].value;
            let after = &self.keyframes[(frame + 2).min(len - 1)].value;
            catmull_rom_value([before, current, next, after], weight)
        } else {
            lerp_value(current, next, weight)
        };
        blended.unwrap_or_else(|| if weight < 1.0 { current.clone() } else { next.clone() })
    }
}

/// Keyframe tween builder for one element.
///
/// Keys passed to [`Animator::when`] are relative to the animator's path:
/// with path `style`, key `x` animates `style.x`.
pub struct Animator {
    target: ElementId,
    path: String,
    looped: bool,
    delay_ms: f64,
    spline: bool,
    keyframes: Vec<(f64, Vec<(String, PropValue)>)>,
    during: Vec<DuringCallback>,
    done: Vec<DoneCallback>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("target", &self.target)
            .field("path", &self.path)
            .field("looped", &self.looped)
            .field("delay_ms", &self.delay_ms)
            .field("keyframes", &self.keyframes)
            .finish_non_exhaustive()
    }
}

impl Animator {
    #[must_use]
    pub fn new(target: ElementId, path: impl Into<String>, looped: bool) -> Self {
        Self {
            target,
            path: path.into(),
            looped,
            delay_ms: 0.0,
            spline: false,
            keyframes: Vec::new(),
            during: Vec::new(),
            done: Vec::new(),
        }
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Adds a keyframe at `time_ms` after the start.
    #[must_use]
    pub fn when<K, V>(mut self, time_ms: f64, props: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PropValue>,
    {
        self.keyframes.push((
            time_ms,
            props
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        ));
        self
    }

    #[must_use]
    pub fn during(mut self, callback: impl FnMut(&mut Storage, ElementId, f64) + 'static) -> Self {
        self.during.push(Box::new(callback));
        self
    }

    #[must_use]
    pub fn done(mut self, callback: impl FnOnce(&mut Storage, &mut Scheduler) + 'static) -> Self {
        self.done.push(Box::new(callback));
        self
    }

    #[must_use]
    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Catmull-Rom interpolation between keyframes instead of linear.
    #[must_use]
    pub fn spline(mut self, spline: bool) -> Self {
        self.spline = spline;
        self
    }

    fn full_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// Resolves an easing name (`spline` also switches interpolation) and
    /// builds the clip.
    pub fn build_named(self, storage: &Storage, easing: &str) -> SceneResult<Clip> {
        let spline = self.spline || easing.eq_ignore_ascii_case("spline");
        let resolved = Easing::from_name(easing)?;
        self.spline(spline).build(storage, resolved)
    }

    /// Builds the clip. Tracks without a keyframe at time zero start from the
    /// element's current value.
    pub fn build(self, storage: &Storage, easing: impl Into<Easing>) -> SceneResult<Clip> {
        let element = storage
            .get(self.target)
            .ok_or(SceneError::MissingTarget(self.target))?;
        if self.keyframes.is_empty() {
            return Err(SceneError::InvalidData(
                "animator needs at least one keyframe".to_owned(),
            ));
        }
        if self
            .keyframes
            .iter()
            .any(|(time, _)| !time.is_finite() || *time < 0.0)
        {
            return Err(SceneError::InvalidData(
                "keyframe times must be finite and >= 0".to_owned(),
            ));
        }

        let mut ordered: Vec<&(f64, Vec<(String, PropValue)>)> = self.keyframes.iter().collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
        let duration_ms = ordered.last().map_or(0.0, |(time, _)| *time);

        let mut per_path: IndexMap<String, Vec<Keyframe>> = IndexMap::new();
        for (time_ms, props) in ordered {
            for (key, value) in props {
                per_path
                    .entry(self.full_path(key))
                    .or_default()
                    .push(Keyframe {
                        time_ms: *time_ms,
                        value: value.clone(),
                    });
            }
        }
        let mut tracks = Vec::with_capacity(per_path.len());
        for (path, mut keyframes) in per_path {
            if keyframes.first().is_some_and(|frame| frame.time_ms > 0.0) {
                let current = element.get_property(&path).ok_or_else(|| {
                    SceneError::InvalidData(format!("unknown animated property `{path}`"))
                })?;
                keyframes.insert(
                    0,
                    Keyframe {
                        time_ms: 0.0,
                        value: current,
                    },
                );
            }
            tracks.push(Track::new(path, keyframes, duration_ms));
        }

        let target = self.target;
        let spline = self.spline;
        let mut during = self.during;
        let mut clip = Clip::new(
            duration_ms,
            Box::new(move |storage: &mut Storage, schedule: f64| {
                for track in &mut tracks {
                    let value = track.value_at(schedule, spline);
                    storage.update_element(target, |element| {
                        element.set_property(&track.path, &value)
                    })??;
                }
                for callback in &mut during {
                    callback(storage, target, schedule);
                }
                Ok(())
            }),
        )?
        .with_target(target)
        .with_delay(self.delay_ms)?
        .looped(self.looped)
        .with_easing(easing.into());
        for callback in self.done {
            clip = clip.on_done(callback);
        }
        Ok(clip)
    }

    /// Builds the clip and schedules it.
    pub fn start(
        self,
        storage: &Storage,
        scheduler: &mut Scheduler,
        easing: impl Into<Easing>,
    ) -> SceneResult<AnimatorHandle> {
        let target = self.target;
        let clip = self.build(storage, easing)?;
        Ok(AnimatorHandle {
            clip: scheduler.add(clip),
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::animation::EasingKind;
    use crate::shape::Shape;

    fn number(storage: &Storage, id: ElementId, path: &str) -> f64 {
        match storage.get(id).and_then(|element| element.get_property(path)) {
            Some(PropValue::Number(value)) => value,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn tween_starts_from_current_value() {
        let mut storage = Storage::new();
        let id = storage.add_root(Shape::circle(10.0, 0.0, 5.0)).expect("add");
        let mut scheduler = Scheduler::default();
        Animator::new(id, "style", false)
            .when(100.0, [("x", 30.0)])
            .start(&storage, &mut scheduler, EasingKind::Linear)
            .expect("start");
        scheduler.step(0.0, &mut storage);
        assert_abs_diff_eq!(number(&storage, id, "style.x"), 10.0);
        scheduler.step(50.0, &mut storage);
        assert_abs_diff_eq!(number(&storage, id, "style.x"), 20.0);
        scheduler.step(100.0, &mut storage);
        assert_abs_diff_eq!(number(&storage, id, "style.x"), 30.0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn segment_scan_handles_backwards_progress() {
        let keyframes = [0.0, 10.0, 20.0, 40.0]
            .iter()
            .enumerate()
            .map(|(index, value)| Keyframe {
                time_ms: index as f64 * 10.0,
                value: PropValue::Number(*value),
            })
            .collect();
        let mut track = Track::new("style.x".to_owned(), keyframes, 30.0);
        let at = |track: &mut Track, percent| match track.value_at(percent, false) {
            PropValue::Number(value) => value,
            other => panic!("unexpected {other:?}"),
        };
        assert_abs_diff_eq!(at(&mut track, 0.9), 34.0, epsilon = 1e-9);
        assert_abs_diff_eq!(at(&mut track, 0.2), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(at(&mut track, 1.0), 40.0, epsilon = 1e-9);
        // Overshooting easings extrapolate from the edge segments.
        assert_abs_diff_eq!(at(&mut track, -0.1), -3.0, epsilon = 1e-9);
    }

    #[test]
    fn unknown_property_is_rejected_at_build() {
        let mut storage = Storage::new();
        let id = storage.add_root(Shape::circle(0.0, 0.0, 5.0)).expect("add");
        let result = Animator::new(id, "style", false)
            .when(100.0, [("nope", 1.0)])
            .build(&storage, EasingKind::Linear);
        assert!(result.is_err());
    }

    #[test]
    fn missing_target_is_reported() {
        let mut storage = Storage::new();
        let id = storage.add_root(Shape::circle(0.0, 0.0, 5.0)).expect("add");
        storage.remove(id).expect("remove");
        assert!(matches!(
            Animator::new(id, "", false)
                .when(10.0, [("rotation", 1.0)])
                .build(&storage, EasingKind::Linear),
            Err(SceneError::MissingTarget(_))
        ));
    }
}
