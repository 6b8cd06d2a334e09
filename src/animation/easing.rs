use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Named easing curves. Every curve maps 0 to 0 and 1 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EasingKind {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl EasingKind {
    pub const ALL: [EasingKind; 31] = [
        Self::Linear,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuarticIn,
        Self::QuarticOut,
        Self::QuarticInOut,
        Self::QuinticIn,
        Self::QuinticOut,
        Self::QuinticInOut,
        Self::SinusoidalIn,
        Self::SinusoidalOut,
        Self::SinusoidalInOut,
        Self::ExponentialIn,
        Self::ExponentialOut,
        Self::ExponentialInOut,
        Self::CircularIn,
        Self::CircularOut,
        Self::CircularInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadraticIn => "quadraticIn",
            Self::QuadraticOut => "quadraticOut",
            Self::QuadraticInOut => "quadraticInOut",
            Self::CubicIn => "cubicIn",
            Self::CubicOut => "cubicOut",
            Self::CubicInOut => "cubicInOut",
            Self::QuarticIn => "quarticIn",
            Self::QuarticOut => "quarticOut",
            Self::QuarticInOut => "quarticInOut",
            Self::QuinticIn => "quinticIn",
            Self::QuinticOut => "quinticOut",
            Self::QuinticInOut => "quinticInOut",
            Self::SinusoidalIn => "sinusoidalIn",
            Self::SinusoidalOut => "sinusoidalOut",
            Self::SinusoidalInOut => "sinusoidalInOut",
            Self::ExponentialIn => "exponentialIn",
            Self::ExponentialOut => "exponentialOut",
            Self::ExponentialInOut => "exponentialInOut",
            Self::CircularIn => "circularIn",
            Self::CircularOut => "circularOut",
            Self::CircularInOut => "circularInOut",
            Self::ElasticIn => "elasticIn",
            Self::ElasticOut => "elasticOut",
            Self::ElasticInOut => "elasticInOut",
            Self::BackIn => "backIn",
            Self::BackOut => "backOut",
            Self::BackInOut => "backInOut",
            Self::BounceIn => "bounceIn",
            Self::BounceOut => "bounceOut",
            Self::BounceInOut => "bounceInOut",
        }
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn apply(self, k: f64) -> f64 {
        match self {
            Self::Linear => k,
            Self::QuadraticIn => k * k,
            Self::QuadraticOut => k * (2.0 - k),
            Self::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Self::CubicIn => k * k * k,
            Self::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Self::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
            Self::QuarticIn => k.powi(4),
            Self::QuarticOut => 1.0 - (k - 1.0).powi(4),
            Self::QuarticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(4)
                } else {
                    -0.5 * ((k - 2.0).powi(4) - 2.0)
                }
            }
            Self::QuinticIn => k.powi(5),
            Self::QuinticOut => (k - 1.0).powi(5) + 1.0,
            Self::QuinticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(5)
                } else {
                    0.5 * ((k - 2.0).powi(5) + 2.0)
                }
            }
            Self::SinusoidalIn => 1.0 - (k * FRAC_PI_2).cos(),
            Self::SinusoidalOut => (k * FRAC_PI_2).sin(),
            Self::SinusoidalInOut => 0.5 * (1.0 - (PI * k).cos()),
            Self::ExponentialIn => {
                if k == 0.0 {
                    0.0
                } else {
                    1024f64.powf(k - 1.0)
                }
            }
            Self::ExponentialOut => {
                if k == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * k)
                }
            }
            Self::ExponentialInOut => {
                if k == 0.0 {
                    return 0.0;
                }
                if k == 1.0 {
                    return 1.0;
                }
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * 1024f64.powf(k - 1.0)
                } else {
                    0.5 * (2.0 - 2f64.powf(-10.0 * (k - 1.0)))
                }
            }
            Self::CircularIn => 1.0 - (1.0 - k * k).max(0.0).sqrt(),
            Self::CircularOut => {
                let k = k - 1.0;
                (1.0 - k * k).max(0.0).sqrt()
            }
            Self::CircularInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    -0.5 * ((1.0 - k * k).max(0.0).sqrt() - 1.0)
                } else {
                    let k = k - 2.0;
                    0.5 * ((1.0 - k * k).max(0.0).sqrt() + 1.0)
                }
            }
            Self::ElasticIn => elastic(k, |k, s, p| {
                let k = k - 1.0;
                -(2f64.powf(10.0 * k) * ((k - s) * TAU / p).sin())
            }),
            Self::ElasticOut => elastic(k, |k, s, p| {
                2f64.powf(-10.0 * k) * ((k - s) * TAU / p).sin() + 1.0
            }),
            Self::ElasticInOut => elastic(k, |k, s, p| {
                let k = k * 2.0 - 1.0;
                if k < 0.0 {
                    -0.5 * (2f64.powf(10.0 * k) * ((k - s) * TAU / p).sin())
                } else {
                    2f64.powf(-10.0 * k) * ((k - s) * TAU / p).sin() * 0.5 + 1.0
                }
            }),
            Self::BackIn => {
                let s = BACK_OVERSHOOT;
                k * k * ((s + 1.0) * k - s)
            }
            Self::BackOut => {
                let s = BACK_OVERSHOOT;
                let k = k - 1.0;
                k * k * ((s + 1.0) * k + s) + 1.0
            }
            Self::BackInOut => {
                let s = BACK_OVERSHOOT * 1.525;
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * (k * k * ((s + 1.0) * k - s))
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * ((s + 1.0) * k + s) + 2.0)
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - k),
            Self::BounceOut => bounce_out(k),
            Self::BounceInOut => {
                if k < 0.5 {
                    (1.0 - bounce_out(1.0 - k * 2.0)) * 0.5
                } else {
                    bounce_out(k * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

const BACK_OVERSHOOT: f64 = 1.701_58;
const ELASTIC_PERIOD: f64 = 0.4;

fn elastic(k: f64, curve: impl Fn(f64, f64, f64) -> f64) -> f64 {
    if k == 0.0 {
        return 0.0;
    }
    if k == 1.0 {
        return 1.0;
    }
    let p = ELASTIC_PERIOD;
    curve(k, p / 4.0, p)
}

fn bounce_out(k: f64) -> f64 {
    const N: f64 = 7.5625;
    if k < 1.0 / 2.75 {
        N * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        N * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        N * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        N * k * k + 0.984_375
    }
}

/// Easing used by a clip: a named curve or a host function.
#[derive(Clone)]
pub enum Easing {
    Named(EasingKind),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Default for Easing {
    fn default() -> Self {
        Self::Named(EasingKind::Linear)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(kind) => f.debug_tuple("Named").field(kind).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<EasingKind> for Easing {
    fn from(kind: EasingKind) -> Self {
        Self::Named(kind)
    }
}

impl Easing {
    pub fn custom(curve: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(curve))
    }

    /// Resolves a name. `spline` selects linear timing; keyframe spline
    /// interpolation is chosen by the animator.
    pub fn from_name(name: &str) -> SceneResult<Self> {
        if name.eq_ignore_ascii_case("spline") {
            return Ok(Self::Named(EasingKind::Linear));
        }
        EasingKind::from_name(name)
            .map(Self::Named)
            .ok_or_else(|| SceneError::InvalidData(format!("unknown easing `{name}`")))
    }

    /// Maps progress in `[0, 1]` to the eased schedule. Non-finite custom
    /// results fall back to the raw progress.
    #[must_use]
    pub fn apply(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        match self {
            Self::Named(kind) => kind.apply(progress),
            Self::Custom(curve) => {
                let value = curve(progress);
                if value.is_finite() { value } else { progress }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn every_curve_hits_its_endpoints() {
        for kind in EasingKind::ALL {
            assert_abs_diff_eq!(kind.apply(0.0), 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(kind.apply(1.0), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(EasingKind::from_name("CubicOut"), Some(EasingKind::CubicOut));
        assert!(matches!(
            Easing::from_name("spline"),
            Ok(Easing::Named(EasingKind::Linear))
        ));
        assert!(Easing::from_name("wobble").is_err());
    }

    #[test]
    fn in_out_curves_are_symmetric() {
        for kind in [
            EasingKind::QuadraticInOut,
            EasingKind::CubicInOut,
            EasingKind::SinusoidalInOut,
            EasingKind::CircularInOut,
        ] {
            assert_abs_diff_eq!(kind.apply(0.5), 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(kind.apply(0.25) + kind.apply(0.75), 1.0, epsilon = 1e-9);
        }
    }
}
