use serde::{Deserialize, Serialize};

use crate::core::{MIN_STROKE_HIT_WIDTH, Viewport};
use crate::error::{SceneError, SceneResult};
use crate::interaction::HandlerConfig;
use crate::render::{Color, PainterOptions};

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load scene
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub viewport: Viewport,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    #[serde(default)]
    pub background: Option<Color>,
    /// Return paint failures from `render`/`refresh` instead of skipping
    /// the failing primitive.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub drag_dwell_ms: f64,
    #[serde(default = "default_click_threshold")]
    pub click_threshold: u32,
    #[serde(default = "default_min_stroke_width")]
    pub min_stroke_width: f64,
    #[serde(default = "default_wheel_zoom_step")]
    pub wheel_zoom_step: f64,
    #[serde(default = "default_hover_enabled")]
    pub hover_enabled: bool,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_click_threshold() -> u32 {
    HandlerConfig::default().click_threshold
}

fn default_min_stroke_width() -> f64 {
    MIN_STROKE_HIT_WIDTH
}

fn default_wheel_zoom_step() -> f64 {
    HandlerConfig::default().wheel_zoom_step
}

fn default_hover_enabled() -> bool {
    true
}

impl EngineConfig {
    /// Creates a config with defaults for everything but the viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pixel_ratio: default_pixel_ratio(),
            background: None,
            strict: false,
            drag_dwell_ms: 0.0,
            click_threshold: default_click_threshold(),
            min_stroke_width: default_min_stroke_width(),
            wheel_zoom_step: default_wheel_zoom_step(),
            hover_enabled: default_hover_enabled(),
        }
    }

    /// Sets the device pixel ratio used to size layer surfaces.
    #[must_use]
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets how long a draggable shape must be held before moving drags it.
    #[must_use]
    pub fn with_drag_dwell_ms(mut self, drag_dwell_ms: f64) -> Self {
        self.drag_dwell_ms = drag_dwell_ms;
        self
    }

    #[must_use]
    pub fn with_click_threshold(mut self, click_threshold: u32) -> Self {
        self.click_threshold = click_threshold;
        self
    }

    #[must_use]
    pub fn with_min_stroke_width(mut self, min_stroke_width: f64) -> Self {
        self.min_stroke_width = min_stroke_width;
        self
    }

    #[must_use]
    pub fn with_wheel_zoom_step(mut self, wheel_zoom_step: f64) -> Self {
        self.wheel_zoom_step = wheel_zoom_step;
        self
    }

    #[must_use]
    pub fn with_hover_enabled(mut self, hover_enabled: bool) -> Self {
        self.hover_enabled = hover_enabled;
        self
    }

    /// Checks every field; the first invalid one is reported.
    pub fn validate(&self) -> SceneResult<()> {
        if !self.viewport.is_valid() {
            return Err(SceneError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(SceneError::InvalidData(
                "pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        if let Some(background) = self.background {
            background.validate()?;
        }
        self.handler_config().validate()
    }

    #[must_use]
    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            drag_dwell_ms: self.drag_dwell_ms,
            click_threshold: self.click_threshold,
            min_stroke_width: self.min_stroke_width,
            wheel_zoom_step: self.wheel_zoom_step,
            hover_enabled: self.hover_enabled,
        }
    }

    #[must_use]
    pub fn painter_options(&self) -> PainterOptions {
        PainterOptions {
            pixel_ratio: self.pixel_ratio,
            background: self.background,
            strict: self.strict,
        }
    }

    /// Parses a JSON document, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| SceneError::InvalidData(format!("invalid engine config json: {err}")))
    }

    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SceneError::InvalidData(format!("failed to serialize engine config: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_take_defaults() {
        let config = EngineConfig::from_json(r#"{"viewport":{"width":320,"height":200}}"#)
            .expect("config");
        assert_eq!(config, EngineConfig::new(Viewport::new(320, 200)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_values() {
        let base = EngineConfig::new(Viewport::new(10, 10));
        assert!(matches!(
            EngineConfig::new(Viewport::new(0, 10)).validate(),
            Err(SceneError::InvalidViewport { .. })
        ));
        assert!(base.with_pixel_ratio(f64::NAN).validate().is_err());
        assert!(base.with_min_stroke_width(0.0).validate().is_err());
        assert!(base.with_wheel_zoom_step(0.5).validate().is_err());
        assert!(base.with_drag_dwell_ms(-1.0).validate().is_err());
    }
}
