use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::render::Color;

use super::PropValue;

/// Lift applied to fill/stroke colours when a hovered shape declares no
/// explicit highlight style.
pub const DEFAULT_HIGHLIGHT_LIFT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Paint attributes shared by every shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintStyle {
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub stroke: Option<Color>,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default)]
    pub line_dash: Vec<f64>,
    #[serde(default)]
    pub line_cap: LineCap,
    #[serde(default)]
    pub line_join: LineJoin,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_line_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: default_line_width(),
            line_dash: Vec::new(),
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            opacity: default_opacity(),
        }
    }
}

impl PaintStyle {
    #[must_use]
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn stroked(color: Color, line_width: f64) -> Self {
        Self {
            stroke: Some(color),
            line_width,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, color: Color, line_width: f64) -> Self {
        self.stroke = Some(color);
        self.line_width = line_width;
        self
    }

    /// Whether stroke geometry is drawn (and hit-testable).
    #[must_use]
    pub fn has_stroke(&self) -> bool {
        self.stroke.is_some() && self.line_width > 0.0
    }

    pub fn validate(&self) -> SceneResult<()> {
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        if !self.line_width.is_finite() || self.line_width < 0.0 {
            return Err(SceneError::InvalidData(
                "line width must be finite and >= 0".to_owned(),
            ));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(SceneError::InvalidData(
                "opacity must be finite and in [0, 1]".to_owned(),
            ));
        }
        if self
            .line_dash
            .iter()
            .any(|segment| !segment.is_finite() || *segment < 0.0)
        {
            return Err(SceneError::InvalidData(
                "line dash segments must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Field-by-field override with every `Some` in `patch`.
    pub fn apply(&mut self, patch: &PaintPatch) {
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(line_width) = patch.line_width {
            self.line_width = line_width;
        }
        if let Some(line_dash) = &patch.line_dash {
            self.line_dash.clone_from(line_dash);
        }
        if let Some(line_cap) = patch.line_cap {
            self.line_cap = line_cap;
        }
        if let Some(line_join) = patch.line_join {
            self.line_join = line_join;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
    }

    /// Style used while the shape is in the hover set.
    #[must_use]
    pub fn highlighted(&self, highlight: Option<&PaintPatch>) -> Self {
        let mut style = self.clone();
        match highlight {
            Some(patch) => style.apply(patch),
            None => {
                style.fill = style.fill.map(|color| color.lift(DEFAULT_HIGHLIGHT_LIFT));
                style.stroke = style.stroke.map(|color| color.lift(DEFAULT_HIGHLIGHT_LIFT));
            }
        }
        style
    }

    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<PropValue> {
        match key {
            "fill" => self.fill.map(PropValue::Color),
            "stroke" => self.stroke.map(PropValue::Color),
            "line_width" => Some(PropValue::Number(self.line_width)),
            "line_dash" => Some(PropValue::Array(self.line_dash.clone())),
            "opacity" => Some(PropValue::Number(self.opacity)),
            _ => None,
        }
    }

    /// Sets a paint field by key; returns `Ok(false)` for keys that are not
    /// paint attributes.
    pub fn set_property(&mut self, key: &str, value: &PropValue) -> SceneResult<bool> {
        match key {
            "fill" => self.fill = Some(value.as_color(key)?),
            "stroke" => self.stroke = Some(value.as_color(key)?),
            "line_width" => self.line_width = value.as_number(key)?,
            "opacity" => self.opacity = value.as_number(key)?,
            "line_dash" => match value {
                PropValue::Array(values) => self.line_dash.clone_from(values),
                other => {
                    return Err(SceneError::InvalidData(format!(
                        "property `line_dash` expects array, got {}",
                        other.kind_name()
                    )));
                }
            },
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Partial paint style; `Some` fields override, `None` fields keep the base.
///
/// `fill` and `stroke` are doubly optional so a patch can remove a paint
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaintPatch {
    #[serde(default)]
    pub fill: Option<Option<Color>>,
    #[serde(default)]
    pub stroke: Option<Option<Color>>,
    #[serde(default)]
    pub line_width: Option<f64>,
    #[serde(default)]
    pub line_dash: Option<Vec<f64>>,
    #[serde(default)]
    pub line_cap: Option<LineCap>,
    #[serde(default)]
    pub line_join: Option<LineJoin>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl PaintPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(Some(color));
        self
    }

    #[must_use]
    pub fn stroke(mut self, color: Color) -> Self {
        self.stroke = Some(Some(color));
        self
    }

    #[must_use]
    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Combines two patches, `other` winning where both are set.
    pub fn merge(&mut self, other: &PaintPatch) {
        if other.fill.is_some() {
            self.fill = other.fill;
        }
        if other.stroke.is_some() {
            self.stroke = other.stroke;
        }
        if other.line_width.is_some() {
            self.line_width = other.line_width;
        }
        if other.line_dash.is_some() {
            self.line_dash.clone_from(&other.line_dash);
        }
        if other.line_cap.is_some() {
            self.line_cap = other.line_cap;
        }
        if other.line_join.is_some() {
            self.line_join = other.line_join;
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_overrides_only_set_fields() {
        let mut style = PaintStyle::filled(Color::BLACK).with_stroke(Color::WHITE, 2.0);
        style.apply(&PaintPatch::new().line_width(4.0));
        assert_eq!(style.fill, Some(Color::BLACK));
        assert_eq!(style.line_width, 4.0);

        style.apply(&PaintPatch {
            stroke: Some(None),
            ..PaintPatch::default()
        });
        assert!(!style.has_stroke());
    }

    #[test]
    fn default_highlight_lifts_colours() {
        let style = PaintStyle::filled(Color::rgb(0.0, 0.0, 0.5));
        let highlighted = style.highlighted(None);
        let fill = highlighted.fill.expect("fill");
        assert!(fill.blue > 0.5 && fill.red > 0.0);

        let explicit = style.highlighted(Some(&PaintPatch::new().fill(Color::WHITE)));
        assert_eq!(explicit.fill, Some(Color::WHITE));
    }

    #[test]
    fn validation_rejects_negative_width() {
        let style = PaintStyle {
            line_width: -1.0,
            ..PaintStyle::default()
        };
        assert!(style.validate().is_err());
    }
}
