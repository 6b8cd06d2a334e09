use serde::{Deserialize, Serialize};

use crate::core::Vec2;
use crate::error::{SceneError, SceneResult};
use crate::render::Color;

/// Dynamically addressed property value, used by keyed geometry updates and
/// by keyframe animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Number(f64),
    Array(Vec<f64>),
    Array2(Vec<Vec<f64>>),
    Color(Color),
    Text(String),
    Bool(bool),
}

impl PropValue {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Array(_) => "array",
            Self::Array2(_) => "array2",
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
        }
    }

    pub fn as_number(&self, key: &str) -> SceneResult<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Ok(*value),
            Self::Number(_) => Err(SceneError::InvalidData(format!(
                "property `{key}` must be finite"
            ))),
            other => Err(mismatch(key, "number", other)),
        }
    }

    pub fn as_point(&self, key: &str) -> SceneResult<Vec2> {
        match self {
            Self::Array(values) if values.len() == 2 => {
                let point = Vec2::new(values[0], values[1]);
                if point.is_finite() {
                    Ok(point)
                } else {
                    Err(SceneError::InvalidData(format!(
                        "property `{key}` must be finite"
                    )))
                }
            }
            other => Err(mismatch(key, "[x, y]", other)),
        }
    }

    pub fn as_points(&self, key: &str) -> SceneResult<Vec<Vec2>> {
        match self {
            Self::Array2(rows) => rows
                .iter()
                .map(|row| Self::Array(row.clone()).as_point(key))
                .collect(),
            other => Err(mismatch(key, "[[x, y], ...]", other)),
        }
    }

    pub fn as_color(&self, key: &str) -> SceneResult<Color> {
        match self {
            Self::Color(color) => Ok(*color),
            Self::Text(text) => Color::parse(text),
            other => Err(mismatch(key, "color", other)),
        }
    }

    pub fn as_text(&self, key: &str) -> SceneResult<String> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            other => Err(mismatch(key, "text", other)),
        }
    }

    pub fn as_bool(&self, key: &str) -> SceneResult<bool> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(mismatch(key, "bool", other)),
        }
    }
}

fn mismatch(key: &str, expected: &str, found: &PropValue) -> SceneError {
    SceneError::InvalidData(format!(
        "property `{key}` expects {expected}, got {}",
        found.kind_name()
    ))
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec2> for PropValue {
    fn from(value: Vec2) -> Self {
        Self::Array(vec![value.x, value.y])
    }
}

impl From<Vec<f64>> for PropValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Array(value)
    }
}

impl From<Vec<Vec2>> for PropValue {
    fn from(points: Vec<Vec2>) -> Self {
        Self::Array2(points.into_iter().map(|point| vec![point.x, point.y]).collect())
    }
}

impl From<Color> for PropValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
