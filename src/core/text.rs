//! Approximate text metrics used for bounds and hit-testing when no font
//! backend is available to measure glyphs.

use serde::{Deserialize, Serialize};

use super::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
    Alphabetic,
}

/// Advance of one character as a fraction of the font size.
fn char_advance(ch: char) -> f64 {
    // CJK, Hangul and fullwidth forms.
    if ('\u{2E80}'..='\u{9FFF}').contains(&ch)
        || ('\u{AC00}'..='\u{D7AF}').contains(&ch)
        || ('\u{FF00}'..='\u{FFEF}').contains(&ch)
    {
        1.0
    } else {
        0.6
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_height: f64,
    pub line_count: usize,
}

/// Measures multiline text: width of the widest line, one font size per line.
#[must_use]
pub fn measure_text(text: &str, font_size: f64) -> TextMetrics {
    let font_size = if font_size.is_finite() && font_size > 0.0 {
        font_size
    } else {
        0.0
    };
    let mut width: f64 = 0.0;
    let mut line_count = 0;
    for line in text.split('\n') {
        line_count += 1;
        let line_width: f64 = line.chars().map(char_advance).sum::<f64>() * font_size;
        width = width.max(line_width);
    }
    TextMetrics {
        width,
        height: font_size * line_count as f64,
        line_height: font_size,
        line_count,
    }
}

/// Bounding box of text anchored at `(x, y)` with the given alignment.
#[must_use]
pub fn text_bounds(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    align: TextAlign,
    baseline: TextBaseline,
) -> Rect {
    let metrics = measure_text(text, font_size);
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - metrics.width * 0.5,
        TextAlign::Right => x - metrics.width,
    };
    let top = match baseline {
        TextBaseline::Top => y,
        TextBaseline::Middle => y - metrics.height * 0.5,
        TextBaseline::Bottom => y - metrics.height,
        TextBaseline::Alphabetic => y - metrics.line_height * 0.8,
    };
    Rect::new(left, top, metrics.width, metrics.height)
}
