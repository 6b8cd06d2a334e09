use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("aqua", [0, 255, 255]),
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("brown", [165, 42, 42]),
    ("coral", [255, 127, 80]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkred", [139, 0, 0]),
    ("fuchsia", [255, 0, 255]),
    ("gold", [255, 215, 0]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("grey", [128, 128, 128]),
    ("indigo", [75, 0, 130]),
    ("lightblue", [173, 216, 230]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lime", [0, 255, 0]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("teal", [0, 128, 128]),
    ("tomato", [255, 99, 71]),
    ("violet", [238, 130, 238]),
    ("white", [255, 255, 255]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            f64::from(alpha) / 255.0,
        )
    }

    pub fn validate(self) -> SceneResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SceneError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Channels clamped into range; non-finite channels become 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |value: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        Self::rgba(
            clamp(self.red),
            clamp(self.green),
            clamp(self.blue),
            clamp(self.alpha),
        )
    }

    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        let color = self.clamped();
        [color.red, color.green, color.blue, color.alpha].map(|value| (value * 255.0).round() as u8)
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Per-channel linear blend; `t = 0` yields `self`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::rgba(
            self.red + (other.red - self.red) * t,
            self.green + (other.green - self.green) * t,
            self.blue + (other.blue - self.blue) * t,
            self.alpha + (other.alpha - self.alpha) * t,
        )
        .clamped()
    }

    /// Lightens towards white by `level` (negative levels darken towards black).
    #[must_use]
    pub fn lift(self, level: f64) -> Self {
        let target = if level >= 0.0 { Self::WHITE } else { Self::BLACK };
        let mixed = self.lerp(target, level.abs().min(1.0));
        mixed.with_alpha(self.alpha)
    }

    /// Weighted mix where `weight` is the share of `self`.
    #[must_use]
    pub fn mix(self, other: Self, weight: f64) -> Self {
        other.lerp(self, weight.clamp(0.0, 1.0))
    }

    /// Serialises as CSS `rgba(r,g,b,a)` with 0..=255 colour channels.
    #[must_use]
    pub fn to_css(self) -> String {
        let [red, green, blue, _] = self.to_rgba8();
        let alpha = (self.clamped().alpha * 1000.0).round() / 1000.0;
        format!("rgba({red},{green},{blue},{alpha})")
    }

    /// Parses CSS colour syntax: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb()`, `rgba()`, `hsl()`, `hsla()` and common named colours.
    pub fn parse(text: &str) -> SceneResult<Self> {
        let trimmed = text.trim().to_ascii_lowercase();
        let invalid = || SceneError::InvalidData(format!("unrecognised color `{text}`"));

        if trimmed == "transparent" {
            return Ok(Self::TRANSPARENT);
        }
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some((name, args)) = trimmed
            .strip_suffix(')')
            .and_then(|body| body.split_once('('))
        {
            let values: Vec<&str> = args
                .split([',', ' ', '/'])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            return match (name.trim(), values.len()) {
                ("rgb" | "rgba", 3 | 4) => {
                    let red = parse_rgb_channel(values[0]).ok_or_else(invalid)?;
                    let green = parse_rgb_channel(values[1]).ok_or_else(invalid)?;
                    let blue = parse_rgb_channel(values[2]).ok_or_else(invalid)?;
                    let alpha = match values.get(3) {
                        Some(raw) => parse_alpha(raw).ok_or_else(invalid)?,
                        None => 1.0,
                    };
                    Ok(Self::rgba(red, green, blue, alpha))
                }
                ("hsl" | "hsla", 3 | 4) => {
                    let hue = values[0]
                        .trim_end_matches("deg")
                        .parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .ok_or_else(invalid)?;
                    let saturation = parse_percent(values[1]).ok_or_else(invalid)?;
                    let lightness = parse_percent(values[2]).ok_or_else(invalid)?;
                    let alpha = match values.get(3) {
                        Some(raw) => parse_alpha(raw).ok_or_else(invalid)?,
                        None => 1.0,
                    };
                    Ok(hsl_to_rgb(hue, saturation, lightness).with_alpha(alpha))
                }
                _ => Err(invalid()),
            };
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == trimmed)
            .map(|(_, [red, green, blue])| Self::from_rgba8(*red, *green, *blue, 255))
            .ok_or_else(invalid)
    }
}

impl FromStr for Color {
    type Err = SceneError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |index: usize| u8::from_str_radix(&hex[index..=index], 16).ok();
    let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let mut channels = [255_u8; 4];
            for (index, channel) in channels.iter_mut().enumerate().take(hex.len()) {
                let value = nibble(index)?;
                *channel = value * 17;
            }
            Some(Color::from_rgba8(
                channels[0],
                channels[1],
                channels[2],
                channels[3],
            ))
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, alpha))
        }
        _ => None,
    }
}

fn parse_percent(raw: &str) -> Option<f64> {
    let value = raw.strip_suffix('%')?.parse::<f64>().ok()?;
    value.is_finite().then(|| (value / 100.0).clamp(0.0, 1.0))
}

fn parse_rgb_channel(raw: &str) -> Option<f64> {
    if raw.ends_with('%') {
        return parse_percent(raw);
    }
    let value = raw.parse::<f64>().ok()?;
    value.is_finite().then(|| (value / 255.0).clamp(0.0, 1.0))
}

fn parse_alpha(raw: &str) -> Option<f64> {
    if raw.ends_with('%') {
        return parse_percent(raw);
    }
    let value = raw.parse::<f64>().ok()?;
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Color {
    let hue = hue.rem_euclid(360.0) / 360.0;
    if saturation == 0.0 {
        return Color::rgb(lightness, lightness, lightness);
    }
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    Color::rgb(channel(hue + 1.0 / 3.0), channel(hue), channel(hue - 1.0 / 3.0))
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_common_css_forms() {
        assert_eq!(Color::parse("#f00").expect("hex3"), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(
            Color::parse("#00ff0080").expect("hex8").to_rgba8(),
            [0, 255, 0, 128]
        );
        assert_eq!(
            Color::parse("rgba(255, 0, 0, 0.5)").expect("rgba"),
            Color::rgba(1.0, 0.0, 0.0, 0.5)
        );
        assert_eq!(Color::parse("Navy").expect("named").to_rgba8(), [0, 0, 128, 255]);
        assert_eq!(
            Color::parse("hsl(120, 100%, 50%)").expect("hsl").to_rgba8(),
            [0, 255, 0, 255]
        );
        assert!(Color::parse("nope").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn css_serialisation_round_trips() {
        let color = Color::parse("rgba(10,20,30,0.25)").expect("rgba");
        assert_eq!(color.to_css(), "rgba(10,20,30,0.25)");
        assert_eq!(Color::parse(&color.to_css()).expect("round trip"), color);
    }

    #[test]
    fn lift_moves_towards_white_and_keeps_alpha() {
        let lifted = Color::rgba(0.5, 0.0, 0.0, 0.4).lift(0.5);
        assert!((lifted.red - 0.75).abs() < 1e-12);
        assert!((lifted.green - 0.5).abs() < 1e-12);
        assert_eq!(lifted.alpha, 0.4);
    }
}
