use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::{Matrix, PathData, TextAlign, TextBaseline};
use crate::error::SceneResult;
use crate::shape::{LineCap, LineJoin};

use super::surface::{StrokeParams, Surface, TextRun};
use super::Color;

const SPINNER_SPOKES: u32 = 12;
const SPINNER_PERIOD_MS: f64 = 1_000.0;
const PROGRESS_PERIOD_MS: f64 = 1_500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadingEffect {
    #[default]
    Spinner,
    ProgressBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingOptions {
    #[serde(default)]
    pub effect: LoadingEffect,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default = "default_mask")]
    pub mask: Color,
}

fn default_color() -> Color {
    Color::rgb(0.2, 0.4, 0.8)
}

fn default_mask() -> Color {
    Color::rgba(1.0, 1.0, 1.0, 0.8)
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            effect: LoadingEffect::default(),
            text: None,
            color: default_color(),
            mask: default_mask(),
        }
    }
}

/// Loading indicator animated by the frame clock.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingOverlay {
    options: LoadingOptions,
    started_ms: Option<f64>,
    elapsed_ms: f64,
}

impl LoadingOverlay {
    #[must_use]
    pub fn new(options: LoadingOptions) -> Self {
        Self {
            options,
            started_ms: None,
            elapsed_ms: 0.0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &LoadingOptions {
        &self.options
    }

    /// Advances the animation phase; the first call anchors the clock.
    pub fn advance(&mut self, now_ms: f64) {
        let started = *self.started_ms.get_or_insert(now_ms);
        self.elapsed_ms = (now_ms - started).max(0.0);
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn paint<S: Surface>(&self, surface: &mut S, transform: &Matrix) -> SceneResult<()> {
        let width = f64::from(surface.width()) / transform.a.max(f64::EPSILON);
        let height = f64::from(surface.height()) / transform.d.max(f64::EPSILON);
        surface.clear(None);
        let mut mask = PathData::new();
        mask.rect(0.0, 0.0, width, height);
        surface.fill_path(&mask, transform, self.options.mask)?;

        let center_x = width / 2.0;
        let center_y = height / 2.0;
        match self.options.effect {
            LoadingEffect::Spinner => self.paint_spinner(surface, transform, center_x, center_y)?,
            LoadingEffect::ProgressBar => {
                self.paint_progress(surface, transform, width, center_y)?;
            }
        }
        if let Some(text) = &self.options.text {
            surface.draw_text(
                &TextRun {
                    text,
                    x: center_x,
                    y: center_y + 40.0,
                    font_size: 14.0,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Top,
                    color: self.options.color,
                },
                transform,
            )?;
        }
        Ok(())
    }

    fn paint_spinner<S: Surface>(
        &self,
        surface: &mut S,
        transform: &Matrix,
        center_x: f64,
        center_y: f64,
    ) -> SceneResult<()> {
        let lead = ((self.elapsed_ms % SPINNER_PERIOD_MS) / SPINNER_PERIOD_MS
            * f64::from(SPINNER_SPOKES))
        .floor() as u32;
        let stroke = StrokeParams {
            width: 3.0,
            dash: &[],
            cap: LineCap::Round,
            join: LineJoin::Round,
        };
        for spoke in 0..SPINNER_SPOKES {
            let angle = TAU * f64::from(spoke) / f64::from(SPINNER_SPOKES);
            let age = (lead + SPINNER_SPOKES - spoke) % SPINNER_SPOKES;
            let alpha = 1.0 - f64::from(age) / f64::from(SPINNER_SPOKES);
            let (sin, cos) = angle.sin_cos();
            let mut spoke_path = PathData::new();
            spoke_path
                .move_to(center_x + cos * 10.0, center_y + sin * 10.0)
                .line_to(center_x + cos * 20.0, center_y + sin * 20.0);
            surface.stroke_path(
                &spoke_path,
                transform,
                self.options.color.with_alpha(alpha),
                &stroke,
            )?;
        }
        Ok(())
    }

    fn paint_progress<S: Surface>(
        &self,
        surface: &mut S,
        transform: &Matrix,
        width: f64,
        center_y: f64,
    ) -> SceneResult<()> {
        let track_width = (width * 0.6).max(1.0);
        let left = (width - track_width) / 2.0;
        let progress = (self.elapsed_ms % PROGRESS_PERIOD_MS) / PROGRESS_PERIOD_MS;
        let mut track = PathData::new();
        track.rounded_rect(left, center_y - 4.0, track_width, 8.0, [4.0; 4]);
        surface.fill_path(&track, transform, self.options.color.with_alpha(0.25))?;
        let mut bar = PathData::new();
        bar.rounded_rect(
            left,
            center_y - 4.0,
            (track_width * progress).max(8.0),
            8.0,
            [4.0; 4],
        );
        surface.fill_path(&bar, transform, self.options.color)
    }
}
