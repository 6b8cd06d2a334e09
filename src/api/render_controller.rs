use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::TickReport;
use crate::error::SceneResult;
use crate::render::{RefreshReport, SurfaceBackend};

use super::SceneEngine;

/// What one [`SceneEngine::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    #[serde(skip)]
    pub animation: TickReport,
    /// Present when layers were repainted this frame.
    pub refresh: Option<RefreshReport>,
    pub hover_refreshed: bool,
    pub loading_advanced: bool,
}

impl FrameReport {
    /// Whether the composed frame changed and should be presented.
    #[must_use]
    pub fn presented(&self) -> bool {
        self.refresh.is_some() || self.hover_refreshed || self.loading_advanced
    }
}

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Repaints every layer and the hover overlay, then composes the frame.
    pub fn render(&mut self) -> SceneResult<RefreshReport> {
        self.ensure_live()?;
        self.paint(true)
    }

    /// Repaints the dirty layers only, then composes the frame.
    pub fn refresh(&mut self) -> SceneResult<RefreshReport> {
        self.ensure_live()?;
        self.paint(false)
    }

    /// Defers one repaint to the next [`SceneEngine::tick`], coalescing any
    /// number of mutations into a single paint.
    pub fn refresh_next_frame(&mut self) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.needs_refresh = true;
        Ok(self)
    }

    /// Repaints the hover overlay only, then composes the frame.
    pub fn refresh_hover_only(&mut self) -> SceneResult<usize> {
        self.ensure_live()?;
        let painted = self.painter.refresh_hover(&mut self.storage)?;
        self.painter.compose()?;
        self.needs_hover_refresh = false;
        Ok(painted)
    }

    fn paint(&mut self, paint_all: bool) -> SceneResult<RefreshReport> {
        let report = self.painter.refresh(&mut self.storage, paint_all)?;
        self.painter.refresh_hover(&mut self.storage)?;
        self.painter.compose()?;
        self.needs_refresh = false;
        self.needs_hover_refresh = false;
        trace!(
            repainted = ?report.repainted_tiers,
            painted = report.painted,
            failures = report.failures,
            "frame painted"
        );
        Ok(report)
    }

    /// Frame callback: steps clips (running deferred completion callbacks),
    /// advances the loading effect, then performs the pending refresh or
    /// hover refresh.
    pub fn tick(&mut self, now_ms: f64) -> SceneResult<FrameReport> {
        self.ensure_live()?;
        let mut report = FrameReport {
            animation: self.scheduler.step(now_ms, &mut self.storage),
            ..FrameReport::default()
        };
        if report.animation.changed() || report.animation.cancelled > 0 {
            self.needs_refresh = true;
        }
        report.loading_advanced = self.painter.advance_loading(now_ms)?;
        if self.needs_refresh {
            report.refresh = Some(self.paint(false)?);
        } else if self.needs_hover_refresh {
            self.refresh_hover_only()?;
            report.hover_refreshed = true;
        } else if report.loading_advanced {
            self.painter.compose()?;
        }
        Ok(report)
    }

    #[must_use]
    pub fn get_width(&self) -> u32 {
        self.painter.width()
    }

    #[must_use]
    pub fn get_height(&self) -> u32 {
        self.painter.height()
    }

    /// Resizes every layer surface. On allocation failure the previous
    /// surfaces stay in place and the error is returned.
    pub fn resize(&mut self, width: u32, height: u32) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        if self.painter.resize(width, height)? {
            self.config.viewport.width = width;
            self.config.viewport.height = height;
            self.needs_refresh = true;
            debug!(width, height, "scene engine resized");
        }
        Ok(self)
    }

    /// Current composed frame.
    #[must_use]
    pub fn frame(&self) -> &B::Surface {
        self.painter.frame()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::error::SceneError;
    use crate::render::NullBackend;
    use crate::shape::Shape;

    #[test]
    fn tick_coalesces_mutations_into_one_paint() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(64, 64)))
                .expect("engine");
        for i in 0..5 {
            engine
                .add_shape(Shape::circle(f64::from(i) * 10.0, 10.0, 4.0))
                .expect("add");
        }
        let first = engine.tick(0.0).expect("tick");
        assert_eq!(first.refresh.as_ref().map(|report| report.painted), Some(5));
        let idle = engine.tick(16.0).expect("tick");
        assert!(!idle.presented());
        engine.refresh_next_frame().expect("defer");
        assert!(engine.tick(32.0).expect("tick").refresh.is_some());
    }

    #[test]
    fn failed_resize_keeps_previous_size() {
        let mut engine = SceneEngine::new(
            NullBackend::with_max_dimension(200),
            EngineConfig::new(Viewport::new(100, 100)),
        )
        .expect("engine");
        engine.add_shape(Shape::rect(0.0, 0.0, 10.0, 10.0)).expect("add");
        engine.render().expect("render");
        assert!(matches!(
            engine.resize(400, 100),
            Err(SceneError::ResourceExhausted { .. })
        ));
        assert_eq!((engine.get_width(), engine.get_height()), (100, 100));
        engine.resize(150, 120).expect("resize");
        assert_eq!((engine.get_width(), engine.get_height()), (150, 120));
    }
}
