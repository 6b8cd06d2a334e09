use crate::error::SceneResult;
use crate::render::{LoadingOptions, SurfaceBackend};

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Shows the loading indicator above every layer. The effect animates
    /// on each [`SceneEngine::tick`].
    pub fn show_loading(&mut self, options: LoadingOptions) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.painter.show_loading(options)?;
        self.painter.compose()?;
        Ok(self)
    }

    pub fn hide_loading(&mut self) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.painter.hide_loading();
        self.painter.compose()?;
        Ok(self)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.painter.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::render::{LoadingEffect, LoadingOptions, NullBackend};

    #[test]
    fn loading_animates_with_the_frame_clock() {
        let mut engine =
            SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(100, 100)))
                .expect("engine");
        engine.tick(0.0).expect("tick");
        engine
            .show_loading(LoadingOptions {
                effect: LoadingEffect::ProgressBar,
                ..LoadingOptions::default()
            })
            .expect("show");
        assert!(engine.is_loading());
        let frame = engine.tick(16.0).expect("tick");
        assert!(frame.loading_advanced && frame.presented());
        engine.hide_loading().expect("hide");
        assert!(!engine.is_loading());
        assert!(!engine.tick(32.0).expect("tick").loading_advanced);
    }
}
