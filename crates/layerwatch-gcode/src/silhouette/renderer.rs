//! Silhouette renderer with toolpath caching
//!
//! The monitor renders the same file once per polling tick, so parsed
//! toolpaths are reused while the G-code text is unchanged.

use layerwatch_core::GcodeError;
use std::path::Path;

use super::extract::LayerWindow;
use super::options::RenderOptions;
use super::raster::{render_silhouette, Silhouette};
use super::toolpath_cache::{content_hash, ToolpathCache};
use crate::gcode::{ParsedToolpath, ToolpathParser};
use crate::utils::file_io::read_gcode_lossy;

#[derive(Debug, Clone, Default)]
pub struct SilhouetteRenderer {
    options: RenderOptions,
    cache: ToolpathCache,
}

impl SilhouetteRenderer {
    pub fn new(options: RenderOptions) -> Result<Self, GcodeError> {
        options.validate()?;
        Ok(Self {
            options,
            cache: ToolpathCache::new(),
        })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parse `text`, reusing the cached toolpath when the text is unchanged
    pub fn toolpath(&mut self, text: &str) -> &ParsedToolpath {
        let parser = ToolpathParser {
            z_delta_epsilon: self.options.z_delta_epsilon,
            fallback_layer_height: self.options.fallback_layer_height,
        };
        self.cache.get_or_parse(content_hash(text), || parser.parse(text))
    }

    pub fn render_text(
        &mut self,
        text: &str,
        window: LayerWindow,
    ) -> Result<Silhouette, GcodeError> {
        let options = self.options;
        let toolpath = self.toolpath(text);
        render_silhouette(toolpath, window, &options)
    }

    pub fn render_file(
        &mut self,
        path: &Path,
        window: LayerWindow,
    ) -> Result<Silhouette, GcodeError> {
        let text = read_gcode_lossy(path)?;
        self.render_text(&text, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_options() {
        let options = RenderOptions::default().with_scale(-1.0);
        assert!(SilhouetteRenderer::new(options).is_err());
    }

    #[test]
    fn test_repeated_render_is_identical() {
        let mut renderer = SilhouetteRenderer::default();
        let text = "G90\nM82\nG1 X10 Z0.2 E1\nG1 X20 Z0.2 E2\n";
        let first = renderer.render_text(text, LayerWindow::UpTo(0)).unwrap();
        let second = renderer.render_text(text, LayerWindow::UpTo(0)).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(first.info, second.info);
    }

    #[test]
    fn test_changed_text_is_reparsed() {
        let mut renderer = SilhouetteRenderer::default();
        let a = renderer.toolpath("G1 X10 E1\n").moves.len();
        let b = renderer.toolpath("G1 X10 E1\nG1 X20 E2\n").moves.len();
        assert_eq!((a, b), (1, 2));
    }
}
