//! Front-view silhouette rendering
//!
//! This module provides:
//! - Layer windowing of extrusion moves into XZ segments
//! - Rasterization with line or filled-bead strokes
//! - A renderer that caches parsed toolpaths by content hash

pub mod extract;
pub mod options;
pub mod raster;
pub mod renderer;
pub mod toolpath_cache;

pub use extract::{extract_segments, LayerWindow, Segment, WindowedSegments};
pub use options::{RenderOptions, StrokePolicy};
pub use raster::{rasterize, render_silhouette, RenderInfo, Silhouette};
pub use renderer::SilhouetteRenderer;
pub use toolpath_cache::ToolpathCache;
