//! # LayerWatch G-Code
//!
//! G-code motion interpretation and front-view silhouette rendering.
//! Includes the line tokenizer, the motion state tracker, layer height
//! resolution, layer windowing and the rasterizer.

pub mod gcode;
pub mod silhouette;
pub mod utils;

pub use gcode::{
    parse_toolpath, resolve_layer_height, step, strip_comment, tokenize, ExtrusionMove,
    LayerHeight, LayerHeightSource, Modes, MotionState, Move, ParsedToolpath, ToolpathParser, Words,
};

pub use silhouette::{
    extract_segments, rasterize, render_silhouette, LayerWindow, RenderInfo, RenderOptions,
    Segment, Silhouette, SilhouetteRenderer, StrokePolicy, ToolpathCache, WindowedSegments,
};

pub use utils::{read_gcode_lossy, GcodeFileReader};
