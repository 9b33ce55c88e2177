//! Whole-file toolpath parsing
//!
//! Runs the motion state tracker over every line of a file, keeping the
//! extrusion moves and the positive Z jumps needed for layer height
//! inference, then resolves the layer height.

use layerwatch_core::constants::{DEFAULT_LAYER_HEIGHT_MM, Z_DELTA_EPSILON_MM};
use layerwatch_core::{Position, XzPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layer_height::{resolve_layer_height, LayerHeight};
use super::motion::{step, MotionState};

/// A G1 move that deposited material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionMove {
    pub from: Position,
    pub to: Position,
}

impl ExtrusionMove {
    /// Endpoints projected onto the XZ plane
    pub fn xz(&self) -> (XzPoint, XzPoint) {
        (self.from.xz(), self.to.xz())
    }
}

/// Result of interpreting a whole file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedToolpath {
    /// Extrusion moves in file order
    pub moves: Vec<ExtrusionMove>,
    /// Resolved layer height
    pub layer_height: LayerHeight,
    /// Interpreter state after the last line
    pub final_state: MotionState,
    /// Number of lines read
    pub line_count: usize,
}

/// Toolpath parser settings
#[derive(Debug, Clone, Copy)]
pub struct ToolpathParser {
    /// Z jumps at or below this are not counted as layer changes
    pub z_delta_epsilon: f64,
    /// Layer height used when nothing else resolves
    pub fallback_layer_height: f64,
}

impl Default for ToolpathParser {
    fn default() -> Self {
        Self {
            z_delta_epsilon: Z_DELTA_EPSILON_MM,
            fallback_layer_height: DEFAULT_LAYER_HEIGHT_MM,
        }
    }
}

impl ToolpathParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback_layer_height(mut self, layer_height: f64) -> Self {
        self.fallback_layer_height = layer_height;
        self
    }

    /// Interpret every line of `text`
    pub fn parse(&self, text: &str) -> ParsedToolpath {
        debug!("Starting toolpath parse, input size: {} bytes", text.len());

        let mut state = MotionState::new();
        let mut moves = Vec::new();
        let mut z_deltas = Vec::new();
        let mut line_count = 0;

        for line in text.lines() {
            line_count += 1;
            let (next, mv) = step(state, line);
            state = next;

            let Some(mv) = mv else {
                continue;
            };
            if mv.z_delta() > self.z_delta_epsilon {
                z_deltas.push(mv.z_delta());
            }
            if mv.is_extrusion() {
                moves.push(ExtrusionMove {
                    from: mv.from,
                    to: mv.to,
                });
            }
        }

        let layer_height = resolve_layer_height(text, &z_deltas, self.fallback_layer_height);

        debug!(
            "Parse complete: lines={}, extrusion moves={}, z deltas={}, layer height={:.3} ({})",
            line_count,
            moves.len(),
            z_deltas.len(),
            layer_height.value,
            layer_height.source
        );

        ParsedToolpath {
            moves,
            layer_height,
            final_state: state,
            line_count,
        }
    }
}

/// Parse with default settings
pub fn parse_toolpath(text: &str) -> ParsedToolpath {
    ToolpathParser::default().parse(text)
}
