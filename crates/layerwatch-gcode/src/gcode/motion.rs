//! Motion state tracking
//!
//! Interprets one G-code line at a time against an explicit
//! [`MotionState`]. The state is a plain value: each step takes the
//! previous state and returns the next one, so independent files can be
//! interpreted side by side without sharing anything.

use layerwatch_core::Position;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::words::{strip_comment, tokenize, Words};

/// Distance modes for the two axis groups.
///
/// X, Y and Z follow `absolute_xy` (G90/G91); E follows `absolute_e`
/// (M82/M83). Both start absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    pub absolute_xy: bool,
    pub absolute_e: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            absolute_xy: true,
            absolute_e: true,
        }
    }
}

impl Modes {
    /// Apply any mode-setting command carried by `words`
    pub fn update(&mut self, words: &Words) {
        match words.g_code() {
            Some(90) => self.absolute_xy = true,
            Some(91) => self.absolute_xy = false,
            _ => {}
        }
        match words.m_code() {
            Some(82) => self.absolute_e = true,
            Some(83) => self.absolute_e = false,
            _ => {}
        }
    }
}

/// Interpreter state threaded through a parse pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub position: Position,
    pub modes: Modes,
}

/// Position change produced by one line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// G command number on the line, if any
    pub command: Option<i64>,
    /// Position before the line's words were applied
    pub from: Position,
    /// Position after the line's words were applied
    pub to: Position,
}

impl Move {
    /// G1 linear move
    pub fn is_linear(&self) -> bool {
        self.command == Some(1)
    }

    /// G1 move that feeds filament forward
    pub fn is_extrusion(&self) -> bool {
        self.is_linear() && self.to.e > self.from.e
    }

    /// Signed Z change of this line
    pub fn z_delta(&self) -> f64 {
        self.to.z - self.from.z
    }
}

fn apply_axis(current: f64, word: Option<f64>, absolute: bool) -> f64 {
    match word {
        Some(value) if absolute => value,
        Some(value) => current + value,
        None => current,
    }
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply already tokenized words, mutating the state in place.
    ///
    /// Mode commands take effect before the axis words of the same line.
    pub fn apply(&mut self, words: &Words) -> Move {
        self.modes.update(words);

        let from = self.position;
        let absolute_xy = self.modes.absolute_xy;
        self.position = Position {
            x: apply_axis(from.x, words.x, absolute_xy),
            y: apply_axis(from.y, words.y, absolute_xy),
            z: apply_axis(from.z, words.z, absolute_xy),
            e: apply_axis(from.e, words.e, self.modes.absolute_e),
        };

        Move {
            command: words.g_code(),
            from,
            to: self.position,
        }
    }
}

/// Interpret one raw line.
///
/// Returns the next state and, for lines with at least one recognized
/// word, the move they describe. Blank and comment-only lines leave the
/// state untouched.
pub fn step(mut state: MotionState, line: &str) -> (MotionState, Option<Move>) {
    let code = strip_comment(line);
    if code.is_empty() {
        return (state, None);
    }

    let words = tokenize(code);
    if words.is_empty() {
        trace!("No recognized words in line: {}", code);
        return (state, None);
    }

    let mv = state.apply(&words);
    (state, Some(mv))
}
