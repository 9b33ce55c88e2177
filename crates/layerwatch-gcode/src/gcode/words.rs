//! Line tokenizing into a fixed word record

use serde::{Deserialize, Serialize};

/// The recognized words of one G-code line.
///
/// Letters other than G, M, X, Y, Z, E and F are dropped during
/// tokenizing. A repeated letter keeps its last value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Words {
    pub g: Option<f64>,
    pub m: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
}

impl Words {
    /// G command number, truncated toward zero (`G1.0` is 1)
    pub fn g_code(&self) -> Option<i64> {
        self.g.map(|v| v.trunc() as i64)
    }

    /// M command number, truncated toward zero
    pub fn m_code(&self) -> Option<i64> {
        self.m.map(|v| v.trunc() as i64)
    }

    /// True when no recognized word was found
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the line carries any axis word
    pub fn has_axis(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some() || self.e.is_some()
    }

    fn set(&mut self, letter: char, value: f64) {
        let slot = match letter {
            'G' => &mut self.g,
            'M' => &mut self.m,
            'X' => &mut self.x,
            'Y' => &mut self.y,
            'Z' => &mut self.z,
            'E' => &mut self.e,
            'F' => &mut self.f,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Remove a trailing `;` comment and surrounding whitespace
pub fn strip_comment(line: &str) -> &str {
    match line.split_once(';') {
        Some((code, _)) => code.trim(),
        None => line.trim(),
    }
}

/// Tokenize a comment-free line into its words.
///
/// Tokens are whitespace separated. A token is kept only when its first
/// character is a letter and the remainder parses as a finite number;
/// anything else is skipped without failing the line.
pub fn tokenize(code: &str) -> Words {
    let mut words = Words::default();

    for token in code.split_whitespace() {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if !first.is_ascii_alphabetic() {
            continue;
        }
        let rest = chars.as_str();
        if rest.is_empty() {
            continue;
        }
        match rest.parse::<f64>() {
            Ok(value) if value.is_finite() => words.set(first.to_ascii_uppercase(), value),
            _ => {}
        }
    }

    words
}
