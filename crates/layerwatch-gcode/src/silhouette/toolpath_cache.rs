use crate::gcode::ParsedToolpath;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Hash of G-code text used as the cache key
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Last parsed toolpath, keyed by the hash of its source text
#[derive(Debug, Default, Clone)]
pub struct ToolpathCache {
    content_hash: u64,
    toolpath: Option<ParsedToolpath>,
}

impl ToolpathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn needs_update(&self, new_hash: u64) -> bool {
        self.content_hash != new_hash || self.toolpath.is_none()
    }

    pub fn update(&mut self, new_hash: u64, toolpath: ParsedToolpath) {
        debug!(
            "Caching toolpath {:016x} with {} extrusion moves",
            new_hash,
            toolpath.moves.len()
        );
        self.content_hash = new_hash;
        self.toolpath = Some(toolpath);
    }

    /// Cached toolpath for `new_hash`, running `parse` on a miss
    pub fn get_or_parse<F>(&mut self, new_hash: u64, parse: F) -> &ParsedToolpath
    where
        F: FnOnce() -> ParsedToolpath,
    {
        if self.needs_update(new_hash) {
            self.update(new_hash, parse());
        } else {
            debug!("Toolpath cache hit ({:016x})", new_hash);
        }
        self.toolpath.get_or_insert_with(ParsedToolpath::default)
    }

    pub fn toolpath(&self) -> Option<&ParsedToolpath> {
        self.toolpath.as_ref()
    }

    pub fn clear(&mut self) {
        self.content_hash = 0;
        self.toolpath = None;
    }

    pub fn is_empty(&self) -> bool {
        self.toolpath.is_none()
    }
}
