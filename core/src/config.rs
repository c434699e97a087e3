use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f32,
    /// Document length normalization strength, 0.0 to 1.0.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellingConfig {
    pub enabled: bool,
    pub max_distance: usize,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self { enabled: true, max_distance: 1 }
    }
}

/// Ranking configuration. Every field has a default, so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub bm25: Bm25Params,
    pub default_limit: usize,
    pub max_limit: usize,
    pub spelling: SpellingConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { bm25: Bm25Params::default(), default_limit: 10, max_limit: 100, spelling: SpellingConfig::default() }
    }
}

impl SearchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Requested result count, falling back to `default_limit` and clamped to `1..=max_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).max(1).min(self.max_limit.max(1))
    }
}
