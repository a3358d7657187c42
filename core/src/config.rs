use crate::pagerank::PageRankConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine settings. Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_rank: PageRankConfig,
    /// Apply Snowball stemming in the default normalizer.
    pub stemming: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { page_rank: PageRankConfig::default(), stemming: true }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.page_rank.tolerance > 0.0) {
            bail!("page_rank.tolerance must be > 0, got {}", self.page_rank.tolerance);
        }
        if self.page_rank.max_iterations == 0 {
            bail!("page_rank.max_iterations must be > 0");
        }
        Ok(())
    }
}
