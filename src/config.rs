use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::unfold::SeedPolicy;

/// Engine settings, read from a TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct UnfoldConfig {
    #[serde(default)]
    pub seed: SeedPolicy,
    /// Abort with an unboundedness error when a firing strictly covers a
    /// marking on the active path.
    #[serde(default = "default_detect_unbounded")]
    pub detect_unbounded: bool,
    /// 最多执行的引擎步数. None表示不设上限.
    #[serde(default)]
    pub step_limit: Option<usize>,
    /// 展开结构允许的最大库所数.
    #[serde(default)]
    pub place_limit: Option<usize>,
    #[serde(default)]
    pub record_graph: bool,
}

impl Default for UnfoldConfig {
    fn default() -> Self {
        Self {
            seed: SeedPolicy::default(),
            detect_unbounded: default_detect_unbounded(),
            step_limit: None,
            place_limit: None,
            record_graph: false,
        }
    }
}

impl UnfoldConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_detect_unbounded() -> bool {
    true
}
