use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::gltf::encode::EncodeOptions;
use crate::merge::MergeOptions;

use super::Err;

/// Settings of a [`GltfOptimizer`](super::GltfOptimizer) run. Every field has
/// a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub merge: MergeOptions,
    pub encode: EncodeOptions,
    /// Leave hidden subtrees out of the before/after statistics.
    pub stats_only_visible: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            merge: MergeOptions::default(),
            encode: EncodeOptions::default(),
            stats_only_visible: false,
        }
    }
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Err> {
        serde_json::from_str(json).map_err(|e| Err::ConfigError(e.to_string()))
    }

    pub async fn from_json_file(path: &Path) -> Result<Self, Err> {
        let json = tokio::fs::read_to_string(path).await
            .map_err(|e| Err::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}
