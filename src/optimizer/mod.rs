//! Per-file driver: load, analyze, merge, analyze again and write the result
//! to the output directory, logging the before/after statistics.

pub mod config;

use std::path::{Path, PathBuf};

pub use config::OptimizerConfig;

use crate::analyze::{self, AnalyzeOptions, SceneStats};
use crate::io::gltf::scene_io::{self, SceneFileFormat};
use crate::io::progress::{LoadProgress, LogProgress};
use crate::merge::{self, MergeSummary};

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Input file not found: {0}")]
    InputNotFound(String),
    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirectory { path: String, reason: String },
    #[error("Config Error: {0}")]
    ConfigError(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Scene IO Error: {0}")]
    SceneIoError(#[from] scene_io::Err),
    #[error("Merge Error: {0}")]
    MergeError(#[from] merge::Err),
}

impl Err {
    /// Errors that end the whole run instead of just the current file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Err::OutputDirectory { .. })
    }
}

/// Result of optimizing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeReport {
    pub file: String,
    pub output: PathBuf,
    pub before: SceneStats,
    pub after: SceneStats,
    pub summary: MergeSummary,
}

impl OptimizeReport {
    pub fn mesh_label(&self) -> String {
        label(self.before.mesh_count, self.after.mesh_count)
    }

    pub fn vertex_label(&self) -> String {
        label(self.before.vertex_count, self.after.vertex_count)
    }
}

fn label(before: usize, after: usize) -> String {
    analyze::reduction_label(before, after).unwrap_or_else(|_| "no baseline".to_string())
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub result: Result<OptimizeReport, Err>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}


pub struct GltfOptimizer {
    config: OptimizerConfig,
    progress: Box<dyn LoadProgress>,
}

impl GltfOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_progress(config, Box::new(LogProgress))
    }

    pub fn with_progress(config: OptimizerConfig, progress: Box<dyn LoadProgress>) -> Self {
        Self { config, progress }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimizes `file_name` from the input directory into a file of the
    /// same name in the output directory.
    pub async fn optimize(&self, file_name: &str) -> Result<OptimizeReport, Err> {
        let input = self.config.input_dir.join(file_name);
        if !tokio::fs::try_exists(&input).await.unwrap_or(false) {
            log::warn!("File not found: {}", input.display());
            return Err(Err::InputNotFound(input.display().to_string()));
        }
        self.ensure_output_dir().await?;

        let scene = scene_io::read_scene_from_file(&input, self.progress.as_ref()).await?;
        log::info!("Scene: {} root objects", scene.root_node_indices().len());

        let stats_options = AnalyzeOptions { only_visible: self.config.stats_only_visible };
        let before = analyze::analyze_with_options(&scene, stats_options);
        log::info!("Source statistics: {}", before);

        log::info!("Merging geometry...");
        let merged = merge::merge(&scene, &self.config.merge)?;
        let after = analyze::analyze_with_options(&merged.scene, stats_options);
        log::info!("Optimized statistics: {}", after);
        log::debug!("{:?}", merged.summary);

        let output = self.config.output_dir.join(file_name);
        scene_io::write_scene_to_file(&output, &merged.scene, &self.config.encode).await?;

        let report = OptimizeReport {
            file: file_name.to_string(),
            output,
            before,
            after,
            summary: merged.summary,
        };
        log::info!("Optimization finished");
        log::info!("   - meshes: {} -> {} ({})", before.mesh_count, after.mesh_count, report.mesh_label());
        log::info!("   - vertices: {} -> {} ({})", before.vertex_count, after.vertex_count, report.vertex_label());
        log::info!("Saved {}", report.output.display());
        Ok(report)
    }

    /// Optimizes each file in turn. A failing file is recorded and the batch
    /// moves on; only a fatal error ends it early.
    pub async fn optimize_multiple<S: AsRef<str>>(&self, file_names: &[S]) -> Result<Vec<FileOutcome>, Err> {
        self.ensure_output_dir().await?;

        let mut outcomes = Vec::with_capacity(file_names.len());
        for file in file_names {
            let file = file.as_ref();
            log::info!("Processing {}", file);
            let result = match self.optimize(file).await {
                Err(e) if e.is_fatal() => return Err(e),
                result => result,
            };
            match &result {
                Ok(_) => log::info!("{} - optimized", file),
                Err(e) => log::error!("{} - failed: {}", file, e),
            }
            outcomes.push(FileOutcome { file: file.to_string(), result });
        }
        Ok(outcomes)
    }

    /// Optimizes every `.gltf`/`.glb` file of the input directory.
    pub async fn optimize_all(&self) -> Result<Vec<FileOutcome>, Err> {
        let files = self.available_files().await?;
        self.optimize_multiple(&files).await
    }

    /// Names of the `.gltf`/`.glb` files in the input directory, matched
    /// case-insensitively and sorted. A missing directory yields no files.
    pub async fn available_files(&self) -> Result<Vec<String>, Err> {
        let dir = &self.config.input_dir;
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            log::warn!("Input directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if scene_io::get_scene_file_format(Path::new(&name)) != SceneFileFormat::Unknown {
                files.push(name);
            }
        }
        files.sort();

        log::info!("Found {} glTF files:", files.len());
        for file in &files {
            log::info!("   - {}", file);
        }
        Ok(files)
    }

    /// Deletes the output directory recursively. Returns whether there was
    /// anything to delete.
    pub async fn clear_output(&self) -> Result<bool, Err> {
        let dir = &self.config.output_dir;
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            log::info!("Output directory {} does not exist", dir.display());
            return Ok(false);
        }
        tokio::fs::remove_dir_all(dir).await?;
        log::info!("Cleared {}", dir.display());
        Ok(true)
    }

    async fn ensure_output_dir(&self) -> Result<(), Err> {
        let dir = &self.config.output_dir;
        if tokio::fs::try_exists(dir).await.unwrap_or(false) {
            return Ok(());
        }
        tokio::fs::create_dir_all(dir).await.map_err(|e| Err::OutputDirectory {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        log::info!("Created output directory {}", dir.display());
        Ok(())
    }
}
