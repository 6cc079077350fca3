//! Batch renderer: drives the renderer and converter over a sample table.
//!
//! Samples are processed strictly in order. For each one the renderer writes
//! the vector artifact, then the converter rasterizes it. The first failing
//! invocation aborts the batch; artifacts already written stay on disk.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    config::{OutputSettings, Settings},
    samples::Sample,
    tools::{ConverterTool, RendererTool, ToolCommand, ToolError, ToolOutput},
};

/// Pipeline stage a sample failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Convert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => f.write_str("rendering"),
            Self::Convert => f.write_str("conversion"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no samples to render")]
    EmptyBatch,
    #[error("failed to create output directory `{}`: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rendering of sample `{sample}` failed: {source}")]
    Render {
        sample: String,
        #[source]
        source: ToolError,
    },
    #[error("conversion of sample `{sample}` failed: {source}")]
    Convert {
        sample: String,
        #[source]
        source: ToolError,
    },
}

impl BatchError {
    /// Name of the sample the batch stopped on, if a sample was reached.
    pub fn sample(&self) -> Option<&str> {
        match self {
            Self::Render { sample, .. } | Self::Convert { sample, .. } => Some(sample),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Render { .. } => Some(Stage::Render),
            Self::Convert { .. } => Some(Stage::Convert),
            _ => None,
        }
    }
}

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Output locations derived for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vector: PathBuf,
    pub raster: PathBuf,
}

/// File naming for the artifacts of a batch.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    vector_extension: String,
    raster_extension: String,
}

impl ArtifactLayout {
    pub fn new(vector_extension: impl Into<String>, raster_extension: impl Into<String>) -> Self {
        Self {
            vector_extension: vector_extension.into(),
            raster_extension: raster_extension.into(),
        }
    }

    pub fn vector_path(&self, output_dir: &Path, name: &str) -> PathBuf {
        output_dir.join(format!("{name}.{}", self.vector_extension))
    }

    pub fn raster_path(&self, output_dir: &Path, name: &str) -> PathBuf {
        output_dir.join(format!("{name}.{}", self.raster_extension))
    }

    pub fn paths(&self, output_dir: &Path, name: &str) -> ArtifactPaths {
        ArtifactPaths {
            vector: self.vector_path(output_dir, name),
            raster: self.raster_path(output_dir, name),
        }
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new("svg", "png")
    }
}

impl From<&OutputSettings> for ArtifactLayout {
    fn from(settings: &OutputSettings) -> Self {
        Self::new(
            settings.vector_extension.clone(),
            settings.raster_extension.clone(),
        )
    }
}

/// Summary of a successful batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub artifacts: Vec<ArtifactPaths>,
    pub elapsed: Duration,
}

/// The two invocations planned for a sample.
#[derive(Debug, Clone)]
pub struct PlannedSample {
    pub name: String,
    pub render: ToolCommand,
    pub convert: ToolCommand,
}

#[derive(Debug, Clone)]
pub struct BatchRenderer {
    renderer: RendererTool,
    converter: ConverterTool,
    layout: ArtifactLayout,
    state: BatchState,
}

impl BatchRenderer {
    pub fn new(renderer: RendererTool, converter: ConverterTool, layout: ArtifactLayout) -> Self {
        Self {
            renderer,
            converter,
            layout,
            state: BatchState::Pending,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            RendererTool::from(&settings.renderer),
            ConverterTool::from(&settings.converter),
            ArtifactLayout::from(&settings.output),
        )
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// The invocations `run_batch` would perform, in order, without running anything.
    pub fn plan(&self, samples: &[Sample], output_dir: &Path) -> Vec<PlannedSample> {
        samples
            .iter()
            .map(|sample| {
                let paths = self.layout.paths(output_dir, &sample.name);
                PlannedSample {
                    name: sample.name.clone(),
                    render: self.renderer.command(&sample.content, &paths.vector),
                    convert: self.converter.command(&paths.vector, &paths.raster),
                }
            })
            .collect()
    }

    /// Render every sample into `output_dir`, stopping at the first failure.
    pub fn run_batch(
        &mut self,
        samples: &[Sample],
        output_dir: &Path,
    ) -> Result<BatchReport, BatchError> {
        let result = self.run_inner(samples, output_dir);
        self.state = match &result {
            Ok(_) => BatchState::Completed,
            Err(_) => BatchState::Failed,
        };
        result
    }

    fn run_inner(
        &mut self,
        samples: &[Sample],
        output_dir: &Path,
    ) -> Result<BatchReport, BatchError> {
        let started_at = Instant::now();

        if samples.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        fs::create_dir_all(output_dir).map_err(|source| {
            error!(
                target = "batch",
                op = "batch::run",
                result = "error",
                error_code = "create_dir",
                output_dir = %output_dir.display(),
                error = %source,
                "Failed to create output directory"
            );
            BatchError::DirectoryCreation {
                path: output_dir.to_path_buf(),
                source,
            }
        })?;

        self.state = BatchState::InProgress;
        info!(
            target = "batch",
            op = "batch::run",
            samples = samples.len(),
            output_dir = %output_dir.display(),
            "Starting batch"
        );

        let mut artifacts = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            let paths = self.process_sample(sample, output_dir)?;
            info!(
                target = "batch",
                op = "batch::sample",
                result = "ok",
                sample = %sample.name,
                position = index + 1,
                total = samples.len(),
                raster = %paths.raster.display(),
                "Sample rendered"
            );
            artifacts.push(paths);
        }

        let elapsed = started_at.elapsed();
        info!(
            target = "batch",
            op = "batch::run",
            result = "ok",
            samples = artifacts.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Render generation complete"
        );

        Ok(BatchReport { artifacts, elapsed })
    }

    fn process_sample(
        &self,
        sample: &Sample,
        output_dir: &Path,
    ) -> Result<ArtifactPaths, BatchError> {
        let vector = self.layout.vector_path(output_dir, &sample.name);
        let rendered = self
            .renderer
            .command(&sample.content, &vector)
            .run()
            .map_err(|source| {
                log_stage_failure(sample, Stage::Render, &source);
                BatchError::Render {
                    sample: sample.name.clone(),
                    source,
                }
            })?;
        log_tool_diagnostics(sample, Stage::Render, &rendered);

        let raster = self.layout.raster_path(output_dir, &sample.name);
        let converted = self
            .converter
            .command(&vector, &raster)
            .run()
            .map_err(|source| {
                log_stage_failure(sample, Stage::Convert, &source);
                BatchError::Convert {
                    sample: sample.name.clone(),
                    source,
                }
            })?;
        log_tool_diagnostics(sample, Stage::Convert, &converted);

        Ok(ArtifactPaths { vector, raster })
    }
}

fn log_tool_diagnostics(sample: &Sample, stage: Stage, output: &ToolOutput) {
    if output.stderr.is_empty() {
        return;
    }
    warn!(
        target = "batch",
        op = "batch::sample",
        result = "ok",
        sample = %sample.name,
        stage = %stage,
        elapsed_ms = output.elapsed.as_millis() as u64,
        stderr = %output.stderr,
        "Tool succeeded with diagnostics"
    );
}

fn log_stage_failure(sample: &Sample, stage: Stage, err: &ToolError) {
    error!(
        target = "batch",
        op = "batch::sample",
        result = "error",
        sample = %sample.name,
        stage = %stage,
        exit_code = err.exit_code().map(i64::from).unwrap_or(-1),
        error = %err,
        "Sample failed; aborting batch"
    );
}
