//! External renderer and converter invocations.
//!
//! Both tools are opaque executables. Arguments are passed as an argument
//! vector, never through a shell, so sample content reaches the renderer
//! verbatim.

use std::{
    ffi::OsString,
    fmt, io,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::{Duration, Instant},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConverterSettings, RendererSettings};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("`{program}` not found: {source}")]
    NotFound {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {}: {stderr}", describe_exit(.exit_code))]
    Failed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl ToolError {
    /// Exit code of the failed process; `None` when it never ran or was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// A fully-resolved argument vector for one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    /// Run the command to completion, capturing stderr for diagnostics.
    pub fn run(&self) -> Result<ToolOutput, ToolError> {
        let started_at = Instant::now();
        let program = self.program.display().to_string();

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                warn!(
                    target = "tools",
                    op = "tools::run",
                    result = "error",
                    program = %program,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    error_code = "spawn",
                    error = %err,
                    "Failed to spawn external tool"
                );
                if err.kind() == ErrorKind::NotFound {
                    ToolError::NotFound {
                        program: program.clone(),
                        source: err,
                    }
                } else {
                    ToolError::Spawn {
                        program: program.clone(),
                        source: err,
                    }
                }
            })?;

        let elapsed = started_at.elapsed();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let exit_code = output.status.code();
            warn!(
                target = "tools",
                op = "tools::run",
                result = "error",
                program = %program,
                elapsed_ms = elapsed.as_millis() as u64,
                exit_code = exit_code.map(i64::from).unwrap_or(-1),
                stderr = %stderr,
                "External tool invocation failed"
            );
            return Err(ToolError::Failed {
                program,
                exit_code,
                stderr,
            });
        }

        debug!(
            target = "tools",
            op = "tools::run",
            result = "ok",
            program = %program,
            elapsed_ms = elapsed.as_millis() as u64,
            "External tool finished"
        );

        Ok(ToolOutput { elapsed, stderr })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub elapsed: Duration,
    pub stderr: String,
}

/// Renders sample content into a vector artifact.
#[derive(Debug, Clone)]
pub struct RendererTool {
    program: PathBuf,
    args: Vec<String>,
    output_flag: String,
}

impl RendererTool {
    pub fn new(program: PathBuf, args: Vec<String>, output_flag: impl Into<String>) -> Self {
        Self {
            program,
            args,
            output_flag: output_flag.into(),
        }
    }

    /// `program args… <content> <output_flag> <vector_path>`
    pub fn command(&self, content: &str, vector_path: &Path) -> ToolCommand {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(content.into());
        args.push(self.output_flag.as_str().into());
        args.push(vector_path.into());
        ToolCommand {
            program: self.program.clone(),
            args,
        }
    }
}

impl From<&RendererSettings> for RendererTool {
    fn from(settings: &RendererSettings) -> Self {
        Self::new(
            settings.program.clone(),
            settings.args.clone(),
            settings.output_flag.clone(),
        )
    }
}

/// How the converter's export flag carries the destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    /// `--flag=<path>`
    #[default]
    Joined,
    /// `--flag <path>`
    Separate,
}

/// Rasterizes a vector artifact.
#[derive(Debug, Clone)]
pub struct ConverterTool {
    program: PathBuf,
    args: Vec<String>,
    export_flag: String,
    export_style: ExportStyle,
}

impl ConverterTool {
    pub fn new(
        program: PathBuf,
        args: Vec<String>,
        export_flag: impl Into<String>,
        export_style: ExportStyle,
    ) -> Self {
        Self {
            program,
            args,
            export_flag: export_flag.into(),
            export_style,
        }
    }

    /// `program args… <export_flag>=<raster_path> <vector_path>` (or the separate form).
    pub fn command(&self, vector_path: &Path, raster_path: &Path) -> ToolCommand {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        match self.export_style {
            ExportStyle::Joined => {
                let mut joined = OsString::from(format!("{}=", self.export_flag));
                joined.push(raster_path);
                args.push(joined);
            }
            ExportStyle::Separate => {
                args.push(self.export_flag.as_str().into());
                args.push(raster_path.into());
            }
        }
        args.push(vector_path.into());
        ToolCommand {
            program: self.program.clone(),
            args,
        }
    }
}

impl From<&ConverterSettings> for ConverterTool {
    fn from(settings: &ConverterSettings) -> Self {
        Self::new(
            settings.program.clone(),
            settings.args.clone(),
            settings.export_flag.clone(),
            settings.export_style,
        )
    }
}
