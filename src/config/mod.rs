//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::tools::ExportStyle;

mod cli;

pub use cli::{CliArgs, Command, ListArgs, RenderArgs, RenderOverrides, SamplesOverride};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "samplegen";
const DEFAULT_OUTPUT_DIR: &str = "samples";
const DEFAULT_VECTOR_EXTENSION: &str = "svg";
const DEFAULT_RASTER_EXTENSION: &str = "png";
const DEFAULT_RENDERER_PROGRAM: &str = "cargo";
const DEFAULT_RENDERER_ARGS: &[&str] = &[
    "run",
    "--example",
    "svg-basic",
    "--features",
    "cairo-renderer ttfparser-fontparser",
    "--",
];
const DEFAULT_RENDERER_OUTPUT_FLAG: &str = "-o";
const DEFAULT_CONVERTER_PROGRAM: &str = "inkscape";
const DEFAULT_CONVERTER_EXPORT_FLAG: &str = "--export-png";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub output: OutputSettings,
    pub renderer: RendererSettings,
    pub converter: ConverterSettings,
    pub samples: SamplesSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub vector_extension: String,
    pub raster_extension: String,
}

#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub output_flag: String,
}

#[derive(Debug, Clone)]
pub struct ConverterSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub export_flag: String,
    pub export_style: ExportStyle,
}

#[derive(Debug, Clone)]
pub struct SamplesSettings {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    // List values from the environment split on spaces, so one element cannot contain a space.
    builder = builder.add_source(
        Environment::with_prefix("SAMPLEGEN")
            .separator("__")
            .list_separator(" ")
            .with_list_parse_key("renderer.args")
            .with_list_parse_key("converter.args")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Render(args)) => raw.apply_render_overrides(&args.overrides),
        Some(Command::List(args)) => raw.apply_samples_override(&args.samples),
        None => raw.apply_render_overrides(&RenderOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    output: RawOutputSettings,
    renderer: RawRendererSettings,
    converter: RawConverterSettings,
    samples: RawSamplesSettings,
}

impl RawSettings {
    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(dir) = overrides.output_dir.as_ref() {
            self.output.directory = Some(dir.clone());
        }
        if let Some(program) = overrides.renderer_program.as_ref() {
            self.renderer.program = Some(program.clone());
        }
        if let Some(program) = overrides.converter_program.as_ref() {
            self.converter.program = Some(program.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        self.apply_samples_override(&overrides.samples);
    }

    fn apply_samples_override(&mut self, overrides: &SamplesOverride) {
        if let Some(path) = overrides.samples_file.as_ref() {
            self.samples.file = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            output,
            renderer,
            converter,
            samples,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            output: build_output_settings(output)?,
            renderer: build_renderer_settings(renderer)?,
            converter: build_converter_settings(converter)?,
            samples: build_samples_settings(samples),
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_output_settings(output: RawOutputSettings) -> Result<OutputSettings, LoadError> {
    let directory = output
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "output.directory",
            "path must not be empty",
        ));
    }

    let vector_extension = extension(
        output.vector_extension,
        DEFAULT_VECTOR_EXTENSION,
        "output.vector_extension",
    )?;
    let raster_extension = extension(
        output.raster_extension,
        DEFAULT_RASTER_EXTENSION,
        "output.raster_extension",
    )?;
    if vector_extension == raster_extension {
        return Err(LoadError::invalid(
            "output.raster_extension",
            "must differ from output.vector_extension",
        ));
    }

    Ok(OutputSettings {
        directory,
        vector_extension,
        raster_extension,
    })
}

fn extension(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    let value = value.unwrap_or_else(|| default.to_string());
    let trimmed = value.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(LoadError::invalid(key, "extension must not be empty"));
    }
    if trimmed.contains('/') || trimmed.contains(std::path::MAIN_SEPARATOR) {
        return Err(LoadError::invalid(
            key,
            "extension must not contain a path separator",
        ));
    }
    Ok(trimmed.to_string())
}

fn build_renderer_settings(renderer: RawRendererSettings) -> Result<RendererSettings, LoadError> {
    let program = renderer
        .program
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RENDERER_PROGRAM));
    if program.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "renderer.program",
            "path must not be empty",
        ));
    }

    let args = renderer
        .args
        .unwrap_or_else(|| DEFAULT_RENDERER_ARGS.iter().map(ToString::to_string).collect());

    let output_flag = renderer
        .output_flag
        .unwrap_or_else(|| DEFAULT_RENDERER_OUTPUT_FLAG.to_string());
    if output_flag.trim().is_empty() {
        return Err(LoadError::invalid(
            "renderer.output_flag",
            "flag must not be empty",
        ));
    }

    Ok(RendererSettings {
        program,
        args,
        output_flag,
    })
}

fn build_converter_settings(
    converter: RawConverterSettings,
) -> Result<ConverterSettings, LoadError> {
    let program = converter
        .program
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONVERTER_PROGRAM));
    if program.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "converter.program",
            "path must not be empty",
        ));
    }

    let export_flag = converter
        .export_flag
        .unwrap_or_else(|| DEFAULT_CONVERTER_EXPORT_FLAG.to_string());
    if export_flag.trim().is_empty() {
        return Err(LoadError::invalid(
            "converter.export_flag",
            "flag must not be empty",
        ));
    }

    Ok(ConverterSettings {
        program,
        args: converter.args.unwrap_or_default(),
        export_flag,
        export_style: converter.export_style.unwrap_or_default(),
    })
}

fn build_samples_settings(samples: RawSamplesSettings) -> SamplesSettings {
    let file = samples
        .file
        .filter(|path| !path.as_os_str().is_empty());
    SamplesSettings { file }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOutputSettings {
    directory: Option<PathBuf>,
    vector_extension: Option<String>,
    raster_extension: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRendererSettings {
    program: Option<PathBuf>,
    args: Option<Vec<String>>,
    output_flag: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConverterSettings {
    program: Option<PathBuf>,
    args: Option<Vec<String>>,
    export_flag: Option<String>,
    export_style: Option<ExportStyle>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSamplesSettings {
    file: Option<PathBuf>,
}

#[cfg(test)]
mod tests;
