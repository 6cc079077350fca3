use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the samplegen binary.
#[derive(Debug, Parser)]
#[command(
    name = "samplegen",
    version,
    about = "Render formula samples to SVG and PNG via external tools"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SAMPLEGEN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render every sample: vector artifact first, then its raster conversion.
    Render(RenderArgs),
    /// Print the resolved sample table as JSON.
    List(ListArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: RenderOverrides,

    /// Print the planned tool invocations without running them.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub samples: SamplesOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SamplesOverride {
    /// TOML file with `[[samples]]` entries; the built-in table is used otherwise.
    #[arg(long = "samples", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub samples_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    #[command(flatten)]
    pub samples: SamplesOverride,

    /// Override the directory artifacts are written to.
    #[arg(long = "output-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Override the renderer executable.
    #[arg(long = "renderer", value_name = "PATH")]
    pub renderer_program: Option<PathBuf>,

    /// Override the converter executable.
    #[arg(long = "converter", value_name = "PATH")]
    pub converter_program: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}
