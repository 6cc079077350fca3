use std::process;

use samplegen::{
    batch::BatchRenderer,
    config::{self, Command, RenderArgs, Settings},
    error::AppError,
    samples, telemetry,
};
use tracing::{dispatcher, error};

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    // Logging may be unset or filtered; the failure itself is always printed.
    eprintln!("samplegen: {error}");

    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
    }
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or_else(|| Command::Render(RenderArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        Command::Render(args) => run_render(&settings, args.dry_run),
        Command::List(_) => run_list(&settings),
    }
}

fn run_render(settings: &Settings, dry_run: bool) -> Result<(), AppError> {
    let samples = samples::resolve(settings.samples.file.as_deref())?;
    let output_dir = settings.output.directory.as_path();
    let mut batch = BatchRenderer::from_settings(settings);

    if dry_run {
        for planned in batch.plan(&samples, output_dir) {
            println!("{}", planned.render);
            println!("{}", planned.convert);
        }
        return Ok(());
    }

    let report = batch.run_batch(&samples, output_dir)?;
    println!(
        "Render generation complete. {} samples written to {} in {} ms.",
        report.artifacts.len(),
        output_dir.display(),
        report.elapsed.as_millis()
    );
    Ok(())
}

fn run_list(settings: &Settings) -> Result<(), AppError> {
    let samples = samples::resolve(settings.samples.file.as_deref())?;
    let out = serde_json::to_string_pretty(&samples)
        .map_err(|err| AppError::output(format!("failed to render sample table: {err}")))?;
    println!("{out}");
    Ok(())
}
