use std::{fs, path::Path};

use tempfile::TempDir;

use super::*;

#[test]
fn defaults_match_the_stock_toolchain() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.output.directory, Path::new("samples"));
    assert_eq!(settings.output.vector_extension, "svg");
    assert_eq!(settings.output.raster_extension, "png");
    assert_eq!(settings.renderer.program, Path::new("cargo"));
    assert_eq!(settings.renderer.args.last().map(String::as_str), Some("--"));
    assert_eq!(settings.renderer.output_flag, "-o");
    assert_eq!(settings.converter.program, Path::new("inkscape"));
    assert_eq!(settings.converter.export_flag, "--export-png");
    assert_eq!(settings.converter.export_style, ExportStyle::Joined);
    assert!(settings.converter.args.is_empty());
    assert!(settings.samples.file.is_none());
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.output.directory = Some(PathBuf::from("from-file"));
    raw.logging.level = Some("info".to_string());

    let overrides = RenderOverrides {
        output_dir: Some(PathBuf::from("from-cli")),
        renderer_program: Some(PathBuf::from("/opt/render")),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.output.directory, Path::new("from-cli"));
    assert_eq!(settings.renderer.program, Path::new("/opt/render"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = RenderOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn rejects_unknown_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn rejects_empty_programs() {
    let mut raw = RawSettings::default();
    raw.converter.program = Some(PathBuf::new());

    let err = Settings::from_raw(raw).expect_err("empty converter");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "converter.program",
            ..
        }
    ));
}

#[test]
fn extensions_are_normalized_and_validated() {
    let mut raw = RawSettings::default();
    raw.output.vector_extension = Some(".svgz".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.output.vector_extension, "svgz");

    let mut raw = RawSettings::default();
    raw.output.raster_extension = Some("png/../x".to_string());
    let err = Settings::from_raw(raw).expect_err("separator in extension");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "output.raster_extension",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.output.raster_extension = Some("svg".to_string());
    let err = Settings::from_raw(raw).expect_err("colliding extensions");
    assert!(matches!(err, LoadError::Invalid { .. }));
}

#[test]
fn rejects_empty_output_directory_and_extensions() {
    let mut raw = RawSettings::default();
    raw.output.directory = Some(PathBuf::new());
    let err = Settings::from_raw(raw).expect_err("empty directory");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "output.directory",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.output.vector_extension = Some(" . ".to_string());
    let err = Settings::from_raw(raw).expect_err("blank extension");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "output.vector_extension",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.output.raster_extension = Some(String::new());
    let err = Settings::from_raw(raw).expect_err("empty extension");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "output.raster_extension",
            ..
        }
    ));
}

#[test]
fn config_file_supplies_tool_settings() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("samplegen.toml");
    fs::write(
        &path,
        r#"
[output]
directory = "renders"

[renderer]
program = "tex2svg"
args = ["--display"]
output_flag = "--out"

[converter]
program = "rsvg-convert"
args = ["--format", "png"]
export_flag = "-o"
export_style = "separate"
"#,
    )
    .expect("write config");

    let cli = CliArgs::parse_from([
        "samplegen",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "render",
        "--output-dir",
        "elsewhere",
    ]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(settings.output.directory, Path::new("elsewhere"));
    assert_eq!(settings.renderer.program, Path::new("tex2svg"));
    assert_eq!(settings.renderer.args, vec!["--display"]);
    assert_eq!(settings.renderer.output_flag, "--out");
    assert_eq!(settings.converter.program, Path::new("rsvg-convert"));
    assert_eq!(settings.converter.args, vec!["--format", "png"]);
    assert_eq!(settings.converter.export_style, ExportStyle::Separate);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.toml");
    let cli = CliArgs::parse_from([
        "samplegen",
        "--config-file",
        path.to_str().expect("utf-8 path"),
    ]);

    let err = load(&cli).expect_err("required file missing");
    assert!(matches!(err, LoadError::Build(_)));
}

#[test]
fn no_subcommand_parses() {
    let args = CliArgs::parse_from(["samplegen"]);
    assert!(args.command.is_none());
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "samplegen",
        "render",
        "--output-dir",
        "out",
        "--samples",
        "table.toml",
        "--renderer",
        "./render.sh",
        "--converter",
        "./convert.sh",
        "--log-json",
        "yes",
        "--dry-run",
    ]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert!(render.dry_run);
            assert_eq!(render.overrides.output_dir.as_deref(), Some(Path::new("out")));
            assert_eq!(
                render.overrides.samples.samples_file.as_deref(),
                Some(Path::new("table.toml"))
            );
            assert_eq!(
                render.overrides.renderer_program.as_deref(),
                Some(Path::new("./render.sh"))
            );
            assert_eq!(
                render.overrides.converter_program.as_deref(),
                Some(Path::new("./convert.sh"))
            );
            assert_eq!(render.overrides.log_json, Some(true));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_list_arguments() {
    let args = CliArgs::parse_from(["samplegen", "list", "--samples", "table.toml"]);

    match args.command.expect("list command") {
        Command::List(list) => {
            assert_eq!(
                list.samples.samples_file.as_deref(),
                Some(Path::new("table.toml"))
            );
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}
