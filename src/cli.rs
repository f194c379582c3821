use anyhow::{Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;

/// Base font size in points when none is given.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

pub struct Config {
    pub project_root: PathBuf,
    pub output_path: PathBuf,
    pub ignore_file: Option<PathBuf>,
    /// Built-in font name, font file path, or font file name to search for.
    pub font: Option<String>,
    pub font_size: f32,
    pub verbosity: u8,
}

impl Config {
    /// Config with defaults for everything but the two required paths.
    pub fn new(project_root: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            output_path: output_path.into(),
            ignore_file: None,
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            verbosity: 0,
        }
    }
}

pub fn build_cli() -> Command {
    Command::new("code2pdf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a project's directory tree and source files into a PDF")
        .arg(
            Arg::new("source")
                .value_name("SOURCE_DIR")
                .help("Project directory to render")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT_PDF")
                .help("Path of the PDF to write")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore-file")
                .value_name("FILE")
                .help("Ignore file to use instead of SOURCE_DIR/.ignore")
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("font")
                .short('f')
                .long("font")
                .value_name("FONT")
                .help("Built-in font name (e.g. Courier), font file, or font name to look up")
                .num_args(1),
        )
        .arg(
            Arg::new("font_size")
                .short('s')
                .long("font-size")
                .value_name("POINTS")
                .help("Base font size")
                .num_args(1)
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
}

pub fn parse_args() -> Result<Config> {
    config_from_matches(&build_cli().get_matches())
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let (Some(project_root), Some(output_path)) = (
        matches.get_one::<PathBuf>("source"),
        matches.get_one::<PathBuf>("output"),
    ) else {
        bail!("Both SOURCE_DIR and OUTPUT_PDF are required");
    };

    let font_size = matches
        .get_one::<f32>("font_size")
        .copied()
        .unwrap_or(DEFAULT_FONT_SIZE);
    if !(font_size.is_finite() && font_size > 0.0) {
        bail!("Font size must be a positive number, got {font_size}");
    }

    Ok(Config {
        project_root: project_root.clone(),
        output_path: output_path.clone(),
        ignore_file: matches.get_one::<PathBuf>("ignore").cloned(),
        font: matches.get_one::<String>("font").cloned(),
        font_size,
        verbosity: matches.get_count("verbose"),
    })
}
