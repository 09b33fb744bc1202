use crate::config::{OutputFormat, load_config};
use crate::error::DiagramError;
use crate::ir::DEFAULT_TITLE;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::load_document;
use crate::render::{default_output_path, render, write_output};
use crate::text_metrics::SystemFontMetrics;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_MISSING_INPUT: i32 = 2;
pub const EXIT_WRITE_FAILED: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "bdr", version, about = "Branching strategy diagram builder")]
pub struct Args {
    /// Show debug output
    #[arg(short = 'D', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Builds the branching diagram.
    #[command(visible_alias = "b")]
    Build(BuildArgs),
    /// Shows information.
    #[command(visible_alias = "i")]
    Info,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// The branching diagram source file (YAML, JSON or JSON5)
    pub file: PathBuf,

    /// Persists the branching diagram to this file
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Output format; inferred from the output file extension when omitted
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Config JSON file (theme name, themeVariables, layout overrides)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Canvas width; overrides the document and the config file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Diagram title; overrides the document
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Also write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

pub fn run() -> i32 {
    run_from(std::env::args_os())
}

/// Parses `args`, executes the command and returns the process exit code.
pub fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    init_tracing(args.debug);

    let result = match args.command {
        Command::Build(build_args) => build(&build_args),
        Command::Info => {
            info();
            Ok(EXIT_OK)
        }
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            exit_code(&err)
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Maps a failure to its exit code: diagram errors carry their own.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<DiagramError>()
        .map(DiagramError::return_code)
        .unwrap_or(EXIT_FAILURE)
}

fn info() {
    println!("Name:    {DEFAULT_TITLE}");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}

fn build(args: &BuildArgs) -> Result<i32> {
    if !args.file.is_file() {
        tracing::warn!(file = %args.file.display(), "input file not found");
        return Ok(EXIT_MISSING_INPUT);
    }

    let config = load_config(args.config.as_deref())?;
    let mut diagram = load_document(&args.file, &config.theme)?;
    if let Some(title) = &args.title {
        diagram.title = title.clone();
    }
    diagram.width = args.width.or(diagram.width).or(Some(config.render.width));

    let format = args
        .format
        .or_else(|| args.output_file.as_deref().and_then(format_from_extension))
        .unwrap_or(config.render.format);
    let output = args
        .output_file
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file, format));

    let metrics = SystemFontMetrics::new(config.theme.font_family.clone());
    let layout = compute_layout(&mut diagram, &config.theme, &config.layout, &metrics)?;
    if let Some(dump_path) = &args.dump_layout {
        write_layout_dump(dump_path, &layout, &diagram)?;
    }

    let bytes = render(&layout, format)?;
    if let Err(err) = write_output(&output, &bytes) {
        tracing::warn!(output = %output.display(), "{err:#}");
        return Ok(EXIT_WRITE_FAILED);
    }
    tracing::info!(
        output = %output.display(),
        format = format.extension(),
        "branching diagram successfully written"
    );
    Ok(EXIT_OK)
}

fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "svg" => Some(OutputFormat::Svg),
        "png" => Some(OutputFormat::Png),
        _ => None,
    }
}
