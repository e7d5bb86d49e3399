//! chillplus_plot - command line entry point
//!
//! Subcommands:
//! - `convert`: directory of `<frame>.txt` files -> CSV table
//! - `grid`: CSV table -> 2x2 grid of the main CHILL+ counts
//! - `columns`: CSV table -> one chart per column

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chillplus_plot::config::{parse_delimiter, PlotConfig};
use chillplus_plot::pipeline;
use chillplus_plot::properties::PropertyReader;

#[derive(Parser, Debug)]
#[command(author, version, about = "CHILL+ frame table conversion and plotting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Override a plot property, e.g. `--set figure.dpi=150` (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", global = true)]
    overrides: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect per-frame text files into one delimited table
    Convert(ConvertArgs),
    /// Plot the four main counts in a 2x2 grid, time re-zeroed at peak hydrate
    Grid(GridArgs),
    /// Plot every column against time, one image per column
    Columns(ColumnsArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Directory of `<frame>.txt` files
    #[arg(short, long, default_value = "CHILL+", value_hint = ValueHint::DirPath)]
    directory: PathBuf,

    /// Output table path
    #[arg(short, long, default_value = "CHILL+_results.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Field delimiter (single character or `tab`)
    #[arg(long)]
    delimiter: Option<String>,
}

#[derive(Parser, Debug)]
struct GridArgs {
    /// Table written by `convert`
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Frames per time unit
    #[arg(long, allow_negative_numbers = true)]
    divisor: Option<f64>,

    /// Column whose first maximum becomes time zero
    #[arg(long)]
    reference_column: Option<String>,
}

#[derive(Parser, Debug)]
struct ColumnsArgs {
    /// Table written by `convert`
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file prefix; charts are written as `<prefix>_<column>.png`
    #[arg(short, long)]
    output_prefix: String,

    /// Sampling interval: time units per frame
    #[arg(long, allow_negative_numbers = true)]
    interval: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let props = PropertyReader::from_overrides(&cli.global.overrides)
        .context("invalid --set override")?;
    let config = PlotConfig::from_properties(&props).context("invalid plot configuration")?;

    match cli.command {
        Command::Convert(args) => handle_convert(args, config),
        Command::Grid(args) => handle_grid(args, config),
        Command::Columns(args) => handle_columns(args, config),
    }
}

fn handle_convert(args: ConvertArgs, config: PlotConfig) -> Result<()> {
    let delimiter = match args.delimiter.as_deref() {
        Some(value) => parse_delimiter(value)?,
        None => config.delimiter,
    };

    let table = pipeline::convert(&args.directory, &args.output, delimiter).with_context(|| {
        format!(
            "failed to convert {} into {}",
            args.directory.display(),
            args.output.display()
        )
    })?;

    info!("Done: {} frames -> {}", table.len(), args.output.display());
    Ok(())
}

fn handle_grid(args: GridArgs, mut config: PlotConfig) -> Result<()> {
    if let Some(divisor) = args.divisor {
        config.time_divisor = divisor;
    }
    if let Some(column) = args.reference_column {
        config.reference_column = column;
    }

    let path = pipeline::plot_grid(&args.input, &args.output, &config)
        .with_context(|| format!("failed to plot grid from {}", args.input.display()))?;

    info!("Done: {}", path.display());
    Ok(())
}

fn handle_columns(args: ColumnsArgs, config: PlotConfig) -> Result<()> {
    let written = pipeline::plot_columns(&args.input, &args.output_prefix, args.interval, &config)
        .with_context(|| format!("failed to plot columns from {}", args.input.display()))?;

    info!("Done: {} charts written", written.len());
    Ok(())
}
