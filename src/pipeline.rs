//! Convert and plot pipelines shared by the CLI subcommands
//!
//! - `convert`: frame directory -> delimited table
//! - `plot_grid`: table -> time from a fixed divisor, re-zeroed -> 2x2 grid image
//! - `plot_columns`: table -> time from a sampling interval -> one image per column
//!
//! Every stage runs to completion before the next starts, and the first error
//! aborts the run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::config::PlotConfig;
use crate::error::Result;
use crate::frames::FrameTable;
use crate::render::{
    column_output_path, eligible_columns, ChartRenderer, ChartSeries, COLUMN_STYLES,
};
use crate::time_axis::{normalize, TimeMode};

/// Assemble the frame files of `dir` into a table and write it to `output`
///
/// Parsing finishes before the output is created, so a malformed frame leaves
/// no file behind.
pub fn convert(dir: &Path, output: &Path, delimiter: u8) -> Result<FrameTable> {
    let t0 = Instant::now();

    info!("[1/2] Reading frames from {}", dir.display());
    let table = FrameTable::from_directory(dir)?;
    info!(
        "  {} rows x {} columns",
        table.len(),
        table.columns().len()
    );

    info!("[2/2] Writing table to {}", output.display());
    table.write_csv(output, delimiter)?;

    debug!("convert finished in {:?}", t0.elapsed());
    Ok(table)
}

/// Render the 2x2 grid of the configured panel columns
///
/// Time is `Frame / divisor`, shifted so the first maximum of the reference
/// column is zero; earlier rows are dropped.
pub fn plot_grid(input: &Path, output: &Path, config: &PlotConfig) -> Result<PathBuf> {
    let t0 = Instant::now();

    info!("[1/3] Loading table from {}", input.display());
    let df = load_table(input, config)?;

    info!("[2/3] Normalizing time");
    let mode = TimeMode::FixedDivisor {
        divisor: config.time_divisor,
        reference_column: config.reference_column.clone(),
    };
    let df = normalize(df, &mode)?;

    info!("[3/3] Rendering grid");
    let panels = COLUMN_STYLES
        .grid_columns()
        .iter()
        .map(|column| ChartSeries::from_table(&df, column, &COLUMN_STYLES))
        .collect::<Result<Vec<_>>>()?;

    let renderer = renderer_for(config);
    let path = renderer.render_grid(&panels, output, config.grid_pixels())?;

    debug!("plot_grid finished in {:?}", t0.elapsed());
    Ok(path)
}

/// Render every eligible column to `<prefix>_<column>.png`
///
/// Time is `Frame * interval`; no rows are dropped.
pub fn plot_columns(
    input: &Path,
    prefix: &str,
    interval: f64,
    config: &PlotConfig,
) -> Result<Vec<PathBuf>> {
    let t0 = Instant::now();

    info!("[1/3] Loading table from {}", input.display());
    let df = load_table(input, config)?;

    info!("[2/3] Normalizing time (interval {})", interval);
    let df = normalize(df, &TimeMode::Interval(interval))?;

    let columns = eligible_columns(&df);
    info!("[3/3] Rendering {} charts", columns.len());

    let renderer = renderer_for(config);
    let mut written = Vec::with_capacity(columns.len());
    for column in &columns {
        let series = ChartSeries::from_table(&df, column, &COLUMN_STYLES)?;
        let output = column_output_path(prefix, column);
        written.push(renderer.render_single(&series, &output, config.single_pixels())?);
    }

    debug!("plot_columns finished in {:?}", t0.elapsed());
    Ok(written)
}

/// Read the intermediate table written by `convert`
pub fn load_table(input: &Path, config: &PlotConfig) -> Result<DataFrame> {
    let table = FrameTable::read_csv(input, config.delimiter)?;
    debug!("Loaded {} rows from {}", table.len(), input.display());
    table.to_dataframe()
}

fn renderer_for(config: &PlotConfig) -> ChartRenderer {
    ChartRenderer::new(config.style.resolve(config.dpi), config.time_label.clone())
}
