//! Time column derivation
//!
//! Two mutually exclusive modes:
//! - fixed divisor: `time = Frame / D`, then re-zeroed at the first row where the
//!   reference column reaches its maximum; rows with negative time are dropped
//! - interval: `time = Frame * I`, all rows kept

use polars::prelude::*;
use tracing::info;

use crate::error::{ChillError, Result};
use crate::frames::FRAME_COLUMN;

/// Name of the derived time column
pub const TIME_COLUMN: &str = "time";

/// How the time axis is derived from the frame index
#[derive(Debug, Clone, PartialEq)]
pub enum TimeMode {
    /// `time = Frame / divisor`, re-zeroed at the maximum of `reference_column`
    FixedDivisor {
        divisor: f64,
        reference_column: String,
    },
    /// `time = Frame * interval`
    Interval(f64),
}

/// Add the time column according to `mode`
pub fn normalize(mut df: DataFrame, mode: &TimeMode) -> Result<DataFrame> {
    match mode {
        TimeMode::FixedDivisor {
            divisor,
            reference_column,
        } => {
            add_time_from_divisor(&mut df, *divisor)?;
            rezero_at_max(&df, reference_column)
        }
        TimeMode::Interval(interval) => {
            add_time_from_interval(&mut df, *interval)?;
            Ok(df)
        }
    }
}

/// `time = Frame / divisor`
pub fn add_time_from_divisor(df: &mut DataFrame, divisor: f64) -> Result<()> {
    check_positive(divisor)?;
    let times: Vec<f64> = column_values(df, FRAME_COLUMN)?
        .into_iter()
        .map(|frame| frame / divisor)
        .collect();
    df.with_column(Series::new(TIME_COLUMN.into(), times))?;
    Ok(())
}

/// `time = Frame * interval`
pub fn add_time_from_interval(df: &mut DataFrame, interval: f64) -> Result<()> {
    check_positive(interval)?;
    let times: Vec<f64> = column_values(df, FRAME_COLUMN)?
        .into_iter()
        .map(|frame| frame * interval)
        .collect();
    df.with_column(Series::new(TIME_COLUMN.into(), times))?;
    Ok(())
}

/// Shift time so the row where `column` is maximal sits at zero, then drop
/// rows with negative time. Ties resolve to the first row in table order.
pub fn rezero_at_max(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let reference = column_values(df, column)?;
    let row = first_max_index(&reference)
        .ok_or_else(|| ChillError::NoDataForColumn(column.to_string()))?;

    let times = column_values(df, TIME_COLUMN)?;
    let zero = times[row];
    info!(
        "Time zero at row {} ({} = {}, time = {})",
        row, column, reference[row], zero
    );

    let shifted: Vec<f64> = times.iter().map(|t| t - zero).collect();
    let keep: Vec<bool> = shifted.iter().map(|t| *t >= 0.0).collect();

    let mut out = df.clone();
    out.with_column(Series::new(TIME_COLUMN.into(), shifted))?;
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(out.filter(&mask)?)
}

/// Index of the first maximum, ignoring NaN. `None` when there is no value.
pub fn first_max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.iter().copied().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Values of a numeric column as f64, nulls read as NaN. Absent columns are
/// `NoDataForColumn`.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ChillError::NoDataForColumn(name.to_string()))?;
    let column = column.cast(&DataType::Float64)?;
    let values = column
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

fn check_positive(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ChillError::InvalidInterval(value))
    }
}
