//! Frame table assembly and the intermediate delimited file
//!
//! Rows are `[frame_number, values...]` in ascending frame order; columns are
//! `["Frame", header...]` with the header taken from the first frame file.
//! A `Frame` field inside the files is dropped in favour of the file name.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use super::parser::{list_frame_files, parse_frame_file, FrameRecord};
use crate::error::{ChillError, Result};
use crate::time_axis::TIME_COLUMN;

/// Name of the frame index column
pub const FRAME_COLUMN: &str = "Frame";

/// All frames of a run as integer rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    columns: Vec<String>,
    rows: Vec<Vec<i64>>,
}

impl FrameTable {
    /// Create an empty table for the given frame-file header
    pub fn new(header: Vec<String>) -> Self {
        let mut columns = Vec::with_capacity(header.len() + 1);
        columns.push(FRAME_COLUMN.to_string());
        columns.extend(header);
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a frame record as `[frame_number, values...]`
    pub fn push_record(&mut self, record: FrameRecord) -> Result<()> {
        let malformed = |reason: String| ChillError::MalformedRecord {
            path: record.source.clone(),
            line: record.line,
            reason,
        };
        if record.values.len() + 1 != self.columns.len() {
            return Err(malformed(format!(
                "frame has {} values but the table has {} data columns",
                record.values.len(),
                self.columns.len() - 1
            )));
        }
        let frame = i64::try_from(record.frame_number).map_err(|_| {
            malformed(format!("frame number {} is too large", record.frame_number))
        })?;

        let mut row = Vec::with_capacity(self.columns.len());
        row.push(frame);
        row.extend(record.values);
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collect every frame file of `dir` into a table.
    ///
    /// Files are visited in ascending frame order, so rows come out sorted.
    /// Frames without a data line are skipped; the first error aborts.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let files = list_frame_files(dir)?;
        info!("Found {} frame files in {}", files.len(), dir.display());

        // Header comes from the first frame file, with or without data
        let header = match files.first() {
            Some(first) => {
                let mut header = header_of(&first.path)?;
                if let Some(idx) = header.iter().position(|name| name == FRAME_COLUMN) {
                    debug!("Dropping the frame files' own {} column", FRAME_COLUMN);
                    header.remove(idx);
                }
                check_header(&header, &first.path)?;
                header
            }
            None => Vec::new(),
        };
        let mut table = FrameTable::new(header);
        let mut skipped = 0usize;

        for file in &files {
            match parse_frame_file(file)? {
                Some(record) => table.push_record(without_frame_field(record))?,
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("{} frame(s) had no data line", skipped);
        }

        Ok(table)
    }

    /// Write the table as delimited text with a header line
    pub fn write_csv(&self, path: &Path, delimiter: u8) -> Result<()> {
        let file = File::create(path).map_err(|source| ChillError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(BufWriter::new(file));

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush().map_err(|source| ChillError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Read a table previously written by [`FrameTable::write_csv`]
    pub fn read_csv(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|source| ChillError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(file);

        let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = idx + 2;
            let row = record
                .iter()
                .map(|field| {
                    field
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| ChillError::MalformedRecord {
                            path: path.to_path_buf(),
                            line,
                            reason: format!("'{}' is not an integer", field),
                        })
                })
                .collect::<Result<Vec<i64>>>()?;
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self { columns, rows })
    }

    /// Convert to a Polars DataFrame with one Int64 column per table column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns_vec = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<i64> = self.rows.iter().map(|row| row[idx]).collect();
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect::<Vec<_>>();

        Ok(DataFrame::new(columns_vec)?)
    }
}

/// The table's `Frame` comes from the file name, so a `Frame` field in the
/// file itself is removed from header and values alike
fn without_frame_field(mut record: FrameRecord) -> FrameRecord {
    if let Some(idx) = record.header.iter().position(|name| name == FRAME_COLUMN) {
        record.header.remove(idx);
        if idx < record.values.len() {
            record.values.remove(idx);
        }
    }
    record
}

/// Column names must be unique and must not shadow `Frame` or `time`
fn check_header(header: &[String], path: &Path) -> Result<()> {
    let mut seen = HashSet::new();
    for name in header {
        let reason = if name == FRAME_COLUMN || name == TIME_COLUMN {
            format!("column name '{}' is reserved", name)
        } else if !seen.insert(name.as_str()) {
            format!("column name '{}' appears more than once", name)
        } else {
            continue;
        };
        return Err(ChillError::MalformedRecord {
            path: path.to_path_buf(),
            line: 1,
            reason,
        });
    }
    Ok(())
}

fn header_of(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| ChillError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .next()
        .map(super::parser::parse_header)
        .unwrap_or_default())
}
