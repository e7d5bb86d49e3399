use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while collecting frame files, normalizing time or rendering charts
#[derive(Debug, Error)]
pub enum ChillError {
    /// Input directory does not exist or is not a directory
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A frame file or table could not be read
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data line could not be turned into integer values
    #[error("malformed record in {} (line {line}): {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Sampling interval or divisor is not a positive finite number
    #[error("invalid sampling interval: {0} (must be > 0)")]
    InvalidInterval(f64),

    /// Column used as a reference or panel is absent or has no values
    #[error("no data for column '{0}'")]
    NoDataForColumn(String),

    /// None of the configured font families could be loaded.
    /// Only ever logged; rendering continues with a substitute.
    #[error("none of the font families {0:?} are available, using the system default")]
    FontFallbackExhausted(Vec<String>),

    /// A `name=value` override could not be parsed
    #[error("invalid property override: {0}")]
    InvalidProperty(String),

    /// Plotting backend error
    #[error("render error: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Type alias for Results using ChillError
pub type Result<T> = std::result::Result<T, ChillError>;
