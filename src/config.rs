//! Run configuration from plot_defaults.json and `--set` overrides
//!
//! All default values come from plot_defaults.json via the property registry;
//! CLI flags that name a value directly (e.g. `--divisor`) take precedence.

use crate::error::{ChillError, Result};
use crate::properties::PropertyReader;
use crate::render::theme::StyleConfig;

/// Figure size in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    /// Pixel dimensions at `dpi`
    pub fn to_pixels(self, dpi: f64) -> (u32, u32) {
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Field delimiter of the intermediate table
    pub delimiter: u8,

    /// Frames per time unit in fixed-divisor mode
    pub time_divisor: f64,

    /// Column whose maximum defines time zero in fixed-divisor mode
    pub reference_column: String,

    /// X axis label
    pub time_label: String,

    /// Output resolution
    pub dpi: f64,

    /// 2x2 grid figure
    pub grid_size: FigureSize,

    /// One figure per column
    pub single_size: FigureSize,

    /// Fonts, ticks, line widths
    pub style: StyleConfig,
}

impl PlotConfig {
    /// Create config from properties
    pub fn from_properties(props: &PropertyReader) -> Result<Self> {
        let delimiter = parse_delimiter(&props.get_string("csv.delimiter"))?;

        let grid_size = FigureSize {
            width_in: props.get_f64_in_range("figure.grid.width", 1.0, 100.0),
            height_in: props.get_f64_in_range("figure.grid.height", 1.0, 100.0),
        };
        let single_size = FigureSize {
            width_in: props.get_f64_in_range("figure.single.width", 1.0, 100.0),
            height_in: props.get_f64_in_range("figure.single.height", 1.0, 100.0),
        };

        Ok(Self {
            delimiter,
            time_divisor: props.get_f64("time.divisor"),
            reference_column: props.get_string("time.reference.column"),
            time_label: props.get_string("time.label"),
            dpi: props.get_f64_in_range("figure.dpi", 10.0, 1200.0),
            grid_size,
            single_size,
            style: StyleConfig::from_properties(props),
        })
    }

    /// Grid figure in pixels
    pub fn grid_pixels(&self) -> (u32, u32) {
        self.grid_size.to_pixels(self.dpi)
    }

    /// Per-column figure in pixels
    pub fn single_pixels(&self) -> (u32, u32) {
        self.single_size.to_pixels(self.dpi)
    }
}

/// Parse a delimiter property: one ASCII character, or `tab`
pub fn parse_delimiter(value: &str) -> Result<u8> {
    if value.eq_ignore_ascii_case("tab") || value == "\\t" {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' => Ok(*b),
        _ => Err(ChillError::InvalidProperty(format!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        ))),
    }
}
