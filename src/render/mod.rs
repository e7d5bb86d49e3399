//! Chart rendering: colors, per-column styles, fonts and the plotters renderer

pub mod chart;
pub mod fonts;
pub mod palettes;
pub mod styles;
pub mod theme;

pub use chart::{column_output_path, eligible_columns, ChartRenderer, ChartSeries};
pub use styles::{ColumnStyle, ColumnStyleRegistry, COLUMN_STYLES};
pub use theme::{StyleConfig, Theme};
