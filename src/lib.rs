//! CHILL+ frame conversion and plotting library
//!
//! Turns a directory of per-frame CHILL+ analysis files into one delimited
//! table, derives a time axis from the frame index and renders count columns
//! as PNG line charts.
//!
//! Module organization:
//! - `frames`: frame file parsing and table assembly
//! - `time_axis`: time column derivation and re-zeroing
//! - `render`: chart styles, fonts and plotters rendering
//! - `properties` / `config`: defaults from plot_defaults.json plus overrides
//! - `pipeline`: the convert and plot entry points used by the CLI

pub mod config;
pub mod error;
pub mod frames;
pub mod pipeline;
pub mod properties;
pub mod render;
pub mod time_axis;

pub use config::PlotConfig;
pub use error::{ChillError, Result};
