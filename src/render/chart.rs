//! Line charts of count columns against time
//!
//! Each chart is drawn with plotters onto a `BitMapBackend`. One color is used
//! for the line, spines, ticks, tick labels, axis labels and title of a panel.
//! Major and minor ticks are drawn by hand so their direction and length follow
//! the theme; plotters' own tick marks are switched off.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::error::{ChillError, Result};
use crate::frames::FRAME_COLUMN;
use crate::time_axis::{column_values, TIME_COLUMN};

use super::styles::{ColumnStyle, ColumnStyleRegistry};
use super::theme::{Theme, TickDirection};

pub const PNG_EXTENSION: &str = "png";

/// Rows and columns of the grid layout
pub const GRID_SHAPE: (usize, usize) = (2, 2);

/// Fraction of the value span added above and below the data
const Y_MARGIN: f64 = 0.05;

// Layout sizes in points
const CHART_MARGIN_PT: f64 = 10.0;
const BARE_LABEL_AREA_PT: f64 = 4.0;
const LEGEND_MARGIN_PT: f64 = 6.0;
const LEGEND_LINE_PT: f64 = 20.0;

/// One column's values against time, with its resolved style
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub column: String,
    pub style: ColumnStyle,
    /// (time, value) pairs with time >= 0
    pub points: Vec<(f64, f64)>,
}

impl ChartSeries {
    /// Pair `column` with the table's time column
    pub fn from_table(df: &DataFrame, column: &str, styles: &ColumnStyleRegistry) -> Result<Self> {
        let time = column_values(df, TIME_COLUMN)?;
        let values = column_values(df, column)?;

        let points = time
            .into_iter()
            .zip(values)
            .filter(|(t, v)| t.is_finite() && v.is_finite() && *t >= 0.0)
            .collect();

        Ok(Self {
            column: column.to_string(),
            style: styles.style_for(column),
            points,
        })
    }

    /// From zero to the latest time
    pub fn x_range(&self) -> Range<f64> {
        let max = self
            .points
            .iter()
            .map(|(t, _)| *t)
            .fold(f64::NEG_INFINITY, f64::max);
        if max.is_finite() && max > 0.0 {
            0.0..max
        } else {
            0.0..1.0
        }
    }

    /// Value span with a small margin, widened when flat
    pub fn y_range(&self) -> Range<f64> {
        let (lo, hi) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
                (lo.min(*v), hi.max(*v))
            });
        if !lo.is_finite() || !hi.is_finite() {
            return 0.0..1.0;
        }
        let span = hi - lo;
        if span <= f64::EPSILON * hi.abs().max(1.0) {
            return (lo - 1.0)..(hi + 1.0);
        }
        (lo - span * Y_MARGIN)..(hi + span * Y_MARGIN)
    }
}

/// Columns charted in per-column mode: everything but the frame index and time
pub fn eligible_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .filter(|name| *name != FRAME_COLUMN && *name != TIME_COLUMN)
        .map(str::to_string)
        .collect()
}

/// `<prefix>_<column>.png`, with path separators in the column name replaced
pub fn column_output_path(prefix: &str, column: &str) -> PathBuf {
    let column: String = column
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    PathBuf::from(format!("{}_{}.{}", prefix, column, PNG_EXTENSION))
}

/// Append `.png` unless the path already ends with it
pub fn png_path(path: &Path) -> PathBuf {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PNG_EXTENSION));
    if is_png {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(PNG_EXTENSION);
        debug!("Writing PNG output to {}", Path::new(&name).display());
        PathBuf::from(name)
    }
}

/// Minor tick positions between (and beyond) evenly spaced major ticks
pub fn minor_tick_positions(majors: &[f64], range: &Range<f64>, divisions: u32) -> Vec<f64> {
    if majors.len() < 2 || divisions < 2 {
        return Vec::new();
    }
    let step = (majors[1] - majors[0]) / divisions as f64;
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }

    let origin = majors[0];
    let first = ((range.start - origin) / step).ceil() as i64;
    let last = ((range.end - origin) / step).floor() as i64;
    let divisions = divisions as i64;

    (first..=last)
        .filter(|i| i.rem_euclid(divisions) != 0)
        .map(|i| origin + i as f64 * step)
        .collect()
}

/// Tick label text: integers without a fraction, otherwise trimmed decimals
pub fn format_tick(value: f64) -> String {
    // +0.0 turns -0.0 into 0.0
    let rounded = (value * 1e6).round() / 1e6 + 0.0;
    if rounded == rounded.trunc() {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Draws charts to PNG files with a fixed theme
pub struct ChartRenderer {
    theme: Theme,
    time_label: String,
}

impl ChartRenderer {
    pub fn new(theme: Theme, time_label: impl Into<String>) -> Self {
        Self {
            theme,
            time_label: time_label.into(),
        }
    }

    /// Draw up to four panels in a 2x2 grid, row-major, into one image
    pub fn render_grid(
        &self,
        panels: &[ChartSeries],
        output: &Path,
        size: (u32, u32),
    ) -> Result<PathBuf> {
        let path = png_path(output);
        self.draw_grid(panels, &path, size)
            .map_err(|e| render_error(&path, e))?;
        info!(
            "Wrote {}x{} grid of {} panels to {}",
            GRID_SHAPE.0,
            GRID_SHAPE.1,
            panels.len(),
            path.display()
        );
        Ok(path)
    }

    /// Draw one series into its own image
    pub fn render_single(
        &self,
        series: &ChartSeries,
        output: &Path,
        size: (u32, u32),
    ) -> Result<PathBuf> {
        let path = png_path(output);
        self.draw_single(series, &path, size)
            .map_err(|e| render_error(&path, e))?;
        info!("Wrote chart of '{}' to {}", series.column, path.display());
        Ok(path)
    }

    fn draw_grid(&self, panels: &[ChartSeries], path: &Path, size: (u32, u32)) -> anyhow::Result<()> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let areas = root.split_evenly(GRID_SHAPE);
        for (area, series) in areas.iter().zip(panels) {
            self.draw_panel(area, series)?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_single(&self, series: &ChartSeries, path: &Path, size: (u32, u32)) -> anyhow::Result<()> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        self.draw_panel(&root, series)?;
        root.present()?;
        Ok(())
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        series: &ChartSeries,
    ) -> anyhow::Result<()> {
        let theme = &self.theme;
        let style = &theme.style;
        let color = series.style.color;
        let family = theme.font.family();

        let x_range = series.x_range();
        let y_range = series.y_range();
        let (left_area, bottom_area) = label_area_sizes(theme);

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(theme.px_u32(CHART_MARGIN_PT, 1))
            .x_label_area_size(bottom_area)
            .y_label_area_size(left_area);
        if let Some(family) = family {
            let title_font = font(family, theme.px(style.title_size_pt), style.title_bold);
            builder.caption(&series.style.title, title_font.color(&color));
        }
        let mut chart = builder.build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let tick_label = |v: &f64| format_tick(*v);
        let spine_style = color.stroke_width(theme.px_u32(style.major_tick_width_pt, 1));

        // The mesh only carries text here; without a font it is skipped entirely
        if let Some(family) = family {
            let tick_font = font(family, theme.px(style.tick_label_size_pt), false);
            let label_font = font(family, theme.px(style.label_size_pt), style.label_bold);
            chart
                .configure_mesh()
                .disable_mesh()
                .set_all_tick_mark_size(0)
                .axis_style(spine_style)
                .x_labels(style.major_tick_count)
                .y_labels(style.major_tick_count)
                .x_label_formatter(&tick_label)
                .y_label_formatter(&tick_label)
                .label_style(tick_font.color(&color))
                .x_desc(self.time_label.as_str())
                .y_desc(series.style.y_label.as_str())
                .axis_desc_style(label_font.color(&color))
                .draw()?;
        }

        // Spines on all four sides
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            spine_style,
        )))?;

        let (width, height) = chart.plotting_area().dim_in_pixel();
        let ticks = TickGeometry {
            x_range: x_range.clone(),
            y_range: y_range.clone(),
            x_per_px: (x_range.end - x_range.start) / width.max(1) as f64,
            y_per_px: (y_range.end - y_range.start) / height.max(1) as f64,
            inward: style.tick_direction == TickDirection::In,
        };

        let x_axis: RangedCoordf64 = x_range.clone().into();
        let y_axis: RangedCoordf64 = y_range.clone().into();
        let x_major = x_axis.key_points(style.major_tick_count);
        let y_major = y_axis.key_points(style.major_tick_count);

        let major_style = color.stroke_width(theme.px_u32(style.major_tick_width_pt, 1));
        let major_len = theme.px(style.major_tick_len_pt);
        let mut marks = ticks.marks(&x_major, &y_major, major_len, major_style);

        if style.minor_ticks {
            let x_minor = minor_tick_positions(&x_major, &x_range, style.minor_divisions);
            let y_minor = minor_tick_positions(&y_major, &y_range, style.minor_divisions);
            let minor_style = color.stroke_width(theme.px_u32(style.minor_tick_width_pt, 1));
            let minor_len = theme.px(style.minor_tick_len_pt);
            marks.extend(ticks.marks(&x_minor, &y_minor, minor_len, minor_style));
        }
        chart.draw_series(marks)?;

        let line_style = color.stroke_width(theme.px_u32(style.line_width_pt, 1));
        let legend_len = theme.px_u32(LEGEND_LINE_PT, 1) as i32;
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), line_style))?
            .label(series.style.legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], line_style));

        if let (Some(family), true) = (family, style.legend) {
            let legend_font = font(family, theme.px(style.legend_size_pt), false);
            let mut legend = chart.configure_series_labels();
            legend
                .position(SeriesLabelPosition::UpperRight)
                .margin(theme.px_u32(LEGEND_MARGIN_PT, 1))
                .legend_area_size(theme.px_u32(LEGEND_LINE_PT, 1))
                .label_font(legend_font.color(&BLACK));
            if style.legend_frame {
                legend
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK.mix(0.3));
            }
            legend.draw()?;
        }

        Ok(())
    }
}

/// Converts tick lengths in pixels to data units along the plot edges
struct TickGeometry {
    x_range: Range<f64>,
    y_range: Range<f64>,
    x_per_px: f64,
    y_per_px: f64,
    inward: bool,
}

impl TickGeometry {
    /// Tick marks on the bottom and left spines
    fn marks(
        &self,
        xs: &[f64],
        ys: &[f64],
        len_px: f64,
        style: ShapeStyle,
    ) -> Vec<PathElement<(f64, f64)>> {
        let sign = if self.inward { 1.0 } else { -1.0 };
        let dy = sign * len_px * self.y_per_px;
        let dx = sign * len_px * self.x_per_px;
        let y0 = self.y_range.start;
        let x0 = self.x_range.start;

        let bottom = xs
            .iter()
            .copied()
            .filter(|x| within(&self.x_range, *x))
            .map(|x| PathElement::new(vec![(x, y0), (x, y0 + dy)], style));
        let left = ys
            .iter()
            .copied()
            .filter(|y| within(&self.y_range, *y))
            .map(|y| PathElement::new(vec![(x0, y), (x0 + dx, y)], style));

        bottom.chain(left).collect()
    }
}

fn within(range: &Range<f64>, value: f64) -> bool {
    value >= range.start && value <= range.end
}

fn font(family: &str, size_px: f64, bold: bool) -> FontDesc<'_> {
    let style = if bold { FontStyle::Bold } else { FontStyle::Normal };
    FontDesc::new(FontFamily::from(family), size_px, style)
}

/// (left, bottom) label area sizes in pixels
fn label_area_sizes(theme: &Theme) -> (u32, u32) {
    if !theme.has_text() {
        let bare = theme.px_u32(BARE_LABEL_AREA_PT, 1);
        return (bare, bare);
    }
    let style = &theme.style;
    let left = style.tick_label_size_pt * 3.0 + style.label_size_pt * 1.3 + style.label_pad_pt;
    let bottom = style.tick_label_size_pt * 1.5 + style.label_size_pt * 1.3 + style.label_pad_pt;
    (theme.px_u32(left, 1), theme.px_u32(bottom, 1))
}

fn render_error(path: &Path, err: anyhow::Error) -> ChillError {
    ChillError::Render(format!("{}: {:#}", path.display(), err))
}
