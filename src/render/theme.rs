//! Explicit chart style configuration
//!
//! `StyleConfig` holds sizes in points as configured. `Theme` is the resolved
//! form handed to the renderer: the font family chosen once and every size
//! converted to pixels for the output DPI.

use crate::properties::PropertyReader;

use super::fonts::{resolve_font, ResolvedFont};

/// Tick mark direction relative to the plotting area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDirection {
    In,
    Out,
}

impl TickDirection {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "out" => Self::Out,
            _ => Self::In,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Font families tried in order before the system sans-serif
    pub font_families: Vec<String>,
    pub title_size_pt: f64,
    pub title_bold: bool,
    pub label_size_pt: f64,
    pub label_bold: bool,
    pub label_pad_pt: f64,
    pub tick_label_size_pt: f64,
    pub tick_direction: TickDirection,
    pub major_tick_len_pt: f64,
    pub minor_tick_len_pt: f64,
    pub major_tick_width_pt: f64,
    pub minor_tick_width_pt: f64,
    /// Upper bound on labelled ticks per axis
    pub major_tick_count: usize,
    pub minor_ticks: bool,
    pub minor_divisions: u32,
    pub line_width_pt: f64,
    pub legend: bool,
    pub legend_size_pt: f64,
    pub legend_frame: bool,
}

impl StyleConfig {
    pub fn from_properties(props: &PropertyReader) -> Self {
        Self {
            font_families: props.get_list("font.family"),
            title_size_pt: props.get_f64_in_range("axes.titlesize", 1.0, 200.0),
            title_bold: props.get_enum("axes.titleweight") == "bold",
            label_size_pt: props.get_f64_in_range("axes.labelsize", 1.0, 200.0),
            label_bold: props.get_enum("axes.labelweight") == "bold",
            label_pad_pt: props.get_f64_in_range("axes.labelpad", 0.0, 200.0),
            tick_label_size_pt: props.get_f64_in_range("tick.labelsize", 1.0, 200.0),
            tick_direction: TickDirection::parse(&props.get_enum("tick.direction")),
            major_tick_len_pt: props.get_f64_in_range("tick.major.size", 0.0, 100.0),
            minor_tick_len_pt: props.get_f64_in_range("tick.minor.size", 0.0, 100.0),
            major_tick_width_pt: props.get_f64_in_range("tick.major.width", 0.0, 20.0),
            minor_tick_width_pt: props.get_f64_in_range("tick.minor.width", 0.0, 20.0),
            major_tick_count: props.get_u32("tick.major.count").clamp(2, 50) as usize,
            minor_ticks: props.get_bool("tick.minor.visible"),
            minor_divisions: props.get_u32("tick.minor.divisions").clamp(1, 20),
            line_width_pt: props.get_f64_in_range("lines.linewidth", 0.0, 20.0),
            legend: props.get_bool("legend.show"),
            legend_size_pt: props.get_f64_in_range("legend.fontsize", 1.0, 200.0),
            legend_frame: props.get_bool("legend.frameon"),
        }
    }

    /// Resolve fonts and convert to pixels for `dpi`
    pub fn resolve(&self, dpi: f64) -> Theme {
        Theme::new(self.clone(), resolve_font(&self.font_families), dpi)
    }
}

/// Style ready for drawing: sizes in pixels, font resolved
#[derive(Debug, Clone)]
pub struct Theme {
    pub style: StyleConfig,
    pub font: ResolvedFont,
    /// Pixels per point
    pub scale: f64,
}

impl Theme {
    pub fn new(style: StyleConfig, font: ResolvedFont, dpi: f64) -> Self {
        Self {
            style,
            font,
            scale: dpi / 72.0,
        }
    }

    /// Points to pixels, as a float (font sizes)
    pub fn px(&self, pt: f64) -> f64 {
        pt * self.scale
    }

    /// Points to whole pixels, at least `min`
    pub fn px_u32(&self, pt: f64, min: u32) -> u32 {
        (self.px(pt).round() as u32).max(min)
    }

    /// Whether any text can be drawn
    pub fn has_text(&self) -> bool {
        self.font.family().is_some()
    }
}
