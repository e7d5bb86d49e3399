//! Column name to chart style mapping
//!
//! Known CHILL+ count columns get a title, legend label, y label and color
//! from columns.json. Any other column is charted with the documented default:
//! its own name as title, legend and y label, drawn in `tab:gray`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use plotters::style::RGBColor;
use serde::Deserialize;
use tracing::error;

use super::palettes::{color_from_spec, FALLBACK_COLOR};

/// Embedded columns.json content
const COLUMNS_JSON: &str = include_str!("../../columns.json");

/// Global column style registry
pub static COLUMN_STYLES: Lazy<ColumnStyleRegistry> = Lazy::new(|| {
    ColumnStyleRegistry::from_json(COLUMNS_JSON).unwrap_or_else(|e| {
        error!("Failed to load columns.json: {}", e);
        ColumnStyleRegistry::default()
    })
});

/// How one column is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStyle {
    pub title: String,
    pub legend: String,
    pub y_label: String,
    pub color: RGBColor,
}

#[derive(Debug, Clone, Deserialize)]
struct ColumnEntry {
    name: String,
    title: String,
    legend: String,
    y_label: String,
    color: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DefaultEntry {
    color: String,
    #[serde(default)]
    y_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ColumnsFile {
    default: DefaultEntry,
    columns: Vec<ColumnEntry>,
    grid: Vec<String>,
}

/// Registry of known column styles plus the grid panel order
#[derive(Debug, Clone)]
pub struct ColumnStyleRegistry {
    styles: HashMap<String, ColumnStyle>,
    default_color: RGBColor,
    default_y_label: Option<String>,
    grid: Vec<String>,
}

impl Default for ColumnStyleRegistry {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            default_color: FALLBACK_COLOR,
            default_y_label: None,
            grid: Vec::new(),
        }
    }
}

impl ColumnStyleRegistry {
    /// Load styles from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: ColumnsFile = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse columns JSON: {}", e))?;

        let styles = file
            .columns
            .into_iter()
            .map(|entry| {
                let style = ColumnStyle {
                    title: entry.title,
                    legend: entry.legend,
                    y_label: entry.y_label,
                    color: color_from_spec(&entry.color),
                };
                (entry.name, style)
            })
            .collect();

        Ok(Self {
            styles,
            default_color: color_from_spec(&file.default.color),
            default_y_label: file.default.y_label,
            grid: file.grid,
        })
    }

    /// Style for `column`, falling back to the default style
    pub fn style_for(&self, column: &str) -> ColumnStyle {
        self.styles
            .get(column)
            .cloned()
            .unwrap_or_else(|| ColumnStyle {
                title: column.to_string(),
                legend: column.to_string(),
                y_label: self
                    .default_y_label
                    .clone()
                    .unwrap_or_else(|| column.to_string()),
                color: self.default_color,
            })
    }

    /// Columns of the 2x2 grid in row-major order
    pub fn grid_columns(&self) -> &[String] {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_column_style() {
        let style = COLUMN_STYLES.style_for("ChillPlus.counts.HYDRATE");
        assert_eq!(style.title, "Hydrates");
        assert_eq!(style.legend, "N_Hydrate");
        assert_eq!(style.y_label, "Counts");
        assert_eq!(style.color, RGBColor(255, 127, 14));
    }

    #[test]
    fn test_unknown_column_uses_default() {
        let style = COLUMN_STYLES.style_for("Temperature");
        assert_eq!(style.title, "Temperature");
        assert_eq!(style.legend, "Temperature");
        assert_eq!(style.y_label, "Temperature");
        assert_eq!(style.color, RGBColor(127, 127, 127));
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(
            COLUMN_STYLES.grid_columns(),
            &[
                "ChillPlus.counts.HYDRATE",
                "ChillPlus.counts.HEXAGONAL_ICE",
                "ChillPlus.counts.INTERFACIAL_HYDRATE",
                "ChillPlus.counts.INTERFACIAL_ICE",
            ]
        );
    }

    #[test]
    fn test_grid_colors_are_distinct() {
        let colors: Vec<RGBColor> = COLUMN_STYLES
            .grid_columns()
            .iter()
            .map(|c| COLUMN_STYLES.style_for(c).color)
            .collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_from_json_with_default_y_label() {
        let json = r##"{
            "default": { "color": "#000000", "y_label": "Value" },
            "columns": [],
            "grid": []
        }"##;
        let registry = ColumnStyleRegistry::from_json(json).unwrap();
        let style = registry.style_for("X");
        assert_eq!(style.y_label, "Value");
        assert_eq!(style.color, RGBColor(0, 0, 0));
    }
}
