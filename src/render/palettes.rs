//! Named line colors
//!
//! palettes.json groups color labels by palette (`tab10` holds matplotlib's
//! category colors as `tab:blue` .. `tab:cyan`). Labels are unique across
//! palettes and looked up case-insensitively.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use plotters::style::RGBColor;
use tracing::{debug, error, warn};

const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Color used for labels that resolve to nothing
pub const FALLBACK_COLOR: RGBColor = RGBColor(127, 127, 127);

pub static COLORS: Lazy<ColorTable> = Lazy::new(|| {
    ColorTable::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        error!("Failed to load palettes.json: {}", e);
        ColorTable::default()
    })
});

/// Lowercased color label to RGB
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    by_label: HashMap<String, RGBColor>,
}

impl ColorTable {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let palettes: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(json).map_err(|e| format!("invalid palettes file: {}", e))?;

        let mut by_label = HashMap::new();
        for (palette, entries) in &palettes {
            for (label, hex) in entries {
                let color = parse_hex_color(hex)
                    .ok_or_else(|| format!("{}: '{}' has invalid color '{}'", palette, label, hex))?;
                if by_label.insert(label.to_lowercase(), color).is_some() {
                    return Err(format!("color label '{}' is defined twice", label));
                }
            }
        }

        debug!(
            "ColorTable: {} labels from {} palettes",
            by_label.len(),
            palettes.len()
        );
        Ok(Self { by_label })
    }

    /// A known label, or a literal `#RRGGBB`
    pub fn resolve(&self, spec: &str) -> Option<RGBColor> {
        let spec = spec.trim();
        match self.by_label.get(&spec.to_lowercase()) {
            Some(color) => Some(*color),
            None if spec.starts_with('#') => parse_hex_color(spec),
            None => None,
        }
    }
}

/// `RRGGBB` or `RRGGBBAA`, with or without `#`; alpha is dropped
pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Resolve against the embedded table, gray when unknown
pub fn color_from_spec(spec: &str) -> RGBColor {
    COLORS.resolve(spec).unwrap_or_else(|| {
        warn!("Unknown color '{}', using gray", spec);
        FALLBACK_COLOR
    })
}
