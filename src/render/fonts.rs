//! Font family resolution with fallback
//!
//! Families are tried in configured order. When none is installed the system
//! sans-serif face is used and a `FontFallbackExhausted` warning is logged.
//! When not even that loads, charts are drawn without text.

use std::panic;

use plotters::style::{FontDesc, FontFamily, FontStyle};
use tracing::{debug, info, warn};

use crate::error::ChillError;

/// Family name plotters maps to the system sans-serif face
pub const SYSTEM_SANS_SERIF: &str = "sans-serif";

/// Text measured to tell font faces apart
const PROBE_TEXT: &str = "Hamburgefonstiv 0123456789";
const PROBE_SIZE: f64 = 64.0;

/// Outcome of font resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFont {
    /// One of the configured families
    Named(String),
    /// System sans-serif substitute
    SystemDefault,
    /// No font could be loaded
    Unavailable,
}

impl ResolvedFont {
    /// Family name to build `FontDesc`s from, `None` when text is disabled
    pub fn family(&self) -> Option<&str> {
        match self {
            ResolvedFont::Named(name) => Some(name.as_str()),
            ResolvedFont::SystemDefault => Some(SYSTEM_SANS_SERIF),
            ResolvedFont::Unavailable => None,
        }
    }
}

/// Pick the first loadable family from `candidates`
pub fn resolve_font(candidates: &[String]) -> ResolvedFont {
    let fallback = measure(FontFamily::SansSerif);

    for name in candidates {
        // Missing families may silently load the default face, so a family only
        // counts as present when it measures differently from sans-serif
        match measure(FontFamily::Name(name)) {
            Some(size) if fallback != Some(size) => {
                info!("Using font family '{}'", name);
                return ResolvedFont::Named(name.clone());
            }
            Some(_) => debug!("Font family '{}' resolves to the default face", name),
            None => debug!("Font family '{}' is not installed", name),
        }
    }

    if !candidates.is_empty() {
        warn!("{}", ChillError::FontFallbackExhausted(candidates.to_vec()));
    }

    if fallback.is_some() {
        ResolvedFont::SystemDefault
    } else {
        warn!("No usable font found, charts will be drawn without text");
        ResolvedFont::Unavailable
    }
}

fn measure(family: FontFamily) -> Option<(u32, u32)> {
    // Font backends can panic on hosts without a usable font configuration
    panic::catch_unwind(panic::AssertUnwindSafe(|| {
        FontDesc::new(family, PROBE_SIZE, FontStyle::Normal)
            .box_size(PROBE_TEXT)
            .ok()
    }))
    .ok()
    .flatten()
}
