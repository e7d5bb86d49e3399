//! Property definitions with defaults from plot_defaults.json
//!
//! plot_defaults.json is embedded at compile time and is the single source of
//! default values. User values only come from `--set name=value` flags.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::{ChillError, Result};

/// plot_defaults.json embedded at compile time
const DEFAULTS_JSON: &str = include_str!("../plot_defaults.json");

/// Value type of a property, as named in plot_defaults.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
    #[serde(rename = "DoubleProperty")]
    Double,
    #[serde(rename = "IntegerProperty")]
    Integer,
    #[serde(rename = "BooleanProperty")]
    Boolean,
}

/// One entry of plot_defaults.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// Allowed values of an enumerated property
    #[serde(default)]
    pub values: Vec<String>,
}

impl PropertyDef {
    /// Case-insensitive membership test; non-enumerated properties accept anything
    fn accepts(&self, value: &str) -> bool {
        self.kind != PropertyKind::Enumerated
            || self.values.is_empty()
            || self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }
}

#[derive(Deserialize)]
struct DefaultsFile {
    properties: Vec<PropertyDef>,
}

/// All known properties by name
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse the embedded plot_defaults.json; empty when it is malformed
    pub fn from_defaults_json() -> Self {
        Self::from_json(DEFAULTS_JSON).unwrap_or_else(|e| {
            error!("Failed to load plot_defaults.json: {}", e);
            Self {
                properties: HashMap::new(),
            }
        })
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        let file: DefaultsFile =
            serde_json::from_str(json).map_err(|e| format!("invalid property file: {}", e))?;

        let properties = file
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect::<HashMap<_, _>>();

        debug!("PropertyRegistry: {} properties", properties.len());
        Ok(Self { properties })
    }

    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether `value` is allowed for `name`. Unknown names accept anything.
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .map_or(true, |def| def.accepts(value))
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Process-wide registry built from the embedded defaults
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(PropertyRegistry::from_defaults_json)
}

/// Typed property reader: user value if set, otherwise the registry default
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    /// Reader with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `name=value` strings. Unknown names are rejected; an empty
    /// value leaves the default in place.
    pub fn from_overrides<S: AsRef<str>>(overrides: &[S]) -> Result<Self> {
        let reg = registry();
        let mut user_values = HashMap::new();

        for raw in overrides.iter().map(AsRef::as_ref) {
            let Some((name, value)) = raw.split_once('=') else {
                return Err(ChillError::InvalidProperty(format!(
                    "'{}' is not name=value",
                    raw
                )));
            };
            let (name, value) = (name.trim(), value.trim());
            if reg.get_property(name).is_none() {
                return Err(ChillError::InvalidProperty(format!(
                    "unknown property '{}'",
                    name
                )));
            }
            if value.is_empty() {
                continue;
            }
            debug!("Property override {} = {}", name, value);
            user_values.insert(name.to_string(), value.to_string());
        }

        Ok(Self { user_values })
    }

    pub fn get_string(&self, name: &str) -> String {
        match self.user_values.get(name) {
            Some(value) => value.clone(),
            None => registry().get_default(name).unwrap_or_default().to_string(),
        }
    }

    /// Lowercased enumerated value; values outside the allowed set use the default
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or_default();

        match self.user_values.get(name) {
            Some(value) if reg.is_valid_enum_value(name, value) => value.to_lowercase(),
            Some(value) => {
                let allowed = reg
                    .get_property(name)
                    .map(|def| def.values.join(", "))
                    .unwrap_or_default();
                warn!(
                    "Property '{}': '{}' is not one of [{}], using '{}'",
                    name, value, allowed, default
                );
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    /// Comma separated entries, trimmed, empties dropped
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get_string(name)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Finite float; anything else uses the default
    pub fn get_f64(&self, name: &str) -> f64 {
        self.parsed(name, |v: &f64| v.is_finite()).unwrap_or(0.0)
    }

    /// Float within `[min, max]`; out-of-range values use the default
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if (min..=max).contains(&value) {
            return value;
        }
        let fallback = default_of::<f64>(name).unwrap_or(min);
        warn!(
            "Property '{}': {} outside [{}, {}], using {}",
            name, value, min, max, fallback
        );
        fallback
    }

    pub fn get_u32(&self, name: &str) -> u32 {
        self.parsed(name, |_: &u32| true).unwrap_or(0)
    }

    /// `true` / `false`, case-insensitive
    pub fn get_bool(&self, name: &str) -> bool {
        let default = registry().get_default(name) == Some("true");
        let Some(value) = self.user_values.get(name) else {
            return default;
        };
        match value.to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                warn!(
                    "Property '{}': '{}' is not a boolean, using {}",
                    name, value, default
                );
                default
            }
        }
    }

    /// User value parsed as `T` when it passes `valid`, else the parsed default
    fn parsed<T>(&self, name: &str, valid: impl Fn(&T) -> bool) -> Option<T>
    where
        T: FromStr + Display + Copy,
    {
        let default = default_of::<T>(name);
        let Some(raw) = self.user_values.get(name) else {
            return default;
        };
        match raw.parse::<T>() {
            Ok(value) if valid(&value) => Some(value),
            _ => {
                match default {
                    Some(d) => warn!("Property '{}': invalid value '{}', using {}", name, raw, d),
                    None => warn!("Property '{}': invalid value '{}'", name, raw),
                }
                default
            }
        }
    }
}

fn default_of<T: FromStr>(name: &str) -> Option<T> {
    registry().get_default(name)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("time.divisor").is_some());
        assert!(reg.get_property("tick.direction").is_some());
        assert!(reg.get_property("figure.dpi").is_some());
        assert!(reg.len() > 20);
        assert_eq!(
            reg.get_property("tick.minor.visible").map(|p| p.kind),
            Some(PropertyKind::Boolean)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("time.divisor"), Some("10"));
        assert_eq!(reg.get_default("figure.dpi"), Some("300"));
        assert_eq!(reg.get_default("csv.delimiter"), Some(","));
        assert_eq!(
            reg.get_default("time.reference.column"),
            Some("ChillPlus.counts.HYDRATE")
        );
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("tick.direction", "in"));
        assert!(reg.is_valid_enum_value("tick.direction", "OUT"));
        assert!(!reg.is_valid_enum_value("tick.direction", "inout"));
        assert!(reg.is_valid_enum_value("time.label", "anything"));
    }

    #[test]
    fn test_from_json_rejects_unknown_kind() {
        let json = r#"{ "properties": [
            { "name": "a", "kind": "ColorProperty", "defaultValue": "x" }
        ] }"#;
        assert!(PropertyRegistry::from_json(json).is_err());
    }

    #[test]
    fn test_reader_defaults() {
        let reader = PropertyReader::new();
        assert_eq!(reader.get_f64("time.divisor"), 10.0);
        assert_eq!(reader.get_enum("tick.direction"), "in");
        assert_eq!(reader.get_u32("tick.minor.divisions"), 5);
        assert!(reader.get_bool("tick.minor.visible"));
        assert_eq!(reader.get_list("font.family"), vec!["SF Pro Display", "Arial"]);
    }

    #[test]
    fn test_reader_overrides() {
        let reader = PropertyReader::from_overrides(&[
            "time.divisor=4",
            "tick.direction=out",
            "legend.show=false",
            "font.family= DejaVu Sans , ",
        ])
        .unwrap();
        assert_eq!(reader.get_f64("time.divisor"), 4.0);
        assert_eq!(reader.get_enum("tick.direction"), "out");
        assert!(!reader.get_bool("legend.show"));
        assert_eq!(reader.get_list("font.family"), vec!["DejaVu Sans"]);
    }

    #[test]
    fn test_reader_invalid_values_use_defaults() {
        let reader = PropertyReader::from_overrides(&[
            "time.divisor=ten",
            "tick.direction=sideways",
            "legend.show=maybe",
            "tick.minor.divisions=-2",
        ])
        .unwrap();
        assert_eq!(reader.get_f64("time.divisor"), 10.0);
        assert_eq!(reader.get_enum("tick.direction"), "in");
        assert!(reader.get_bool("legend.show"));
        assert_eq!(reader.get_u32("tick.minor.divisions"), 5);
    }

    #[test]
    fn test_reader_range() {
        let reader = PropertyReader::from_overrides(&["figure.dpi=5"]).unwrap();
        assert_eq!(reader.get_f64_in_range("figure.dpi", 10.0, 1200.0), 300.0);
    }

    #[test]
    fn test_empty_override_keeps_default() {
        let reader = PropertyReader::from_overrides(&["time.label="]).unwrap();
        assert_eq!(reader.get_string("time.label"), "Time (ns)");
    }

    #[test]
    fn test_reader_rejects_unknown_or_malformed() {
        assert!(matches!(
            PropertyReader::from_overrides(&["no.such.property=1"]),
            Err(ChillError::InvalidProperty(_))
        ));
        assert!(matches!(
            PropertyReader::from_overrides(&["time.divisor"]),
            Err(ChillError::InvalidProperty(_))
        ));
    }
}
