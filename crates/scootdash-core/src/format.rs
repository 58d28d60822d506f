//! Value Formatting
//!
//! Turns a raw telemetry scalar into the text shown in a stat field,
//! according to the scale directive attached to that field.
//!
//! - no directive: natural string form
//! - `time`: seconds count rendered as `{h}h {m}min {s}s`
//! - numeric string: multiplied by that factor

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::telemetry::TelemetryValue;

/// Per-field display transform
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleDirective {
    /// Render the raw value
    #[default]
    Raw,
    /// Render a seconds count as hours/minutes/seconds
    Time,
    /// Multiply by a factor before rendering
    Factor(f64),
}

impl ScaleDirective {
    /// Interpret an optional directive attribute
    ///
    /// Strings that are neither `time` nor a number fall back to [`ScaleDirective::Raw`].
    pub fn parse(attr: Option<&str>) -> Self {
        match attr.map(str::trim) {
            None | Some("") => ScaleDirective::Raw,
            Some("time") => ScaleDirective::Time,
            Some(s) => s
                .parse::<f64>()
                .map(ScaleDirective::Factor)
                .unwrap_or(ScaleDirective::Raw),
        }
    }
}

impl fmt::Display for ScaleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDirective::Raw => Ok(()),
            ScaleDirective::Time => f.write_str("time"),
            ScaleDirective::Factor(m) => write!(f, "{}", m),
        }
    }
}

impl Serialize for ScaleDirective {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScaleDirective::Raw => serializer.serialize_none(),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ScaleDirective {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let attr = Option::<String>::deserialize(deserializer)?;
        Ok(ScaleDirective::parse(attr.as_deref()))
    }
}

/// Format a raw telemetry value for display
pub fn format_value(raw: &TelemetryValue, directive: &ScaleDirective) -> String {
    match directive {
        ScaleDirective::Raw => raw.to_string(),
        ScaleDirective::Time => format_duration(raw.as_f64()),
        ScaleDirective::Factor(m) => format_number(raw.as_f64() * m),
    }
}

/// Render a seconds count as `{h}h {m}min {s}s`, truncating each part toward zero
pub fn format_duration(seconds: f64) -> String {
    let hours = (seconds / 3600.0).trunc();
    let minutes = ((seconds / 60.0) % 60.0).trunc();
    let secs = (seconds % 60.0).trunc();
    format!(
        "{}h {}min {}s",
        format_number(hours),
        format_number(minutes),
        format_number(secs)
    )
}

/// Plain number rendering: shortest round-trip form, no trailing `.0`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directive() {
        assert_eq!(ScaleDirective::parse(None), ScaleDirective::Raw);
        assert_eq!(ScaleDirective::parse(Some("")), ScaleDirective::Raw);
        assert_eq!(ScaleDirective::parse(Some("time")), ScaleDirective::Time);
        assert_eq!(ScaleDirective::parse(Some("0.1")), ScaleDirective::Factor(0.1));
        assert_eq!(ScaleDirective::parse(Some("km")), ScaleDirective::Raw);
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-1.5), "-1.5");
    }

    #[test]
    fn test_directive_serde() {
        let d: ScaleDirective = serde_json::from_str("\"time\"").unwrap();
        assert_eq!(d, ScaleDirective::Time);
        let d: ScaleDirective = serde_json::from_str("null").unwrap();
        assert_eq!(d, ScaleDirective::Raw);
        assert_eq!(serde_json::to_string(&ScaleDirective::Factor(0.01)).unwrap(), "\"0.01\"");
    }
}
