//! Telemetry snapshot model
//!
//! One `GET /data` reply, decoded into a map of tagged scalars plus typed
//! accessors for the fields the dashboard drives gauges and status labels from.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::DashError;
use crate::format::format_number;

/// A single scalar reported by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(f64),
    /// JSON string
    Text(String),
}

impl TelemetryValue {
    /// Numeric view of the value
    ///
    /// Booleans count as 0/1 and text is parsed leniently; anything
    /// unparseable becomes NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            TelemetryValue::Bool(b) => f64::from(u8::from(*b)),
            TelemetryValue::Number(n) => *n,
            TelemetryValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Scalar view of a JSON value, `None` for null, arrays and objects
    pub fn from_json_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(TelemetryValue::Bool(b)),
            serde_json::Value::Number(n) => n.as_f64().map(TelemetryValue::Number),
            serde_json::Value::String(s) => Some(TelemetryValue::Text(s)),
            _ => None,
        }
    }

    /// Truthiness as the firmware means it (it sends flags as 0/1)
    pub fn is_truthy(&self) -> bool {
        match self {
            TelemetryValue::Bool(b) => *b,
            TelemetryValue::Number(n) => *n != 0.0 && !n.is_nan(),
            TelemetryValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryValue::Bool(b) => write!(f, "{}", b),
            TelemetryValue::Number(n) => f.write_str(&format_number(*n)),
            TelemetryValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for TelemetryValue {
    fn from(value: f64) -> Self {
        TelemetryValue::Number(value)
    }
}

impl From<bool> for TelemetryValue {
    fn from(value: bool) -> Self {
        TelemetryValue::Bool(value)
    }
}

impl From<&str> for TelemetryValue {
    fn from(value: &str) -> Self {
        TelemetryValue::Text(value.to_string())
    }
}

/// Keep the scalar entries of a decoded JSON object
///
/// `null`, arrays and objects have no display form and are dropped.
pub(crate) fn scalar_entries<T>(
    raw: BTreeMap<String, serde_json::Value>,
    convert: impl Fn(serde_json::Value) -> Option<T>,
) -> BTreeMap<String, T> {
    raw.into_iter()
        .filter_map(|(key, value)| match convert(value) {
            Some(value) => Some((key, value)),
            None => {
                debug!("Dropping non-scalar field '{}'", key);
                None
            }
        })
        .collect()
}

/// One poll cycle's worth of device status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TelemetrySnapshot {
    fields: BTreeMap<String, TelemetryValue>,
}

impl<'de> Deserialize<'de> for TelemetrySnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self {
            fields: scalar_entries(raw, TelemetryValue::from_json_value),
        })
    }
}

impl TelemetrySnapshot {
    /// Field names the poller needs to drive the gauges
    pub const REQUIRED_NUMERIC: [&'static str; 4] = ["speed", "soc", "throttle", "brake"];

    /// Decode a `/data` body
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Build a snapshot from already-decoded fields
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TelemetryValue>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Check that every field the gauges depend on is present and numeric
    pub fn validate(&self) -> Result<(), DashError> {
        for name in Self::REQUIRED_NUMERIC {
            self.number(name)?;
        }
        Ok(())
    }

    /// Raw value of a field
    pub fn get(&self, name: &str) -> Option<&TelemetryValue> {
        self.fields.get(name)
    }

    /// Iterate all fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TelemetryValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the snapshot has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn number(&self, name: &str) -> Result<f64, DashError> {
        match self.fields.get(name) {
            Some(TelemetryValue::Number(n)) => Ok(*n),
            Some(TelemetryValue::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| DashError::MissingField(name.to_string())),
            _ => Err(DashError::MissingField(name.to_string())),
        }
    }

    fn flag(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(TelemetryValue::is_truthy)
    }

    /// Speed in meters per hour
    pub fn speed(&self) -> Result<f64, DashError> {
        self.number("speed")
    }

    /// Speed in km/h
    pub fn speed_kmh(&self) -> Result<f64, DashError> {
        Ok(self.speed()? / 1000.0)
    }

    /// State of charge in percent
    pub fn soc(&self) -> Result<f64, DashError> {
        self.number("soc")
    }

    /// Raw throttle hall sensor byte
    pub fn throttle(&self) -> Result<f64, DashError> {
        self.number("throttle")
    }

    /// Raw brake hall sensor byte
    pub fn brake(&self) -> Result<f64, DashError> {
        self.number("brake")
    }

    /// Headlight flag
    pub fn lights(&self) -> bool {
        self.flag("lights")
    }

    /// Eco mode flag
    pub fn eco_mode(&self) -> bool {
        self.flag("ecoMode")
    }

    /// Lock flag
    pub fn is_locked(&self) -> bool {
        self.flag("isLocked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_firmware_reply() {
        // the firmware concatenates C++ bools, so flags arrive as 0/1
        let body = r#"{"throttle": 44, "brake": 44, "ecoMode": 1, "lights": 0,
            "soc": 87, "speed": 12500, "odometer": 7320, "isLocked": 0}"#;
        let snapshot = TelemetrySnapshot::from_json(body).unwrap();

        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.speed_kmh().unwrap(), 12.5);
        assert_eq!(snapshot.soc().unwrap(), 87.0);
        assert!(snapshot.eco_mode());
        assert!(!snapshot.lights());
        assert!(!snapshot.is_locked());
        assert_eq!(snapshot.len(), 8);
    }

    #[test]
    fn test_json_booleans_and_text() {
        let snapshot = TelemetrySnapshot::from_json(
            r#"{"speed": "300", "soc": 1, "throttle": 0, "brake": 0, "lights": true, "fw": "1.2"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.speed().unwrap(), 300.0);
        assert!(snapshot.lights());
        assert_eq!(snapshot.get("fw"), Some(&TelemetryValue::Text("1.2".into())));
    }

    #[test]
    fn test_missing_required_field() {
        let snapshot = TelemetrySnapshot::from_fields([("speed", 1.0), ("soc", 2.0)]);
        let err = snapshot.validate().unwrap_err();
        assert!(matches!(err, DashError::MissingField(ref f) if f == "throttle"));
    }

    #[test]
    fn test_missing_flags_are_off() {
        let snapshot = TelemetrySnapshot::default();
        assert!(!snapshot.lights());
        assert!(!snapshot.eco_mode());
        assert!(!snapshot.is_locked());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(TelemetryValue::Number(732.0).to_string(), "732");
        assert_eq!(TelemetryValue::Number(12.5).to_string(), "12.5");
        assert_eq!(TelemetryValue::Bool(true).to_string(), "true");
        assert_eq!(TelemetryValue::Text("abc".into()).to_string(), "abc");
    }

    #[test]
    fn test_non_scalar_fields_are_dropped() {
        let snapshot = TelemetrySnapshot::from_json(
            r#"{"speed": 0, "soc": 50, "throttle": 44, "brake": 44,
                "note": null, "cells": [3.9, 4.0], "bms": {"temp": 21}}"#,
        )
        .unwrap();
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.get("note").is_none());
        assert!(snapshot.get("cells").is_none());
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let snapshot =
            TelemetrySnapshot::from_json(r#"{"speed": null, "soc": 1, "throttle": 0, "brake": 0}"#)
                .unwrap();
        assert!(matches!(snapshot.validate(), Err(DashError::MissingField(ref f)) if f == "speed"));
    }

    #[test]
    fn test_number_display_matches_formatter() {
        assert_eq!(TelemetryValue::Number(-0.0).to_string(), "0");
        assert_eq!(TelemetryValue::Number(-0.0).to_string(), format_number(-0.0));
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(TelemetryValue::Bool(true).as_f64(), 1.0);
        assert_eq!(TelemetryValue::Text(" 42 ".into()).as_f64(), 42.0);
        assert!(TelemetryValue::Text("abc".into()).as_f64().is_nan());
    }
}
