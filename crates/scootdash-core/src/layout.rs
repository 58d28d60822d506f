//! Dashboard Layout
//!
//! Widget configuration for the dashboard: the three gauges, the generic
//! stat fields and the config form controls. Pure data; the view and the
//! terminal front end are built from it.

use serde::{Deserialize, Serialize};

use crate::format::ScaleDirective;

/// The fixed set of physical gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeKind {
    /// Speed in km/h
    Speed,
    /// State of charge in percent
    Battery,
    /// Throttle minus brake, -1..1
    Acceleration,
}

impl GaugeKind {
    /// Every gauge, in display order
    pub const ALL: [GaugeKind; 3] = [GaugeKind::Speed, GaugeKind::Battery, GaugeKind::Acceleration];
}

/// A colored band on a gauge dial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Start of the band, in gauge units
    pub from: f64,
    /// End of the band, in gauge units
    pub to: f64,
    /// CSS color
    pub color: String,
}

impl Highlight {
    fn new(from: f64, to: f64, color: &str) -> Self {
        Self {
            from,
            to,
            color: color.to_string(),
        }
    }
}

/// Configuration for a single gauge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Which gauge this configures
    pub kind: GaugeKind,
    /// Title shown on the dial
    pub label: String,
    /// Units shown under the value
    pub units: String,
    /// Lower end of the dial
    pub min_value: f64,
    /// Upper end of the dial
    pub max_value: f64,
    /// Labels for the major ticks, evenly spaced
    pub major_ticks: Vec<String>,
    /// Colored bands
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    /// CSS color of the needle
    pub needle_color: String,
}

impl GaugeConfig {
    /// Configuration matching the stock web interface
    pub fn stock(kind: GaugeKind) -> Self {
        match kind {
            GaugeKind::Speed => Self {
                kind,
                label: "Speed".to_string(),
                units: "km/h".to_string(),
                min_value: 0.0,
                max_value: 35.0,
                major_ticks: ticks(&["0", "5", "10", "15", "20", "25", "30", "35"]),
                highlights: vec![Highlight::new(20.0, 35.0, "rgba(255,0,0,.5)")],
                needle_color: "#f00".to_string(),
            },
            GaugeKind::Battery => Self {
                kind,
                label: "Battery".to_string(),
                units: "%".to_string(),
                min_value: 0.0,
                max_value: 100.0,
                major_ticks: ticks(&["100", "80", "60", "40", "20", "0"]),
                highlights: vec![
                    Highlight::new(0.0, 20.0, "rgba(0,255,0,.5)"),
                    Highlight::new(20.0, 40.0, "rgba(0,255,0,.4)"),
                    Highlight::new(40.0, 60.0, "rgba(0,255,0,.3)"),
                    Highlight::new(60.0, 80.0, "rgba(0,255,0,.2)"),
                    Highlight::new(80.0, 100.0, "rgba(0,255,0,.1)"),
                ],
                needle_color: "#00f".to_string(),
            },
            GaugeKind::Acceleration => Self {
                kind,
                label: "Acceleration".to_string(),
                units: String::new(),
                min_value: -1.0,
                max_value: 1.0,
                major_ticks: ticks(&["1", "0.5", "0", "-0.5", "-1"]),
                highlights: vec![
                    Highlight::new(0.0, 1.0, "rgba(0,255,0,.5)"),
                    Highlight::new(-1.0, 0.0, "rgba(255,0,0,.5)"),
                ],
                needle_color: "#00f".to_string(),
            },
        }
    }
}

fn ticks(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

/// A generic telemetry display target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatField {
    /// Telemetry key rendered into this field
    pub key: String,
    /// Caption shown next to the value
    pub label: String,
    /// How the raw value is scaled before display
    #[serde(default)]
    pub scale: ScaleDirective,
    /// Units shown after the value, may be empty
    #[serde(default)]
    pub units: String,
}

impl StatField {
    /// Stat field bound to telemetry key `key`
    pub fn new(key: &str, label: &str, scale: ScaleDirective, units: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            scale,
            units: units.to_string(),
        }
    }
}

/// Kind of config form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Boolean setting
    Checkbox,
    /// Free text, numbers included
    Text,
}

/// A config form control bound to a device config key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    /// Device config key
    pub key: String,
    /// Caption shown next to the control
    pub label: String,
    /// Control type
    pub kind: ControlKind,
}

impl ConfigField {
    /// Control bound to config key `key`
    pub fn new(key: &str, label: &str, kind: ControlKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
        }
    }
}

/// Complete dashboard layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    /// Layout name
    pub name: String,
    /// One entry per gauge kind
    pub gauges: Vec<GaugeConfig>,
    /// Telemetry fields shown as text, in display order
    pub stats: Vec<StatField>,
    /// Config form controls, in document order
    pub config_fields: Vec<ConfigField>,
}

impl DashboardLayout {
    /// Config of a gauge kind
    pub fn gauge(&self, kind: GaugeKind) -> Option<&GaugeConfig> {
        self.gauges.iter().find(|g| g.kind == kind)
    }

    /// Stat field bound to a telemetry key
    pub fn stat(&self, key: &str) -> Option<&StatField> {
        self.stats.iter().find(|s| s.key == key)
    }
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            name: "Default Dashboard".to_string(),
            gauges: GaugeKind::ALL.into_iter().map(GaugeConfig::stock).collect(),
            stats: vec![
                StatField::new("odometer", "Odometer", ScaleDirective::Factor(0.001), "km"),
                StatField::new("totalOperationTime", "Operating time", ScaleDirective::Time, ""),
                StatField::new("timeSinceBoot", "Since boot", ScaleDirective::Time, ""),
                StatField::new("voltage", "Voltage", ScaleDirective::Factor(0.01), "V"),
                StatField::new("current", "Current", ScaleDirective::Factor(0.01), "A"),
                StatField::new("temperature", "Temperature", ScaleDirective::Factor(0.1), "°C"),
                StatField::new("soc", "Battery", ScaleDirective::Raw, "%"),
                StatField::new("errorCode", "Error code", ScaleDirective::Raw, ""),
                StatField::new("mainboardVersion", "Mainboard", ScaleDirective::Raw, ""),
            ],
            config_fields: vec![
                ConfigField::new("lock-pin", "Lock PIN", ControlKind::Text),
                ConfigField::new("lock-on-boot", "Lock on boot", ControlKind::Checkbox),
                ConfigField::new("max-speed", "Max speed after boot", ControlKind::Text),
                ConfigField::new("reenable-lights", "Re-enable lights after error", ControlKind::Checkbox),
                ConfigField::new("show-intro", "Show intro on boot", ControlKind::Checkbox),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_has_all_gauges() {
        let layout = DashboardLayout::default();
        for kind in GaugeKind::ALL {
            assert!(layout.gauge(kind).is_some(), "missing {:?}", kind);
        }
        assert_eq!(layout.gauge(GaugeKind::Speed).unwrap().max_value, 35.0);
        assert_eq!(layout.gauge(GaugeKind::Acceleration).unwrap().min_value, -1.0);
    }

    #[test]
    fn test_layout_json_roundtrip_keeps_scales() {
        let layout = DashboardLayout::default();
        let json = serde_json::to_string(&layout).unwrap();
        let back: DashboardLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stat("totalOperationTime").unwrap().scale, ScaleDirective::Time);
        assert_eq!(back.stat("voltage").unwrap().scale, ScaleDirective::Factor(0.01));
        assert_eq!(back.stat("errorCode").unwrap().scale, ScaleDirective::Raw);
    }

    #[test]
    fn test_missing_scale_defaults_to_raw() {
        let field: StatField = serde_json::from_str(r#"{"key": "x", "label": "X"}"#).unwrap();
        assert_eq!(field.scale, ScaleDirective::Raw);
        assert!(field.units.is_empty());
    }
}
