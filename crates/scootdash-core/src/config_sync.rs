//! Config Sync
//!
//! Reads the device configuration into the config form and writes the form
//! back. The device is authoritative: after every successful write the form
//! is reloaded from `/config` instead of trusting what was submitted.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::device::Device;
use crate::error::DashError;
use crate::format::format_number;
use crate::layout::ControlKind;
use crate::render::{ConfigForm, Renderer};
use crate::telemetry::scalar_entries;

/// Config key holding the lock code
pub const LOCK_PIN_KEY: &str = "lock-pin";

/// Text shown instead of a readable pin when the code cannot be decoded
pub const INVALID_PIN_MARKER: &str = "invalid";

/// A scalar config value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(f64),
    /// JSON string
    Text(String),
}

impl ConfigValue {
    /// Scalar view of a JSON value, `None` for null, arrays and objects
    pub fn from_json_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(ConfigValue::Bool(b)),
            serde_json::Value::Number(n) => n.as_f64().map(ConfigValue::Number),
            serde_json::Value::String(s) => Some(ConfigValue::Text(s)),
            _ => None,
        }
    }

    /// Value as a checkbox state
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Bool(b) => *b,
            ConfigValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ConfigValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Number(n) => f.write_str(&format_number(*n)),
            ConfigValue::Text(s) => f.write_str(s),
        }
    }
}

/// Device configuration as last reported by `/config`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, ConfigValue>,
}

impl<'de> Deserialize<'de> for ConfigSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self {
            values: scalar_entries(raw, ConfigValue::from_json_value),
        })
    }
}

impl ConfigSnapshot {
    /// Decode a `/config` body
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Build a snapshot from already-decoded values
    pub fn from_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, ConfigValue)>,
        K: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Value of a config key
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Iterate all values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of config values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the device reported no config
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Physical buttons on the display module, in pin digit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Digit 0
    Up,
    /// Digit 1
    Right,
    /// Digit 2
    Down,
    /// Digit 3
    Left,
    /// Digit 4
    Cancel,
    /// Digit 5
    Power,
}

impl Button {
    /// All buttons, indexed by pin digit
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Right,
        Button::Down,
        Button::Left,
        Button::Cancel,
        Button::Power,
    ];

    /// Button for a pin digit, `None` above 5
    pub fn from_digit(digit: u32) -> Option<Self> {
        Self::ALL.get(digit as usize).copied()
    }

    /// Lowercase name shown in the readable pin
    pub fn name(&self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Right => "right",
            Button::Down => "down",
            Button::Left => "left",
            Button::Cancel => "cancel",
            Button::Power => "power",
        }
    }
}

/// Decode a lock code into the buttons to press
///
/// Every character must be a digit 0-5; one bad character rejects the whole pin.
pub fn readable_pin(pin: &str) -> Result<Vec<Button>, DashError> {
    pin.chars()
        .enumerate()
        .map(|(position, character)| {
            character
                .to_digit(10)
                .and_then(Button::from_digit)
                .ok_or(DashError::InvalidPin {
                    character,
                    position,
                })
        })
        .collect()
}

/// Text shown next to the pin field
pub fn readable_pin_text(pin: &str) -> String {
    match readable_pin(pin) {
        Ok(buttons) => buttons
            .iter()
            .map(Button::name)
            .collect::<Vec<_>>()
            .join(", "),
        Err(err) => {
            debug!("{}", err);
            INVALID_PIN_MARKER.to_string()
        }
    }
}

/// Write a snapshot into the form and refresh the readable pin
pub fn apply_config<V: Renderer + ConfigForm>(config: &ConfigSnapshot, view: &mut V) {
    for (key, value) in config.iter() {
        match view.control_kind(key) {
            Some(ControlKind::Checkbox) => view.set_checked(key, value.is_truthy()),
            Some(ControlKind::Text) => view.set_text(key, &value.to_string()),
            None => debug!("No config control for '{}'", key),
        }
    }

    if let Some(pin) = config.get(LOCK_PIN_KEY) {
        view.set_readable_pin(&readable_pin_text(&pin.to_string()));
    }
}

/// Fetch `/config` and populate the form
///
/// On failure the form is left exactly as it was.
pub async fn load_config<D, V>(device: &mut D, view: &mut V) -> Result<ConfigSnapshot, DashError>
where
    D: Device,
    V: Renderer + ConfigForm,
{
    let config = device.fetch_config().await?;
    apply_config(&config, view);
    Ok(config)
}

/// Collect the form as ordered key/value pairs for `/updateConfig`
pub fn collect_form<F: ConfigForm>(form: &F) -> Vec<(String, String)> {
    form.controls()
        .into_iter()
        .map(|(key, value)| (key, value.to_form_value()))
        .collect()
}

/// Submit the form, then reload what the device actually accepted
pub async fn save_config<D, V>(device: &mut D, view: &mut V) -> Result<ConfigSnapshot, DashError>
where
    D: Device,
    V: Renderer + ConfigForm,
{
    let pairs = collect_form(&*view);
    info!("Writing {} config fields", pairs.len());
    device.update_config(&pairs).await?;
    load_config(device, view).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_pin_full_alphabet() {
        assert_eq!(
            readable_pin_text("012345"),
            "up, right, down, left, cancel, power"
        );
    }

    #[test]
    fn test_readable_pin_rejects_six() {
        assert_eq!(readable_pin_text("06"), INVALID_PIN_MARKER);
        assert!(matches!(
            readable_pin("06"),
            Err(DashError::InvalidPin {
                character: '6',
                position: 1
            })
        ));
    }

    #[test]
    fn test_readable_pin_rejects_non_digits() {
        assert_eq!(readable_pin_text("1a"), INVALID_PIN_MARKER);
        assert_eq!(readable_pin_text("-1"), INVALID_PIN_MARKER);
        assert_eq!(readable_pin_text("1.5"), INVALID_PIN_MARKER);
    }

    #[test]
    fn test_empty_pin() {
        assert_eq!(readable_pin_text(""), "");
    }

    #[test]
    fn test_numeric_pin_uses_plain_digits() {
        assert_eq!(ConfigValue::Number(5023.0).to_string(), "5023");
        assert_eq!(
            readable_pin_text(&ConfigValue::Number(5023.0).to_string()),
            "power, up, down, left"
        );
    }

    #[test]
    fn test_null_config_values_are_dropped() {
        let config = ConfigSnapshot::from_json(r#"{"lock-pin":"0123","wifi-pass":null}"#).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("lock-pin"), Some(&ConfigValue::Text("0123".into())));
    }

    #[test]
    fn test_negative_zero_displays_as_zero() {
        assert_eq!(ConfigValue::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn test_config_value_truthiness() {
        assert!(ConfigValue::Number(1.0).is_truthy());
        assert!(!ConfigValue::Number(0.0).is_truthy());
        assert!(!ConfigValue::Text(String::new()).is_truthy());
        assert!(ConfigValue::Bool(true).is_truthy());
    }
}
