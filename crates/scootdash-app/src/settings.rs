//! Application settings
//!
//! Stored as JSON, by default in `<config dir>/scootdash/settings.json`.
//! Every field is optional in the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use scootdash_core::device::DEFAULT_DEVICE_URL;
use scootdash_core::layout::DashboardLayout;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the display module's web server
    pub device_url: String,
    pub poll_interval_ms: u64,
    /// Unset means requests may take as long as they take
    pub request_timeout_ms: Option<u64>,
    /// Talk to the built-in simulated scooter instead of a real one
    pub demo: bool,
    pub layout: DashboardLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_url: DEFAULT_DEVICE_URL.to_string(),
            poll_interval_ms: 500,
            request_timeout_ms: None,
            demo: false,
            layout: DashboardLayout::default(),
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

/// Default settings file location (cross-platform)
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scootdash").join(SETTINGS_FILE))
}

/// Load settings from an explicit path, or from the default location
///
/// An explicit path must exist; a missing default file just means defaults.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return Settings::from_file(path);
    }

    match default_path() {
        Some(path) if path.exists() => Settings::from_file(&path),
        _ => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"demo": true, "request_timeout_ms": 1500}"#).unwrap();

        let settings = load(Some(&path)).unwrap();
        assert!(settings.demo);
        assert_eq!(settings.request_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(settings.device_url, "http://192.168.4.1");
        assert_eq!(settings.poll_interval(), Duration::from_millis(500));
        assert_eq!(settings.layout, DashboardLayout::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "device_url = 1").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.device_url = "http://10.0.0.7".to_string();
        settings.layout.stats.truncate(2);

        settings.save(&path).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let settings = Settings {
            poll_interval_ms: 0,
            ..Settings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
    }
}
