//! Last-known device feature flags

use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetrySnapshot;

/// A boolean device feature the operator can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Headlight
    Light,
    /// Reduced power mode
    EcoMode,
    /// Motor lock
    Lock,
}

impl Feature {
    /// Every feature, in display order
    pub const ALL: [Feature; 3] = [Feature::Light, Feature::EcoMode, Feature::Lock];

    /// Action name understood by `/action/{name}/{value}`
    pub fn action_name(&self) -> &'static str {
        match self {
            Feature::Light => "setLight",
            Feature::EcoMode => "setEcoMode",
            Feature::Lock => "setLock",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Light => "Light",
            Feature::EcoMode => "Eco mode",
            Feature::Lock => "Lock",
        }
    }
}

/// Text shown in a feature status label
pub fn status_label(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Last-known (or optimistically assumed) state of the toggleable features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureState {
    /// Headlight on
    pub light: bool,
    /// Eco mode on
    pub eco_mode: bool,
    /// Scooter locked
    pub lock: bool,
}

impl FeatureState {
    /// Authoritative state reported in a telemetry snapshot
    pub fn from_snapshot(snapshot: &TelemetrySnapshot) -> Self {
        Self {
            light: snapshot.lights(),
            eco_mode: snapshot.eco_mode(),
            lock: snapshot.is_locked(),
        }
    }

    /// Current value of a feature
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Light => self.light,
            Feature::EcoMode => self.eco_mode,
            Feature::Lock => self.lock,
        }
    }

    /// Overwrite a feature
    pub fn set(&mut self, feature: Feature, on: bool) {
        match feature {
            Feature::Light => self.light = on,
            Feature::EcoMode => self.eco_mode = on,
            Feature::Lock => self.lock = on,
        }
    }

    /// Flip a feature and return its new value
    pub fn flip(&mut self, feature: Feature) -> bool {
        let on = !self.get(feature);
        self.set(feature, on);
        on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip() {
        let mut state = FeatureState::default();
        assert!(state.flip(Feature::EcoMode));
        assert!(state.eco_mode);
        assert!(!state.light);
        assert!(!state.flip(Feature::EcoMode));
    }

    #[test]
    fn test_from_snapshot() {
        let snapshot =
            TelemetrySnapshot::from_fields([("lights", 1.0), ("ecoMode", 0.0), ("isLocked", 1.0)]);
        let state = FeatureState::from_snapshot(&snapshot);
        assert_eq!(
            state,
            FeatureState {
                light: true,
                eco_mode: false,
                lock: true
            }
        );
    }
}
