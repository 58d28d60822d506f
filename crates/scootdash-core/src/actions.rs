//! Action Dispatcher
//!
//! Fire-and-forget commands to the device. Feature toggles update the local
//! state and status label before the request goes out; the next telemetry
//! poll confirms or corrects them.

use tracing::info;

use crate::device::Device;
use crate::error::DashError;
use crate::render::Renderer;
use crate::state::{status_label, Feature, FeatureState};

/// Lowest max speed the firmware accepts (km/h)
pub const MIN_MAX_SPEED: u32 = 5;
/// Highest max speed the firmware accepts (km/h)
pub const MAX_MAX_SPEED: u32 = 35;

/// A command understood by `/action/{name}/{value}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `setLight`
    SetLight(bool),
    /// `setEcoMode`
    SetEcoMode(bool),
    /// `setLock`
    SetLock(bool),
    /// `setMaxSpeed`, in km/h
    SetMaxSpeed(u32),
}

impl Action {
    /// Action that sets a feature to `on`
    pub fn for_feature(feature: Feature, on: bool) -> Self {
        match feature {
            Feature::Light => Action::SetLight(on),
            Feature::EcoMode => Action::SetEcoMode(on),
            Feature::Lock => Action::SetLock(on),
        }
    }

    /// Max speed action, rejected before sending when out of range
    pub fn max_speed(kmh: u32) -> Result<Self, DashError> {
        if (MIN_MAX_SPEED..=MAX_MAX_SPEED).contains(&kmh) {
            Ok(Action::SetMaxSpeed(kmh))
        } else {
            Err(DashError::MaxSpeedOutOfRange(kmh))
        }
    }

    /// Action name segment of the path
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetLight(_) => Feature::Light.action_name(),
            Action::SetEcoMode(_) => Feature::EcoMode.action_name(),
            Action::SetLock(_) => Feature::Lock.action_name(),
            Action::SetMaxSpeed(_) => "setMaxSpeed",
        }
    }

    /// Value segment of the path
    pub fn value(&self) -> String {
        match self {
            Action::SetLight(on) | Action::SetEcoMode(on) | Action::SetLock(on) => on.to_string(),
            Action::SetMaxSpeed(kmh) => kmh.to_string(),
        }
    }

    /// Request path, e.g. `/action/setLight/true`
    pub fn path(&self) -> String {
        format!("/action/{}/{}", self.name(), self.value())
    }
}

/// Send an action without waiting on the device's verdict
pub async fn dispatch<D: Device>(device: &mut D, action: &Action) -> Result<(), DashError> {
    info!("Sending {}", action.path());
    device.send_action(action).await
}

/// Optimistically flip a feature, show it, then tell the device
///
/// Returns the requested value. A transport error is returned after the local
/// flip has already happened; the next poll restores the real state.
pub async fn toggle<D: Device, R: Renderer>(
    feature: Feature,
    state: &mut FeatureState,
    view: &mut R,
    device: &mut D,
) -> Result<bool, DashError> {
    let on = state.flip(feature);
    view.set_status(feature, status_label(on));
    dispatch(device, &Action::for_feature(feature, on)).await?;
    Ok(on)
}
