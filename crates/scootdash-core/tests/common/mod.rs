//! Shared test doubles

#![allow(dead_code)]

use std::collections::VecDeque;

use scootdash_core::actions::Action;
use scootdash_core::config_sync::{ConfigSnapshot, ConfigValue};
use scootdash_core::device::Device;
use scootdash_core::error::DashError;
use scootdash_core::telemetry::{TelemetrySnapshot, TelemetryValue};

/// Device that replays scripted replies and records every request
#[derive(Default)]
pub struct ScriptedDevice {
    /// `None` entries fail like a dropped connection
    pub data: VecDeque<Option<TelemetrySnapshot>>,
    /// Reply once the script runs out
    pub fallback: Option<TelemetrySnapshot>,
    pub fetch_times: Vec<tokio::time::Instant>,

    pub config: ConfigSnapshot,
    pub config_fails: bool,
    /// What the device reports after a write; defaults to echoing the form
    pub config_after_write: Option<ConfigSnapshot>,
    pub write_fails: bool,
    pub submitted: Vec<Vec<(String, String)>>,
    pub config_fetches: usize,

    pub actions: Vec<Action>,
    pub hang_actions: bool,
    pub fail_actions: bool,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_data(&mut self, snapshot: TelemetrySnapshot) {
        self.data.push_back(Some(snapshot));
    }

    pub fn push_failure(&mut self) {
        self.data.push_back(None);
    }

    pub fn data_fetches(&self) -> usize {
        self.fetch_times.len()
    }
}

fn dropped(endpoint: &str) -> DashError {
    DashError::Device(format!("connection reset while fetching {}", endpoint))
}

impl Device for ScriptedDevice {
    async fn fetch_data(&mut self) -> Result<TelemetrySnapshot, DashError> {
        self.fetch_times.push(tokio::time::Instant::now());
        match self.data.pop_front() {
            Some(Some(snapshot)) => Ok(snapshot),
            Some(None) => Err(dropped("/data")),
            None => self.fallback.clone().ok_or_else(|| dropped("/data")),
        }
    }

    async fn fetch_config(&mut self) -> Result<ConfigSnapshot, DashError> {
        self.config_fetches += 1;
        if self.config_fails {
            return Err(dropped("/config"));
        }
        Ok(self.config.clone())
    }

    async fn update_config(&mut self, pairs: &[(String, String)]) -> Result<(), DashError> {
        self.submitted.push(pairs.to_vec());
        if self.write_fails {
            return Err(dropped("/updateConfig"));
        }
        self.config = match self.config_after_write.take() {
            Some(accepted) => accepted,
            None => ConfigSnapshot::from_values(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), ConfigValue::Text(v.clone()))),
            ),
        };
        Ok(())
    }

    async fn send_action(&mut self, action: &Action) -> Result<(), DashError> {
        self.actions.push(*action);
        if self.hang_actions {
            std::future::pending::<()>().await;
        }
        if self.fail_actions {
            return Err(dropped(&action.path()));
        }
        Ok(())
    }
}

/// Telemetry as the firmware sends it, flags as 0/1
pub fn firmware_snapshot(
    speed: f64,
    soc: f64,
    throttle: f64,
    brake: f64,
    lights: bool,
    eco: bool,
    locked: bool,
) -> TelemetrySnapshot {
    let flag = |on: bool| TelemetryValue::Number(if on { 1.0 } else { 0.0 });
    TelemetrySnapshot::from_fields([
        ("speed", TelemetryValue::Number(speed)),
        ("soc", TelemetryValue::Number(soc)),
        ("throttle", TelemetryValue::Number(throttle)),
        ("brake", TelemetryValue::Number(brake)),
        ("lights", flag(lights)),
        ("ecoMode", flag(eco)),
        ("isLocked", flag(locked)),
        ("odometer", TelemetryValue::Number(7320.0)),
        ("totalOperationTime", TelemetryValue::Number(3725.0)),
    ])
}
