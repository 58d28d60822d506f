//! Demo Mode - simulated scooter for running the dashboard without hardware
//!
//! Rides stop-and-go: accelerate to a random cruise speed, hold it, brake to
//! a stop, wait, repeat. Battery drains with distance, the odometer and the
//! operating time count up, and actions/config writes are honoured the way
//! the display firmware honours them.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::acceleration::{BRAKE_HIGH, LEVER_LOW, THROTTLE_HIGH};
use crate::actions::{Action, MAX_MAX_SPEED, MIN_MAX_SPEED};
use crate::config_sync::{ConfigSnapshot, ConfigValue};
use crate::device::Device;
use crate::error::DashError;
use crate::telemetry::{TelemetrySnapshot, TelemetryValue};

/// Speed cap while eco mode is on (km/h)
const ECO_SPEED_KMH: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RidePhase {
    /// Standing still
    Stopped { until_ms: u64 },
    /// Throttle open, speeding up
    Accelerating,
    /// Holding speed
    Cruising { until_ms: u64 },
    /// Brake pulled, slowing down
    Braking,
}

/// Simulated display module
pub struct DemoDevice {
    /// Time of the previous update (ms)
    last_update_ms: Option<u64>,
    phase: RidePhase,
    /// Current speed (km/h)
    speed_kmh: f64,
    /// Cruise target of the current ride (km/h)
    target_kmh: f64,
    /// Remaining charge (%)
    soc: f64,
    /// Distance (m)
    odometer_m: f64,
    /// Lifetime operating time before this session (s)
    base_operation_s: u64,
    lights: bool,
    eco_mode: bool,
    locked: bool,
    max_speed_kmh: u32,
    config: BTreeMap<String, ConfigValue>,
    /// Origin for [`Device::fetch_data`] timestamps
    started: tokio::time::Instant,
    rng: StdRng,
}

impl Default for DemoDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoDevice {
    /// Simulation seeded from the OS
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible simulation
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let first_ride = rng.gen_range(1000..3000);
        let mut config = BTreeMap::new();
        config.insert("lock-pin".to_string(), ConfigValue::Text("40213".to_string()));
        config.insert("lock-on-boot".to_string(), ConfigValue::Bool(true));
        config.insert("max-speed".to_string(), ConfigValue::Number(20.0));
        config.insert("reenable-lights".to_string(), ConfigValue::Bool(true));
        config.insert("show-intro".to_string(), ConfigValue::Bool(true));

        Self {
            last_update_ms: None,
            phase: RidePhase::Stopped {
                until_ms: first_ride,
            },
            speed_kmh: 0.0,
            target_kmh: 0.0,
            soc: 87.0,
            odometer_m: 7320.0,
            base_operation_s: 41_230,
            lights: false,
            eco_mode: false,
            locked: false,
            max_speed_kmh: 20,
            config,
            started: tokio::time::Instant::now(),
            rng,
        }
    }

    /// Speed limit in km/h
    pub fn max_speed_kmh(&self) -> u32 {
        self.max_speed_kmh
    }

    /// Headlight flag
    pub fn lights(&self) -> bool {
        self.lights
    }

    /// Eco mode flag
    pub fn eco_mode(&self) -> bool {
        self.eco_mode
    }

    /// Lock flag
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn speed_cap(&self) -> f64 {
        let cap = f64::from(self.max_speed_kmh);
        if self.eco_mode {
            cap.min(ECO_SPEED_KMH)
        } else {
            cap
        }
    }

    /// Advance the simulation and produce a telemetry snapshot
    ///
    /// # Arguments
    /// * `elapsed_ms` - Milliseconds since the simulation started
    pub fn update(&mut self, elapsed_ms: u64) -> TelemetrySnapshot {
        let delta_ms = self
            .last_update_ms
            .map(|last| elapsed_ms.saturating_sub(last))
            .unwrap_or(0);
        self.last_update_ms = Some(elapsed_ms);
        let dt = delta_ms as f64 / 1000.0;

        self.update_phase(elapsed_ms);

        let (throttle, brake) = match self.phase {
            RidePhase::Stopped { .. } => (f64::from(LEVER_LOW), f64::from(LEVER_LOW)),
            RidePhase::Accelerating => {
                self.speed_kmh = (self.speed_kmh + 4.0 * dt).min(self.target_kmh);
                (f64::from(THROTTLE_HIGH) - 20.0, f64::from(LEVER_LOW))
            }
            RidePhase::Cruising { .. } => {
                let wobble = self.rng.gen_range(-0.3..0.3);
                self.speed_kmh = (self.speed_kmh + wobble).clamp(0.0, self.speed_cap());
                (f64::from(LEVER_LOW) + 60.0, f64::from(LEVER_LOW))
            }
            RidePhase::Braking => {
                self.speed_kmh = (self.speed_kmh - 8.0 * dt).max(0.0);
                (f64::from(LEVER_LOW), f64::from(BRAKE_HIGH) - 30.0)
            }
        };

        let distance_m = self.speed_kmh / 3.6 * dt;
        self.odometer_m += distance_m;
        // roughly 25 km per charge
        self.soc = (self.soc - distance_m / 250.0).max(0.0);

        let current = if matches!(self.phase, RidePhase::Accelerating) {
            1250.0
        } else if self.speed_kmh > 0.0 {
            420.0
        } else {
            15.0
        };
        let voltage = 3300.0 + 8.0 * self.soc;
        let uptime_s = elapsed_ms / 1000;

        TelemetrySnapshot::from_fields([
            ("throttle", TelemetryValue::Number(throttle.round())),
            ("brake", TelemetryValue::Number(brake.round())),
            ("ecoMode", bool_flag(self.eco_mode)),
            ("shuttingDown", bool_flag(false)),
            ("lights", bool_flag(self.lights)),
            ("buttonPress", bool_flag(false)),
            ("errorCode", TelemetryValue::Number(0.0)),
            ("soc", TelemetryValue::Number(self.soc.round())),
            ("speed", TelemetryValue::Number((self.speed_kmh * 1000.0).round())),
            (
                "totalOperationTime",
                TelemetryValue::Number((self.base_operation_s + uptime_s) as f64),
            ),
            ("timeSinceBoot", TelemetryValue::Number(uptime_s as f64)),
            ("voltage", TelemetryValue::Number(voltage.round())),
            ("current", TelemetryValue::Number(current)),
            ("mainboardVersion", TelemetryValue::Number(292.0)),
            ("odometer", TelemetryValue::Number(self.odometer_m.round())),
            ("temperature", TelemetryValue::Number(243.0)),
            ("isLocked", bool_flag(self.locked)),
        ])
    }

    fn update_phase(&mut self, now_ms: u64) {
        if self.locked {
            self.phase = RidePhase::Braking;
        }

        match self.phase {
            RidePhase::Stopped { until_ms } => {
                if now_ms >= until_ms && !self.locked {
                    let cap = self.speed_cap().max(1.0);
                    self.target_kmh = self.rng.gen_range((cap * 0.5)..=cap);
                    self.phase = RidePhase::Accelerating;
                }
            }
            RidePhase::Accelerating => {
                if self.speed_kmh >= self.target_kmh {
                    let hold = self.rng.gen_range(4000..10_000);
                    self.phase = RidePhase::Cruising {
                        until_ms: now_ms + hold,
                    };
                }
            }
            RidePhase::Cruising { until_ms } => {
                if now_ms >= until_ms {
                    self.phase = RidePhase::Braking;
                }
            }
            RidePhase::Braking => {
                if self.speed_kmh <= 0.0 {
                    let wait = self.rng.gen_range(2000..6000);
                    self.phase = RidePhase::Stopped {
                        until_ms: now_ms + wait,
                    };
                }
            }
        }
    }

    /// Apply an action the way the firmware does
    pub fn apply_action(&mut self, action: &Action) -> Result<(), DashError> {
        match *action {
            Action::SetLight(on) => self.lights = on,
            Action::SetEcoMode(on) => self.eco_mode = on,
            Action::SetLock(on) => self.locked = on,
            Action::SetMaxSpeed(kmh) => {
                if !(MIN_MAX_SPEED..=MAX_MAX_SPEED).contains(&kmh) {
                    return Err(DashError::Device("invalid speed".to_string()));
                }
                self.max_speed_kmh = kmh;
            }
        }
        Ok(())
    }

    /// Store submitted config fields, normalizing them like the firmware
    ///
    /// Unknown keys are ignored and the speed limit is clamped, so a reload
    /// may differ from what was submitted.
    pub fn apply_config(&mut self, pairs: &[(String, String)]) {
        for (key, raw) in pairs {
            let Some(current) = self.config.get(key) else {
                continue;
            };
            let value = match current {
                ConfigValue::Bool(_) => ConfigValue::Bool(raw == "true"),
                ConfigValue::Number(old) => {
                    ConfigValue::Number(raw.trim().parse::<f64>().unwrap_or(*old))
                }
                ConfigValue::Text(_) => ConfigValue::Text(raw.clone()),
            };
            self.config.insert(key.clone(), value);
        }

        if let Some(ConfigValue::Number(speed)) = self.config.get("max-speed").cloned() {
            let clamped = speed
                .round()
                .clamp(f64::from(MIN_MAX_SPEED), f64::from(MAX_MAX_SPEED));
            self.config
                .insert("max-speed".to_string(), ConfigValue::Number(clamped));
        }
    }

    /// What `/config` would return right now
    pub fn config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::from_values(self.config.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

fn bool_flag(on: bool) -> TelemetryValue {
    // the firmware prints its C++ bools as 0/1
    TelemetryValue::Number(if on { 1.0 } else { 0.0 })
}

impl Device for DemoDevice {
    async fn fetch_data(&mut self) -> Result<TelemetrySnapshot, DashError> {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        Ok(self.update(elapsed_ms))
    }

    async fn fetch_config(&mut self) -> Result<ConfigSnapshot, DashError> {
        Ok(self.config_snapshot())
    }

    async fn update_config(&mut self, pairs: &[(String, String)]) -> Result<(), DashError> {
        self.apply_config(pairs);
        Ok(())
    }

    async fn send_action(&mut self, action: &Action) -> Result<(), DashError> {
        if let Err(err) = self.apply_action(action) {
            // a real device answers 400 here, which the dashboard does not inspect
            tracing::debug!("Demo device rejected {}: {}", action.path(), err);
        }
        Ok(())
    }
}
