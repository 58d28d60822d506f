//! Telemetry Poller
//!
//! Fetches `/data`, renders it, then waits a fixed period and goes again.
//! The period does not depend on whether the cycle worked: a failed fetch is
//! reported and the next one happens on schedule. There is no backoff and at
//! most one fetch is in flight.
//!
//! ```text
//! Idle -> Fetching -> Rendering -> Scheduled -> Fetching -> ...
//!                  \-> Failed ---/
//! ```

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acceleration::acceleration;
use crate::device::Device;
use crate::diagnostics::DiagnosticSink;
use crate::error::DashError;
use crate::format::format_value;
use crate::layout::GaugeKind;
use crate::render::Renderer;
use crate::state::{status_label, Feature, FeatureState};
use crate::telemetry::TelemetrySnapshot;

/// Delay between the end of one cycle and the start of the next
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Where the poll loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollState {
    /// Not started yet
    Idle,
    /// Waiting on `/data`
    Fetching,
    /// Applying a snapshot
    Rendering,
    /// Last fetch or decode failed
    Failed,
    /// Waiting for the next cycle
    Scheduled,
}

/// What a rendered snapshot touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    /// Stat fields written
    pub rendered: usize,
    /// Snapshot keys with no stat field
    pub skipped: usize,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Snapshot fetched and drawn
    Rendered(RenderSummary),
    /// Fetch or decode failed and was reported
    Failed,
}

/// Run a device request, failing with [`DashError::Timeout`] after `timeout`
///
/// `None` waits indefinitely.
pub async fn with_timeout<T, F>(
    timeout: Option<Duration>,
    endpoint: &str,
    request: F,
) -> Result<T, DashError>
where
    F: Future<Output = Result<T, DashError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .map_err(|_| DashError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => request.await,
    }
}

/// Apply a snapshot to the feature state, gauges, status labels and stat fields
///
/// The snapshot is validated first; a decode error leaves everything untouched.
pub fn render_snapshot<R: Renderer>(
    snapshot: &TelemetrySnapshot,
    features: &mut FeatureState,
    view: &mut R,
) -> Result<RenderSummary, DashError> {
    snapshot.validate()?;
    let speed = snapshot.speed_kmh()?;
    let soc = snapshot.soc()?;
    let accel = acceleration(snapshot.throttle()?, snapshot.brake()?);

    *features = FeatureState::from_snapshot(snapshot);
    for feature in Feature::ALL {
        view.set_status(feature, status_label(features.get(feature)));
    }

    let gauges = view.gauges();
    gauges.update(GaugeKind::Speed, speed);
    gauges.update(GaugeKind::Battery, soc);
    gauges.update(GaugeKind::Acceleration, accel);

    let mut summary = RenderSummary::default();
    for (key, value) in snapshot.iter() {
        match view.stat_scale(key) {
            Some(scale) => {
                let text = format_value(value, &scale);
                view.set_stat(key, &text);
                summary.rendered += 1;
            }
            None => summary.skipped += 1,
        }
    }

    Ok(summary)
}

/// Owns the fetch/render cycle for `/data`
#[derive(Debug, Clone)]
pub struct TelemetryPoller {
    interval: Duration,
    request_timeout: Option<Duration>,
    state: PollState,
    cycles: u64,
    failures: u64,
}

impl Default for TelemetryPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl TelemetryPoller {
    /// Poller that waits `interval` between cycles
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            request_timeout: None,
            state: PollState::Idle,
            cycles: 0,
            failures: 0,
        }
    }

    /// Give up on a `/data` request after `timeout`
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Delay between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Per-request timeout, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Current loop state
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Cycles completed, successful or not
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycles that ended in a reported failure
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// One fetch/render cycle; ends in [`PollState::Scheduled`] either way
    pub async fn poll_once<D, R, S>(
        &mut self,
        device: &mut D,
        view: &mut R,
        features: &mut FeatureState,
        sink: &mut S,
    ) -> PollOutcome
    where
        D: Device,
        R: Renderer,
        S: DiagnosticSink,
    {
        self.state = PollState::Fetching;
        let fetched = with_timeout(self.request_timeout, "/data", device.fetch_data()).await;

        let outcome = match fetched.and_then(|snapshot| {
            self.state = PollState::Rendering;
            render_snapshot(&snapshot, features, view)
        }) {
            Ok(summary) => {
                debug!(
                    "Rendered telemetry: {} fields shown, {} without target",
                    summary.rendered, summary.skipped
                );
                PollOutcome::Rendered(summary)
            }
            Err(err) => {
                self.state = PollState::Failed;
                self.failures += 1;
                sink.report("telemetry poll", &err);
                PollOutcome::Failed
            }
        };

        self.cycles += 1;
        self.state = PollState::Scheduled;
        outcome
    }

    /// Poll forever at a fixed period
    pub async fn run<D, R, S>(
        &mut self,
        device: &mut D,
        view: &mut R,
        features: &mut FeatureState,
        sink: &mut S,
    ) where
        D: Device,
        R: Renderer,
        S: DiagnosticSink,
    {
        loop {
            self.poll_once(device, view, features, sink).await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
