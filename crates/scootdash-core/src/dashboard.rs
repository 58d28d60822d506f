//! Dashboard session
//!
//! Ties a device, a view and a diagnostic sink together and owns the feature
//! state. Every public operation is a failure boundary: errors are handed to
//! the sink and never escape, so the poll loop keeps running whatever happens.

use std::time::Duration;

use tracing::info;

use crate::actions::{self, Action};
use crate::config_sync::{self, ConfigSnapshot};
use crate::device::Device;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::poller::{with_timeout, PollOutcome, TelemetryPoller, DEFAULT_POLL_INTERVAL};
use crate::render::{ConfigForm, Renderer};
use crate::state::{Feature, FeatureState};

/// A running dashboard
pub struct Dashboard<D, V, S = TracingSink> {
    device: D,
    view: V,
    sink: S,
    features: FeatureState,
    poller: TelemetryPoller,
    request_timeout: Option<Duration>,
}

impl<D, V> Dashboard<D, V, TracingSink>
where
    D: Device,
    V: Renderer + ConfigForm,
{
    /// Dashboard that logs failures through `tracing`
    pub fn new(device: D, view: V) -> Self {
        Self::with_sink(device, view, TracingSink)
    }
}

impl<D, V, S> Dashboard<D, V, S>
where
    D: Device,
    V: Renderer + ConfigForm,
    S: DiagnosticSink,
{
    /// Dashboard that reports failures to `sink`
    pub fn with_sink(device: D, view: V, sink: S) -> Self {
        Self {
            device,
            view,
            sink,
            features: FeatureState::default(),
            poller: TelemetryPoller::new(DEFAULT_POLL_INTERVAL),
            request_timeout: None,
        }
    }

    /// Delay between telemetry cycles
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = TelemetryPoller::new(interval).with_request_timeout(self.request_timeout);
        self
    }

    /// Bound every device request; `None` waits forever
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self.poller = TelemetryPoller::new(self.poller.interval()).with_request_timeout(timeout);
        self
    }

    /// Feature flags as last rendered or toggled
    pub fn features(&self) -> FeatureState {
        self.features
    }

    /// The view being drawn into
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable view, for operator edits
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// The device being polled
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Where failures are reported
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Poll loop state and counters
    pub fn poller(&self) -> &TelemetryPoller {
        &self.poller
    }

    /// Draw the gauges once and load the config form
    pub async fn start(&mut self) -> Option<ConfigSnapshot> {
        self.view.gauges().draw_all();
        self.load_config().await
    }

    /// One telemetry cycle
    pub async fn poll_once(&mut self) -> PollOutcome {
        self.poller
            .poll_once(
                &mut self.device,
                &mut self.view,
                &mut self.features,
                &mut self.sink,
            )
            .await
    }

    /// Poll forever at the configured period
    pub async fn run(&mut self) {
        self.poller
            .run(
                &mut self.device,
                &mut self.view,
                &mut self.features,
                &mut self.sink,
            )
            .await
    }

    /// Flip a feature optimistically and send it to the device
    ///
    /// Returns the requested value.
    pub async fn toggle(&mut self, feature: Feature) -> bool {
        let requested = !self.features.get(feature);
        let path = Action::for_feature(feature, requested).path();
        let result = with_timeout(
            self.request_timeout,
            &path,
            actions::toggle(feature, &mut self.features, &mut self.view, &mut self.device),
        )
        .await;

        if let Err(err) = result {
            self.sink.report("action", &err);
        }
        requested
    }

    /// Ask the device to change its speed limit
    pub async fn set_max_speed(&mut self, kmh: u32) -> bool {
        let action = match Action::max_speed(kmh) {
            Ok(action) => action,
            Err(err) => {
                self.sink.report("action", &err);
                return false;
            }
        };

        let path = action.path();
        match with_timeout(
            self.request_timeout,
            &path,
            actions::dispatch(&mut self.device, &action),
        )
        .await
        {
            Ok(()) => true,
            Err(err) => {
                self.sink.report("action", &err);
                false
            }
        }
    }

    /// Fetch `/config` into the form; `None` when it failed
    pub async fn load_config(&mut self) -> Option<ConfigSnapshot> {
        let result = with_timeout(
            self.request_timeout,
            "/config",
            config_sync::load_config(&mut self.device, &mut self.view),
        )
        .await;
        self.settle_config("config load", result)
    }

    /// Write the form to the device and reload the accepted values
    pub async fn save_config(&mut self) -> Option<ConfigSnapshot> {
        let result = with_timeout(
            self.request_timeout,
            "/updateConfig",
            config_sync::save_config(&mut self.device, &mut self.view),
        )
        .await;
        self.settle_config("config save", result)
    }

    fn settle_config(
        &mut self,
        context: &str,
        result: Result<ConfigSnapshot, crate::error::DashError>,
    ) -> Option<ConfigSnapshot> {
        match result {
            Ok(config) => {
                info!("Loaded {} config values", config.len());
                Some(config)
            }
            Err(err) => {
                self.sink.report(context, &err);
                None
            }
        }
    }
}
