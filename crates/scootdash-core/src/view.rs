//! Headless dashboard view
//!
//! Keeps everything the dashboard renders in memory. The terminal front end
//! prints frames from it; tests inspect it.

use std::collections::HashMap;

use crate::format::ScaleDirective;
use crate::layout::{ControlKind, DashboardLayout, GaugeConfig, GaugeKind};
use crate::render::{ConfigForm, ControlValue, GaugeSet, GaugeWidget, Renderer};
use crate::state::Feature;

/// In-memory gauge that counts redraws
#[derive(Debug, Clone)]
pub struct MemoryGauge {
    /// Dial configuration
    pub config: GaugeConfig,
    value: f64,
    drawn_value: Option<f64>,
    draw_count: u64,
}

impl MemoryGauge {
    /// Undrawn gauge at value 0
    pub fn new(config: GaugeConfig) -> Self {
        Self {
            config,
            value: 0.0,
            drawn_value: None,
            draw_count: 0,
        }
    }

    /// Value shown by the last draw, `None` before the first one
    pub fn drawn_value(&self) -> Option<f64> {
        self.drawn_value
    }

    /// Number of redraws so far
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Position of the drawn value on the dial, 0.0..=1.0
    pub fn needle_fraction(&self) -> f64 {
        let span = self.config.max_value - self.config.min_value;
        if span <= 0.0 {
            return 0.0;
        }
        let v = self.drawn_value.unwrap_or(self.config.min_value);
        ((v - self.config.min_value) / span).clamp(0.0, 1.0)
    }
}

impl GaugeWidget for MemoryGauge {
    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn draw(&mut self) {
        self.drawn_value = Some(self.value);
        self.draw_count += 1;
    }
}

#[derive(Debug, Clone)]
struct Control {
    key: String,
    kind: ControlKind,
    value: ControlValue,
}

/// Dashboard view backed by plain memory
#[derive(Debug, Clone)]
pub struct MemoryView {
    layout: DashboardLayout,
    gauges: GaugeSet<MemoryGauge>,
    statuses: HashMap<Feature, String>,
    stats: HashMap<String, String>,
    controls: Vec<Control>,
    readable_pin: Option<String>,
}

impl MemoryView {
    /// View with empty labels and controls built from `layout`
    pub fn new(layout: DashboardLayout) -> Self {
        let gauge = |kind| {
            MemoryGauge::new(
                layout
                    .gauge(kind)
                    .cloned()
                    .unwrap_or_else(|| GaugeConfig::stock(kind)),
            )
        };
        let gauges = GaugeSet::new(
            gauge(GaugeKind::Speed),
            gauge(GaugeKind::Battery),
            gauge(GaugeKind::Acceleration),
        );

        let controls = layout
            .config_fields
            .iter()
            .map(|field| Control {
                key: field.key.clone(),
                kind: field.kind,
                value: match field.kind {
                    ControlKind::Checkbox => ControlValue::Checked(false),
                    ControlKind::Text => ControlValue::Text(String::new()),
                },
            })
            .collect();

        Self {
            layout,
            gauges,
            statuses: HashMap::new(),
            stats: HashMap::new(),
            controls,
            readable_pin: None,
        }
    }

    /// Layout the view was built from
    pub fn layout(&self) -> &DashboardLayout {
        &self.layout
    }

    /// Gauge of a kind
    pub fn gauge(&self, kind: GaugeKind) -> &MemoryGauge {
        self.gauges.get(kind)
    }

    /// Label currently shown for a feature, `None` until first rendered
    pub fn status(&self, feature: Feature) -> Option<&str> {
        self.statuses.get(&feature).map(String::as_str)
    }

    /// Text of a stat field, `None` until first rendered
    pub fn stat(&self, key: &str) -> Option<&str> {
        self.stats.get(key).map(String::as_str)
    }

    /// Value of a config control
    pub fn control(&self, key: &str) -> Option<&ControlValue> {
        self.controls.iter().find(|c| c.key == key).map(|c| &c.value)
    }

    /// Lock code as button names, `None` until a config load
    pub fn readable_pin(&self) -> Option<&str> {
        self.readable_pin.as_deref()
    }

    /// Operator edit of a control; text for checkboxes is read as a boolean
    pub fn edit_control(&mut self, key: &str, input: &str) -> bool {
        let Some(control) = self.controls.iter_mut().find(|c| c.key == key) else {
            return false;
        };
        control.value = match control.kind {
            ControlKind::Checkbox => ControlValue::Checked(matches!(
                input.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )),
            ControlKind::Text => ControlValue::Text(input.to_string()),
        };
        true
    }
}

impl Renderer for MemoryView {
    type Gauge = MemoryGauge;

    fn gauges(&mut self) -> &mut GaugeSet<MemoryGauge> {
        &mut self.gauges
    }

    fn set_status(&mut self, feature: Feature, label: &str) {
        self.statuses.insert(feature, label.to_string());
    }

    fn stat_scale(&self, key: &str) -> Option<ScaleDirective> {
        self.layout.stat(key).map(|s| s.scale)
    }

    fn set_stat(&mut self, key: &str, text: &str) {
        self.stats.insert(key.to_string(), text.to_string());
    }

    fn set_readable_pin(&mut self, text: &str) {
        self.readable_pin = Some(text.to_string());
    }
}

impl ConfigForm for MemoryView {
    fn control_kind(&self, key: &str) -> Option<ControlKind> {
        self.controls.iter().find(|c| c.key == key).map(|c| c.kind)
    }

    fn set_checked(&mut self, key: &str, checked: bool) {
        if let Some(control) = self.controls.iter_mut().find(|c| c.key == key) {
            control.value = ControlValue::Checked(checked);
        }
    }

    fn set_text(&mut self, key: &str, text: &str) {
        if let Some(control) = self.controls.iter_mut().find(|c| c.key == key) {
            control.value = ControlValue::Text(text.to_string());
        }
    }

    fn controls(&self) -> Vec<(String, ControlValue)> {
        self.controls
            .iter()
            .map(|c| (c.key.clone(), c.value.clone()))
            .collect()
    }
}
