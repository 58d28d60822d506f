//! Renderer Adapter
//!
//! The dashboard never touches widgets directly. Gauges sit behind
//! [`GaugeWidget`], labeled fields behind [`Renderer`], and the config form
//! behind [`ConfigForm`].

use crate::format::ScaleDirective;
use crate::layout::{ControlKind, GaugeKind};
use crate::state::Feature;

/// An opaque gauge renderer: takes a value, redraws on request
pub trait GaugeWidget {
    /// Store a value without redrawing
    fn set_value(&mut self, value: f64);

    /// Last stored value
    fn value(&self) -> f64;

    /// Redraw with the stored value
    fn draw(&mut self);
}

/// One handle per physical gauge, created once at startup
#[derive(Debug, Clone)]
pub struct GaugeSet<G> {
    /// Speed gauge
    pub speed: G,
    /// Battery gauge
    pub battery: G,
    /// Acceleration gauge
    pub acceleration: G,
}

impl<G: GaugeWidget> GaugeSet<G> {
    /// Wrap the three gauge handles
    pub fn new(speed: G, battery: G, acceleration: G) -> Self {
        Self {
            speed,
            battery,
            acceleration,
        }
    }

    /// Gauge of a kind
    pub fn get(&self, kind: GaugeKind) -> &G {
        match kind {
            GaugeKind::Speed => &self.speed,
            GaugeKind::Battery => &self.battery,
            GaugeKind::Acceleration => &self.acceleration,
        }
    }

    /// Mutable gauge of a kind
    pub fn get_mut(&mut self, kind: GaugeKind) -> &mut G {
        match kind {
            GaugeKind::Speed => &mut self.speed,
            GaugeKind::Battery => &mut self.battery,
            GaugeKind::Acceleration => &mut self.acceleration,
        }
    }

    /// Set a gauge value and redraw it
    pub fn update(&mut self, kind: GaugeKind, value: f64) {
        let gauge = self.get_mut(kind);
        gauge.set_value(value);
        gauge.draw();
    }

    /// Redraw every gauge with its stored value
    pub fn draw_all(&mut self) {
        for kind in GaugeKind::ALL {
            self.get_mut(kind).draw();
        }
    }
}

/// Display targets the poller and the action dispatcher write into
pub trait Renderer {
    /// Gauge handle type
    type Gauge: GaugeWidget;

    /// The three dashboard gauges
    fn gauges(&mut self) -> &mut GaugeSet<Self::Gauge>;

    /// Set the ON/OFF label of a feature
    fn set_status(&mut self, feature: Feature, label: &str);

    /// Scale directive of the stat field bound to `key`, `None` when no field shows it
    fn stat_scale(&self, key: &str) -> Option<ScaleDirective>;

    /// Set the text of the stat field bound to `key`
    fn set_stat(&mut self, key: &str, text: &str);

    /// Show the lock code as button names
    fn set_readable_pin(&mut self, text: &str);
}

/// Current value held by a config control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    /// Checkbox state
    Checked(bool),
    /// Text input contents
    Text(String),
}

impl ControlValue {
    /// Form-encoded representation sent to `/updateConfig`
    pub fn to_form_value(&self) -> String {
        match self {
            ControlValue::Checked(b) => b.to_string(),
            ControlValue::Text(s) => s.clone(),
        }
    }
}

/// The editable config form
pub trait ConfigForm {
    /// Kind of the control bound to `key`, `None` when there is none
    fn control_kind(&self, key: &str) -> Option<ControlKind>;

    /// Set a checkbox; ignored when `key` has no control
    fn set_checked(&mut self, key: &str, checked: bool);

    /// Set a text input; ignored when `key` has no control
    fn set_text(&mut self, key: &str, text: &str);

    /// Every config control in document order
    fn controls(&self) -> Vec<(String, ControlValue)>;
}
