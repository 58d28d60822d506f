//! # ScootDash Core Library
//!
//! Core functionality for the ScootDash scooter telemetry dashboard.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Telemetry polling with fixed-period, failure-tolerant rescheduling
//! - Value formatting driven by per-field scale directives
//! - Acceleration derived from raw throttle/brake bytes
//! - Optimistic feature toggles and fire-and-forget device actions
//! - Config read/edit/write against the device web server
//! - A headless view and a simulated device for running without hardware
//!
//! ## Example
//!
//! ```rust,ignore
//! use scootdash_core::prelude::*;
//!
//! let device = HttpDevice::new("http://192.168.4.1");
//! let view = MemoryView::new(DashboardLayout::default());
//! let mut dashboard = Dashboard::new(device, view);
//!
//! dashboard.start().await;
//! dashboard.run().await;
//! ```

pub mod acceleration;
pub mod actions;
pub mod config_sync;
pub mod dashboard;
pub mod demo;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod layout;
pub mod poller;
pub mod render;
pub mod state;
pub mod telemetry;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::acceleration::acceleration;
    pub use crate::actions::Action;
    pub use crate::config_sync::{readable_pin, Button, ConfigSnapshot, ConfigValue};
    pub use crate::dashboard::Dashboard;
    pub use crate::demo::DemoDevice;
    pub use crate::device::{Device, HttpDevice};
    pub use crate::diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
    pub use crate::error::DashError;
    pub use crate::format::{format_value, ScaleDirective};
    pub use crate::layout::{ControlKind, DashboardLayout, GaugeKind};
    pub use crate::poller::{PollOutcome, PollState, TelemetryPoller};
    pub use crate::render::{ConfigForm, ControlValue, GaugeSet, GaugeWidget, Renderer};
    pub use crate::state::{Feature, FeatureState};
    pub use crate::telemetry::{TelemetrySnapshot, TelemetryValue};
    pub use crate::view::{MemoryGauge, MemoryView};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
