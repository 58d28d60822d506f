mod common;

use std::time::Duration;

use common::{firmware_snapshot, ScriptedDevice};
use pretty_assertions::assert_eq;
use scootdash_core::actions::{self, Action};
use scootdash_core::dashboard::Dashboard;
use scootdash_core::diagnostics::RecordingSink;
use scootdash_core::layout::DashboardLayout;
use scootdash_core::state::{Feature, FeatureState};
use scootdash_core::view::MemoryView;

#[tokio::test(start_paused = true)]
async fn test_toggle_shows_on_before_device_answers() {
    let mut device = ScriptedDevice::new();
    device.hang_actions = true;
    let mut view = MemoryView::new(DashboardLayout::default());
    let mut features = FeatureState::default();
    assert!(!features.light);

    let pending = tokio::time::timeout(
        Duration::from_millis(50),
        actions::toggle(Feature::Light, &mut features, &mut view, &mut device),
    )
    .await;

    // the device never answered
    assert!(pending.is_err());
    assert!(features.light);
    assert_eq!(view.status(Feature::Light), Some("ON"));
    assert_eq!(device.actions, vec![Action::SetLight(true)]);
}

#[tokio::test]
async fn test_toggle_twice_sends_both_values() {
    let mut device = ScriptedDevice::new();
    let mut view = MemoryView::new(DashboardLayout::default());
    let mut features = FeatureState::default();

    actions::toggle(Feature::EcoMode, &mut features, &mut view, &mut device)
        .await
        .unwrap();
    actions::toggle(Feature::EcoMode, &mut features, &mut view, &mut device)
        .await
        .unwrap();

    assert_eq!(
        device.actions,
        vec![Action::SetEcoMode(true), Action::SetEcoMode(false)]
    );
    assert_eq!(view.status(Feature::EcoMode), Some("OFF"));
}

#[tokio::test]
async fn test_transport_failure_is_reported_and_poll_corrects() {
    let mut device = ScriptedDevice::new();
    device.fail_actions = true;
    // device still reports the lock as off
    device.push_data(firmware_snapshot(0.0, 70.0, 44.0, 44.0, false, false, false));

    let view = MemoryView::new(DashboardLayout::default());
    let mut dashboard = Dashboard::with_sink(device, view, RecordingSink::default());

    assert!(dashboard.toggle(Feature::Lock).await);
    assert!(dashboard.features().lock);
    assert_eq!(dashboard.view().status(Feature::Lock), Some("ON"));
    assert_eq!(dashboard.sink().last().unwrap().0, "action");

    dashboard.poll_once().await;
    assert!(!dashboard.features().lock);
    assert_eq!(dashboard.view().status(Feature::Lock), Some("OFF"));
}

#[tokio::test]
async fn test_toggle_starts_from_polled_state() {
    let mut device = ScriptedDevice::new();
    device.push_data(firmware_snapshot(0.0, 70.0, 44.0, 44.0, true, false, false));
    let view = MemoryView::new(DashboardLayout::default());
    let mut dashboard = Dashboard::with_sink(device, view, RecordingSink::default());

    dashboard.poll_once().await;
    assert!(dashboard.features().light);

    // light is on, so the toggle turns it off
    assert!(!dashboard.toggle(Feature::Light).await);
    assert_eq!(dashboard.device().actions, vec![Action::SetLight(false)]);
    assert!(dashboard.sink().is_empty());
}

#[tokio::test]
async fn test_max_speed_validated_before_sending() {
    let device = ScriptedDevice::new();
    let view = MemoryView::new(DashboardLayout::default());
    let mut dashboard = Dashboard::with_sink(device, view, RecordingSink::default());

    assert!(!dashboard.set_max_speed(40).await);
    assert!(dashboard.device().actions.is_empty());
    assert!(dashboard.sink().last().unwrap().1.contains("40"));

    assert!(dashboard.set_max_speed(25).await);
    assert_eq!(dashboard.device().actions, vec![Action::SetMaxSpeed(25)]);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_bounds_actions() {
    let mut device = ScriptedDevice::new();
    device.hang_actions = true;
    let view = MemoryView::new(DashboardLayout::default());
    let mut dashboard = Dashboard::with_sink(device, view, RecordingSink::default())
        .with_request_timeout(Some(Duration::from_millis(300)));

    assert!(dashboard.toggle(Feature::EcoMode).await);
    assert_eq!(dashboard.view().status(Feature::EcoMode), Some("ON"));
    assert!(dashboard.sink().last().unwrap().1.contains("timed out"));
}
