use scootdash_core::acceleration::{acceleration, BRAKE_HIGH, LEVER_LOW, THROTTLE_HIGH};

#[test]
fn test_constants_match_controller_calibration() {
    assert_eq!(LEVER_LOW, 0x2C);
    assert_eq!(BRAKE_HIGH, 0xB5);
    assert_eq!(THROTTLE_HIGH, 0xC5);
}

#[test]
fn test_braking_is_never_positive() {
    for throttle in 0u8..=255 {
        for brake in (throttle.saturating_add(1)..=255).step_by(7) {
            if brake <= throttle || brake < LEVER_LOW {
                continue;
            }
            let a = acceleration(f64::from(throttle), f64::from(brake));
            assert!(a <= 0.0, "throttle {} brake {} gave {}", throttle, brake, a);
        }
    }
}

#[test]
fn test_throttle_is_never_negative_above_floor() {
    for throttle in LEVER_LOW..=255 {
        for brake in (0..=throttle).step_by(5) {
            let a = acceleration(f64::from(throttle), f64::from(brake));
            assert!(a >= 0.0, "throttle {} brake {} gave {}", throttle, brake, a);
        }
    }
}

#[test]
fn test_equal_inputs_use_throttle_scale() {
    let half = f64::from(LEVER_LOW) + (f64::from(THROTTLE_HIGH) - f64::from(LEVER_LOW)) / 2.0;
    assert!((acceleration(half, half) - 0.5).abs() < 1e-12);
}

#[test]
fn test_half_brake() {
    let half = f64::from(LEVER_LOW) + (f64::from(BRAKE_HIGH) - f64::from(LEVER_LOW)) / 2.0;
    assert!((acceleration(f64::from(LEVER_LOW), half) + 0.5).abs() < 1e-12);
}

#[test]
fn test_out_of_range_readings_are_not_clamped() {
    assert!(acceleration(255.0, 0.0) > 1.0);
    assert!(acceleration(0.0, 255.0) < -1.0);
}
