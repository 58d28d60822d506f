//! Acceleration from raw throttle/brake readings
//!
//! The controller reports the hall sensor bytes it forwards to the ECU.
//! Throttle spans `0x2C..=0xC5`, brake spans `0x2C..=0xB5`.

/// Resting byte for both levers
pub const LEVER_LOW: u8 = 0x2C;
/// Fully pulled brake lever
pub const BRAKE_HIGH: u8 = 0xB5;
/// Fully opened throttle
pub const THROTTLE_HIGH: u8 = 0xC5;

/// Normalized acceleration: positive for throttle, negative for brake
///
/// Not clamped. Readings outside the calibration range map outside `[-1, 1]`.
pub fn acceleration(throttle: f64, brake: f64) -> f64 {
    let low = f64::from(LEVER_LOW);
    if brake > throttle {
        -(brake - low) / (f64::from(BRAKE_HIGH) - low)
    } else {
        (throttle - low) / (f64::from(THROTTLE_HIGH) - low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_endpoints() {
        assert_eq!(acceleration(f64::from(LEVER_LOW), f64::from(LEVER_LOW)), 0.0);
        assert_eq!(acceleration(f64::from(THROTTLE_HIGH), f64::from(LEVER_LOW)), 1.0);
        assert_eq!(acceleration(f64::from(LEVER_LOW), f64::from(BRAKE_HIGH)), -1.0);
    }

    #[test]
    fn test_not_clamped() {
        assert!(acceleration(255.0, 0.0) > 1.0);
        assert!(acceleration(0.0, 255.0) < -1.0);
        assert!(acceleration(0.0, 0.0) < 0.0);
    }
}
