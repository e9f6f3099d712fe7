//! Servo angle and duty-cycle conversion for the steering servo
//!
//! This module provides platform-agnostic functions for steering control:
//! - Safe-band angle clamping (degrees)
//! - Angle to duty cycle conversion (hobby servo convention)
//! - Duty cycle to pulse width conversion for the 50 Hz carrier
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Writing the duty
//! cycle to a PWM channel belongs in the host crate.
//!
//! ## Safety
//!
//! **CRITICAL**: Every angle must pass through [`AngleBand::clamp`] before
//! [`angle_to_duty`]. The steering linkage binds outside the safe band.

/// Standard servo carrier frequency (Hz)
pub const SERVO_FREQUENCY_HZ: f32 = 50.0;

/// Duty cycle at 0° (percent)
pub const DUTY_AT_ZERO_DEG: f32 = 2.5;

/// Degrees per duty-cycle percent (180° spread over 10%)
pub const DEG_PER_DUTY_PERCENT: f32 = 18.0;

/// Lowest duty cycle ever written to the servo (percent)
pub const MIN_SERVO_DUTY: f32 = 2.0;

/// Highest duty cycle ever written to the servo (percent)
pub const MAX_SERVO_DUTY: f32 = 12.5;

/// Mechanical servo travel (degrees)
pub const SERVO_TRAVEL_DEG: f32 = 180.0;

/// Safe steering band in degrees
///
/// Defaults to [5°, 135°], the widest range the steering linkage tolerates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBand {
    min: f32,
    max: f32,
}

impl AngleBand {
    /// Create a band, normalizing it into [0°, 180°]
    ///
    /// An inverted band is swapped rather than rejected.
    pub fn new(min: f32, max: f32) -> Self {
        let min = sanitize_degrees(min, 0.0);
        let max = sanitize_degrees(max, SERVO_TRAVEL_DEG);
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Lower bound (degrees)
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound (degrees)
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Clamp an angle into the band
    ///
    /// NaN is mapped to the lower bound so a corrupt input can never
    /// reach the PWM channel.
    pub fn clamp(&self, angle: f32) -> f32 {
        if angle.is_nan() {
            return self.min;
        }
        angle.clamp(self.min, self.max)
    }

    /// Check whether an angle lies inside the band
    pub fn contains(&self, angle: f32) -> bool {
        (self.min..=self.max).contains(&angle)
    }
}

impl Default for AngleBand {
    fn default() -> Self {
        Self {
            min: 5.0,
            max: 135.0,
        }
    }
}

fn sanitize_degrees(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, SERVO_TRAVEL_DEG)
    }
}

/// Clamp an angle into the given safe band
pub fn clamp_angle(angle: f32, band: &AngleBand) -> f32 {
    band.clamp(angle)
}

/// Convert a servo angle to a PWM duty cycle
///
/// Uses the hobby-servo affine map `duty = 2.5 + angle / 18`, which
/// spreads [0°, 180°] over [2.5%, 12.5%]. The result is clamped to
/// [`MIN_SERVO_DUTY`, `MAX_SERVO_DUTY`].
///
/// # Arguments
///
/// * `angle` - Servo angle in degrees (already clamped to the safe band)
///
/// # Returns
///
/// Duty cycle in percent
pub fn angle_to_duty(angle: f32) -> f32 {
    let duty = DUTY_AT_ZERO_DEG + angle / DEG_PER_DUTY_PERCENT;
    if duty.is_nan() {
        return MIN_SERVO_DUTY;
    }
    duty.clamp(MIN_SERVO_DUTY, MAX_SERVO_DUTY)
}

/// Convert a duty cycle back to the servo angle it commands
///
/// Inverse of [`angle_to_duty`] within the unclamped range.
pub fn duty_to_angle(duty: f32) -> f32 {
    (duty - DUTY_AT_ZERO_DEG) * DEG_PER_DUTY_PERCENT
}

/// Convert duty cycle (percent) to pulse width (microseconds)
///
/// For 50 Hz PWM (20 ms period):
/// - 2.5% = 500 μs
/// - 7.5% = 1500 μs
/// - 12.5% = 2500 μs
pub fn duty_to_pulse_us(duty: f32, frequency_hz: f32) -> u32 {
    if frequency_hz <= 0.0 {
        return 0;
    }
    let period_us = 1_000_000.0 / frequency_hz;
    libm::roundf(period_us * duty / 100.0) as u32
}

/// Convert pulse width (microseconds) to duty cycle (percent)
///
/// Inverse of [`duty_to_pulse_us`].
pub fn pulse_us_to_duty(pulse_us: u32, frequency_hz: f32) -> f32 {
    let period_us = 1_000_000.0 / frequency_hz;
    pulse_us as f32 / period_us * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_duty() {
        assert!((angle_to_duty(0.0) - 2.5).abs() < 0.0001);
        assert!((angle_to_duty(90.0) - 7.5).abs() < 0.0001);
        assert!((angle_to_duty(180.0) - 12.5).abs() < 0.0001);
        assert!((angle_to_duty(45.0) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_angle_to_duty_clamp() {
        // Values outside [0, 180] land on the duty limits
        assert_eq!(angle_to_duty(-90.0), MIN_SERVO_DUTY);
        assert_eq!(angle_to_duty(400.0), MAX_SERVO_DUTY);
        assert_eq!(angle_to_duty(f32::NAN), MIN_SERVO_DUTY);
    }

    #[test]
    fn test_duty_to_angle_inverse() {
        for angle in [5.0, 60.0, 90.0, 120.0, 135.0] {
            assert!((duty_to_angle(angle_to_duty(angle)) - angle).abs() < 0.001);
        }
    }

    #[test]
    fn test_default_band() {
        let band = AngleBand::default();
        assert_eq!(band.min(), 5.0);
        assert_eq!(band.max(), 135.0);
        assert!(band.contains(90.0));
        assert!(!band.contains(150.0));
    }

    #[test]
    fn test_band_clamp() {
        let band = AngleBand::default();
        assert_eq!(clamp_angle(-20.0, &band), 5.0);
        assert_eq!(clamp_angle(90.0, &band), 90.0);
        assert_eq!(clamp_angle(170.0, &band), 135.0);
        assert_eq!(clamp_angle(f32::NAN, &band), 5.0);
        assert_eq!(clamp_angle(f32::INFINITY, &band), 135.0);
        assert_eq!(clamp_angle(f32::NEG_INFINITY, &band), 5.0);
    }

    #[test]
    fn test_band_clamp_monotonic() {
        let band = AngleBand::default();
        let mut previous = clamp_angle(-360.0, &band);
        let mut angle = -360.0;
        while angle <= 360.0 {
            let clamped = clamp_angle(angle, &band);
            assert!(clamped >= previous);
            assert!(band.contains(clamped));
            previous = clamped;
            angle += 0.5;
        }
    }

    #[test]
    fn test_band_normalization() {
        // Inverted bands are swapped
        let band = AngleBand::new(135.0, 5.0);
        assert_eq!(band.min(), 5.0);
        assert_eq!(band.max(), 135.0);

        // Bounds outside the mechanical travel are pulled in
        let band = AngleBand::new(-10.0, 200.0);
        assert_eq!(band.min(), 0.0);
        assert_eq!(band.max(), 180.0);
    }

    #[test]
    fn test_pulse_conversion() {
        assert_eq!(duty_to_pulse_us(7.5, SERVO_FREQUENCY_HZ), 1500);
        assert_eq!(duty_to_pulse_us(2.5, SERVO_FREQUENCY_HZ), 500);
        assert_eq!(duty_to_pulse_us(12.5, SERVO_FREQUENCY_HZ), 2500);
        assert_eq!(duty_to_pulse_us(7.5, 0.0), 0);
        assert!((pulse_us_to_duty(1500, SERVO_FREQUENCY_HZ) - 7.5).abs() < 0.0001);
    }
}
