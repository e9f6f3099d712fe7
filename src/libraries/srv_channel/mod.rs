//! Steering servo output
//!
//! Drives a hobby servo on a 50 Hz PWM carrier. Callers work in duty
//! percent (2.5% at 0°, 12.5% at 180°); the channel converts to the
//! fractional duty the platform PWM expects.
//!
//! A duty of 0 stops the pulse train entirely, which releases the servo
//! (no holding torque, no jitter at rest).

use line_trace_car_core::servo::duty_to_pulse_us;

use crate::platform::{PwmInterface, Result};

/// Steering servo on one PWM channel
pub struct SteeringServo<P: PwmInterface> {
    pwm: P,
    duty_percent: f32,
}

impl<P: PwmInterface> SteeringServo<P> {
    /// Wrap a PWM channel and start the carrier
    pub fn new(mut pwm: P) -> Self {
        let duty_percent = pwm.duty_cycle() * 100.0;
        pwm.enable();
        Self { pwm, duty_percent }
    }

    /// Write a duty cycle in percent
    ///
    /// The value is clamped to [0, 100]; the recorded duty only changes if
    /// the write succeeds.
    pub fn set_duty_percent(&mut self, percent: f32) -> Result<()> {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.pwm.set_duty_cycle(percent / 100.0)?;
        self.duty_percent = percent;

        crate::log_trace!(
            "Servo duty {:.2}% ({} us)",
            percent,
            duty_to_pulse_us(percent, self.pwm.frequency() as f32)
        );
        Ok(())
    }

    /// Last duty written, in percent
    pub fn duty_percent(&self) -> f32 {
        self.duty_percent
    }

    /// Stop the pulse train and disable the channel
    pub fn release(&mut self) -> Result<()> {
        let result = self.pwm.set_duty_cycle(0.0);
        self.pwm.disable();
        self.duty_percent = 0.0;
        result
    }

    /// Underlying PWM channel
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Mutable underlying PWM channel
    pub fn pwm_mut(&mut self) -> &mut P {
        &mut self.pwm
    }
}
