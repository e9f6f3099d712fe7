//! Raspberry Pi PWM implementation
//!
//! Software PWM on a GPIO output pin via `rppal`.

use crate::platform::{
    error::{PlatformError, PwmError},
    traits::{PwmConfig, PwmInterface},
    Result,
};
use rppal::gpio::OutputPin;

/// Raspberry Pi software PWM
///
/// Wraps an `rppal` output pin. Duty cycle and frequency are applied
/// together on every change, matching how `rppal` programs software PWM.
pub struct RpiPwm {
    pin: OutputPin,
    duty_cycle: f32,
    frequency: u32,
    enabled: bool,
}

impl RpiPwm {
    /// Create a new PWM output on an already-claimed pin
    ///
    /// The output starts disabled with the line held low.
    pub fn new(pin: OutputPin, config: PwmConfig) -> Self {
        Self {
            pin,
            duty_cycle: config.duty_cycle,
            frequency: config.frequency,
            enabled: false,
        }
    }

    fn apply(&mut self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.pin
            .set_pwm_frequency(self.frequency as f64, self.duty_cycle as f64)
            .map_err(|_| PlatformError::Pwm(PwmError::WriteFailed))
    }
}

impl PwmInterface for RpiPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PlatformError::Pwm(PwmError::InvalidDutyCycle));
        }
        self.duty_cycle = duty_cycle;
        self.apply()
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    fn set_frequency(&mut self, frequency: u32) -> Result<()> {
        if frequency == 0 {
            return Err(PlatformError::Pwm(PwmError::InvalidFrequency));
        }
        self.frequency = frequency;
        self.apply()
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn enable(&mut self) {
        self.enabled = true;
        if self.apply().is_err() {
            crate::log_warn!("PWM on GPIO{} failed to start", self.pin.pin());
        }
    }

    fn disable(&mut self) {
        self.enabled = false;
        let _ = self.pin.clear_pwm();
        self.pin.set_low();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
