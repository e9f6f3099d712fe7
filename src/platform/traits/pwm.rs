//! PWM interface trait
//!
//! This module defines the PWM output interface that platform implementations must provide.

use crate::platform::Result;

/// PWM channel configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmConfig {
    /// Carrier frequency in Hz
    pub frequency: u32,
    /// Initial duty cycle as fraction [0.0, 1.0]
    pub duty_cycle: f32,
}

impl PwmConfig {
    /// 50 Hz servo carrier starting at the given duty fraction
    pub fn servo(duty_cycle: f32) -> Self {
        Self {
            frequency: 50,
            duty_cycle,
        }
    }

    /// Motor carrier at `frequency` Hz starting at 0%
    pub fn motor(frequency: u32) -> Self {
        Self {
            frequency,
            duty_cycle: 0.0,
        }
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency: 50,
            duty_cycle: 0.0,
        }
    }
}

/// PWM interface trait
///
/// # Safety Invariants
///
/// - Only one owner per PWM channel instance
/// - Duty cycle is always a fraction in [0.0, 1.0]
pub trait PwmInterface {
    /// Set duty cycle as a fraction [0.0, 1.0]
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidDutyCycle)` for values
    /// outside [0.0, 1.0] and `PwmError::WriteFailed` if the hardware write fails.
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()>;

    /// Current duty cycle fraction
    fn duty_cycle(&self) -> f32;

    /// Set carrier frequency in Hz
    fn set_frequency(&mut self, frequency: u32) -> Result<()>;

    /// Current carrier frequency in Hz
    fn frequency(&self) -> u32;

    /// Start driving the output
    fn enable(&mut self);

    /// Stop driving the output (line held low)
    fn disable(&mut self);

    /// Whether the output is being driven
    fn is_enabled(&self) -> bool;
}
