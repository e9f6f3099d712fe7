//! Mock PWM implementation for testing

use crate::platform::{
    error::{PlatformError, PwmError},
    traits::{PwmConfig, PwmInterface},
    Result,
};

/// Mock PWM implementation
///
/// Tracks PWM state (duty cycle, frequency, enabled) and every duty cycle
/// written, for test verification. Writes can be made to fail to simulate
/// a broken channel.
#[derive(Debug)]
pub struct MockPwm {
    pin: u8,
    duty_cycle: f32,
    frequency: u32,
    enabled: bool,
    history: Vec<f32>,
    fail_writes: bool,
}

impl MockPwm {
    /// Create a new mock PWM
    pub fn new(pin: u8, config: PwmConfig) -> Self {
        Self {
            pin,
            duty_cycle: config.duty_cycle,
            frequency: config.frequency,
            enabled: false,
            history: Vec::new(),
            fail_writes: false,
        }
    }

    /// Pin this channel was created on
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Every duty cycle successfully written, oldest first
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    /// Make subsequent duty cycle writes fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl PwmInterface for MockPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if self.fail_writes {
            return Err(PlatformError::Pwm(PwmError::WriteFailed));
        }
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PlatformError::Pwm(PwmError::InvalidDutyCycle));
        }
        self.duty_cycle = duty_cycle;
        self.history.push(duty_cycle);
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    fn set_frequency(&mut self, frequency: u32) -> Result<()> {
        if frequency == 0 {
            return Err(PlatformError::Pwm(PwmError::InvalidFrequency));
        }
        self.frequency = frequency;
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
