//! Mock Platform implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{Platform, PwmConfig},
    Result,
};

use super::{MockGpio, MockPwm};

/// Mock Platform implementation
///
/// Provides mock peripheral implementations for hardware-free runs.
///
/// # Example
///
/// ```
/// use line_trace_car::platform::mock::MockPlatform;
/// use line_trace_car::platform::traits::{Platform, PwmConfig, PwmInterface};
///
/// let mut platform = MockPlatform::new();
/// let mut pwm = platform.create_pwm(18, PwmConfig::servo(0.075)).unwrap();
/// pwm.set_duty_cycle(0.05).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockPlatform {
    allocated: Vec<u8>,
}

impl MockPlatform {
    /// Create a new mock platform
    pub fn new() -> Self {
        Self {
            allocated: Vec::new(),
        }
    }

    /// Maximum GPIO pin number (BCM numbering on a 40-pin header)
    pub const MAX_GPIO: u8 = 27;

    fn claim(&mut self, pin: u8) -> Result<()> {
        if pin > Self::MAX_GPIO {
            return Err(PlatformError::Gpio(GpioError::InvalidPin));
        }
        if self.allocated.contains(&pin) {
            return Err(PlatformError::Gpio(GpioError::PinInUse));
        }
        self.allocated.push(pin);
        Ok(())
    }

    /// Pins handed out so far
    pub fn allocated_pins(&self) -> &[u8] {
        &self.allocated
    }
}

impl Platform for MockPlatform {
    type Pwm = MockPwm;
    type Gpio = MockGpio;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn create_pwm(&mut self, pin: u8, config: PwmConfig) -> Result<Self::Pwm> {
        self.claim(pin)?;
        Ok(MockPwm::new(pin, config))
    }

    fn create_gpio_output(&mut self, pin: u8) -> Result<Self::Gpio> {
        self.claim(pin)?;
        Ok(MockGpio::new_output(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::traits::PwmInterface;

    #[test]
    fn test_create_pwm() {
        let mut platform = MockPlatform::new();
        let pwm = platform.create_pwm(12, PwmConfig::motor(1000)).unwrap();
        assert_eq!(pwm.pin(), 12);
        assert_eq!(pwm.frequency(), 1000);
        assert_eq!(platform.allocated_pins(), &[12]);
    }

    #[test]
    fn test_pin_in_use() {
        let mut platform = MockPlatform::new();
        platform.create_gpio_output(5).unwrap();
        let result = platform.create_pwm(5, PwmConfig::default());
        assert_eq!(
            result.map(|_| ()),
            Err(PlatformError::Gpio(GpioError::PinInUse))
        );
    }

    #[test]
    fn test_invalid_pin() {
        let mut platform = MockPlatform::new();
        let result = platform.create_gpio_output(40);
        assert_eq!(
            result.map(|_| ()),
            Err(PlatformError::Gpio(GpioError::InvalidPin))
        );
    }
}
