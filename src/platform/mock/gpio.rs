//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Mock GPIO implementation
///
/// Tracks pin state (high/low) and mode for test verification.
#[derive(Debug)]
pub struct MockGpio {
    pin: u8,
    state: bool,
    mode: GpioMode,
    fail_writes: bool,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode
    pub fn new_output(pin: u8) -> Self {
        Self {
            pin,
            state: false,
            mode: GpioMode::OutputPushPull,
            fail_writes: false,
        }
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input(pin: u8) -> Self {
        Self {
            pin,
            state: false,
            mode: GpioMode::Input,
            fail_writes: false,
        }
    }

    /// Pin number
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn write(&mut self, high: bool) -> Result<()> {
        if self.mode != GpioMode::OutputPushPull {
            return Err(PlatformError::Gpio(GpioError::InvalidMode));
        }
        if self.fail_writes {
            return Err(PlatformError::Gpio(GpioError::WriteFailed));
        }
        self.state = high;
        Ok(())
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.write(false)
    }

    fn read(&self) -> bool {
        self.state
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_gpio_output() {
        let mut gpio = MockGpio::new_output(5);
        assert!(!gpio.read());

        gpio.set_high().unwrap();
        assert!(gpio.read());

        gpio.set_low().unwrap();
        assert!(!gpio.read());

        gpio.set_level(true).unwrap();
        assert!(gpio.read());
    }

    #[test]
    fn test_mock_gpio_input_rejects_writes() {
        let mut gpio = MockGpio::new_input(6);
        assert_eq!(
            gpio.set_high(),
            Err(PlatformError::Gpio(GpioError::InvalidMode))
        );
        assert!(!gpio.read());
    }

    #[test]
    fn test_mock_gpio_fail_writes() {
        let mut gpio = MockGpio::new_output(5);
        gpio.set_fail_writes(true);
        assert_eq!(
            gpio.set_high(),
            Err(PlatformError::Gpio(GpioError::WriteFailed))
        );
        assert!(!gpio.read());
    }
}
