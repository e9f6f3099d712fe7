//! GPIO interface trait
//!
//! This module defines the digital output interface used for H-bridge
//! direction pins.

use crate::platform::Result;

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Output mode (push-pull)
    OutputPushPull,
}

/// GPIO interface trait
///
/// # Safety Invariants
///
/// - GPIO pin must be initialized before use
/// - Only one owner per GPIO pin instance
/// - Pin number must be valid for the platform
pub trait GpioInterface {
    /// Set GPIO pin high (logic level 1)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin
    /// is not configured as an output.
    fn set_high(&mut self) -> Result<()>;

    /// Set GPIO pin low (logic level 0)
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::InvalidMode)` if the pin
    /// is not configured as an output.
    fn set_low(&mut self) -> Result<()>;

    /// Drive the pin to the given level
    fn set_level(&mut self, high: bool) -> Result<()> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    /// Read GPIO pin state
    ///
    /// Returns `true` if the pin is high, `false` if low.
    fn read(&self) -> bool;

    /// Get current GPIO pin mode
    fn mode(&self) -> GpioMode;
}
