//! Root platform trait
//!
//! This module defines the root Platform trait that hands out the PWM and
//! GPIO outputs the actuator port is built from.

use super::{GpioInterface, PwmConfig, PwmInterface};
use crate::platform::Result;

/// Root platform trait
///
/// Platform implementations provide concrete types for each peripheral
/// interface via associated types, so the actuator port is monomorphized
/// per platform.
///
/// # Example
///
/// ```ignore
/// impl Platform for RpiPlatform {
///     type Pwm = RpiPwm;
///     type Gpio = RpiGpio;
///
///     fn create_pwm(&mut self, pin: u8, config: PwmConfig) -> Result<Self::Pwm> {
///         // Claim the pin and start software PWM
///     }
///
///     // ... other methods
/// }
/// ```
pub trait Platform {
    /// PWM peripheral type
    type Pwm: PwmInterface;

    /// GPIO peripheral type
    type Gpio: GpioInterface;

    /// Platform name for logs
    fn name(&self) -> &'static str;

    /// Create a PWM output on `pin`
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::PinInUse)` if the pin is
    /// already claimed, or `PlatformError::Pwm` if the channel cannot be
    /// configured.
    fn create_pwm(&mut self, pin: u8, config: PwmConfig) -> Result<Self::Pwm>;

    /// Create a push-pull output on `pin`, initially low
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::PinInUse)` if the pin is
    /// already claimed.
    fn create_gpio_output(&mut self, pin: u8) -> Result<Self::Gpio>;
}
