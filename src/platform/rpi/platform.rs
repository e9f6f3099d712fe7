//! Raspberry Pi platform

use rppal::gpio::{Error as GpioHalError, Gpio};

use super::{RpiGpio, RpiPwm};
use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{Platform, PwmConfig},
    Result,
};

/// Raspberry Pi platform
///
/// Owns the `rppal` GPIO handle. Pins are claimed on creation and released
/// when the returned peripheral is dropped.
pub struct RpiPlatform {
    gpio: Gpio,
}

impl RpiPlatform {
    /// Open the GPIO peripheral
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::InitializationFailed` when `/dev/gpiomem` is
    /// not accessible.
    pub fn init() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| PlatformError::InitializationFailed(e.to_string()))?;
        crate::log_info!("Raspberry Pi GPIO opened");
        Ok(Self { gpio })
    }

    fn claim(&self, pin: u8) -> Result<rppal::gpio::OutputPin> {
        let pin = self.gpio.get(pin).map_err(map_gpio_error)?;
        Ok(pin.into_output_low())
    }
}

fn map_gpio_error(err: GpioHalError) -> PlatformError {
    match err {
        GpioHalError::PinNotAvailable(_) => PlatformError::Gpio(GpioError::InvalidPin),
        GpioHalError::PinUsed(_) => PlatformError::Gpio(GpioError::PinInUse),
        other => PlatformError::InitializationFailed(other.to_string()),
    }
}

impl Platform for RpiPlatform {
    type Pwm = RpiPwm;
    type Gpio = RpiGpio;

    fn name(&self) -> &'static str {
        "rpi"
    }

    fn create_pwm(&mut self, pin: u8, config: PwmConfig) -> Result<Self::Pwm> {
        let output = self.claim(pin)?;
        Ok(RpiPwm::new(output, config))
    }

    fn create_gpio_output(&mut self, pin: u8) -> Result<Self::Gpio> {
        let output = self.claim(pin)?;
        Ok(RpiGpio::new(output))
    }
}
