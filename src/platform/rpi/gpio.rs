//! Raspberry Pi GPIO implementation

use crate::platform::{traits::GpioInterface, traits::GpioMode, Result};
use rppal::gpio::OutputPin;

/// Raspberry Pi GPIO output
pub struct RpiGpio {
    pin: OutputPin,
}

impl RpiGpio {
    /// Wrap an already-claimed output pin
    pub fn new(pin: OutputPin) -> Self {
        Self { pin }
    }
}

impl GpioInterface for RpiGpio {
    fn set_high(&mut self) -> Result<()> {
        self.pin.set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        self.pin.set_low();
        Ok(())
    }

    fn read(&self) -> bool {
        self.pin.is_set_high()
    }

    fn mode(&self) -> GpioMode {
        GpioMode::OutputPushPull
    }
}
