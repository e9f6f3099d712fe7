//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod gpio;
pub mod platform;
pub mod pwm;

// Re-export trait interfaces
pub use gpio::{GpioInterface, GpioMode};
pub use platform::Platform;
pub use pwm::{PwmConfig, PwmInterface};
