//! Raspberry Pi platform implementation
//!
//! This module provides concrete implementations of the platform abstraction
//! traits for a Raspberry Pi using the `rppal` crate. PWM outputs are driven
//! in software on ordinary GPIO pins, so any BCM pin can carry the servo or
//! a motor enable line.
//!
//! # Feature Gate
//!
//! This module is only available when the `rpi` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! line_trace_car = { version = "0.1", features = ["rpi"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use line_trace_car::platform::rpi::RpiPlatform;
//! use line_trace_car::platform::traits::{Platform, PwmConfig};
//!
//! let mut platform = RpiPlatform::init().unwrap();
//! let servo = platform.create_pwm(18, PwmConfig::servo(0.075)).unwrap();
//! ```

mod gpio;
mod platform;
mod pwm;

pub use gpio::RpiGpio;
pub use platform::RpiPlatform;
pub use pwm::RpiPwm;
