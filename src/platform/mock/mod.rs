//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing and bench runs without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled (default)

mod gpio;
mod platform;
mod pwm;

pub use gpio::MockGpio;
pub use platform::MockPlatform;
pub use pwm::MockPwm;
