//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the single-board computers
//! the car runs on. All platform-specific code must be isolated here.

pub mod clock;
pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "rpi")]
pub mod rpi;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use clock::SystemClock;
pub use error::{PlatformError, Result};
pub use traits::{GpioInterface, Platform, PwmInterface};
