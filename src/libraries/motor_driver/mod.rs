//! Motor driver abstraction
//!
//! This module provides a thin abstraction for the two DC drive motors
//! behind an L298N-style H-bridge.
//!
//! ## Features
//!
//! - Platform-independent `Motor` trait
//! - H-bridge implementation (enable PWM + two direction pins)
//! - Duty clamping to [0, 100] percent on every write
//!
//! ## Example
//!
//! ```
//! use line_trace_car::car_core::motor::MotorCommand;
//! use line_trace_car::libraries::motor_driver::{HBridgeMotor, Motor};
//! use line_trace_car::platform::mock::{MockGpio, MockPwm};
//! use line_trace_car::platform::traits::PwmConfig;
//!
//! let mut motor = HBridgeMotor::new(
//!     MockPwm::new(12, PwmConfig::motor(1000)),
//!     MockGpio::new_output(5),
//!     MockGpio::new_output(6),
//! );
//!
//! // 75% forward
//! motor.set_command(MotorCommand::forward(75.0)).unwrap();
//!
//! // Coast
//! motor.stop().unwrap();
//! ```

pub mod hbridge;

pub use hbridge::HBridgeMotor;

use line_trace_car_core::motor::MotorCommand;

use crate::platform::Result;

/// Motor control trait (platform-independent)
///
/// Commands carry a direction and a duty in percent; implementations clamp
/// the duty before writing.
pub trait Motor {
    /// Apply a direction and duty
    ///
    /// # Errors
    ///
    /// Returns the `PlatformError` of the first output that failed.
    fn set_command(&mut self, command: MotorCommand) -> Result<()>;

    /// Stop motor (coast)
    ///
    /// # Errors
    ///
    /// Returns the `PlatformError` of the first output that failed.
    fn stop(&mut self) -> Result<()>;

    /// Last command successfully applied
    fn command(&self) -> MotorCommand;
}
