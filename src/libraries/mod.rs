//! Common libraries
//!
//! Building blocks shared by the control loop, the frame sources and the
//! classifier adapters.
//!
//! ## Libraries
//!
//! - `motor_driver`: H-bridge motor control
//! - `srv_channel`: Steering servo output
//! - `actuator`: Actuator port, driver and drop guard
//! - `ext_command`: Child processes bounded by a deadline

pub mod actuator;
pub mod ext_command;
pub mod motor_driver;
pub mod srv_channel;

// Re-export commonly used types
pub use actuator::{ActuatorDriver, ActuatorError, ActuatorGuard, ActuatorPort, DriverConfig};
pub use ext_command::{CommandError, ExternalCommand};
