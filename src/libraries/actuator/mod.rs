//! Actuator layer
//!
//! ```text
//! ControlLoop ──► ActuatorDriver ──► ActuatorPort ──► SteeringServo / HBridgeMotor
//!                  (clamp, record)     (raw writes)     (PWM + GPIO)
//! ```
//!
//! - `port`: [`ActuatorPort`] trait and the servo + dual H-bridge implementation
//! - `driver`: [`ActuatorDriver`], the only writer of `ActuatorState`
//! - `guard`: [`ActuatorGuard`], stops and releases everything on drop

pub mod driver;
pub mod guard;
pub mod port;

pub use driver::{ActuatorDriver, DriverConfig};
pub use guard::ActuatorGuard;
pub use port::{ActuatorPins, ActuatorPort, HBridgeActuatorPort, MotorPins, PortFrequencies};

use line_trace_car_core::motor::MotorSide;

use crate::platform::PlatformError;

/// Actuator write failure, tagged with the channel that failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    #[error("servo write failed: {0}")]
    Servo(PlatformError),
    #[error("{side} write failed: {source}")]
    Motor {
        side: MotorSide,
        source: PlatformError,
    },
    #[error("output release failed: {0}")]
    Release(PlatformError),
}
