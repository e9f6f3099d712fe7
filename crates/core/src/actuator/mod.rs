//! Commanded actuator state
//!
//! Snapshot of what the actuator driver last wrote to the hardware. The
//! driver is the only writer; everything else reads copies.

use crate::motor::{MotorCommand, MotorSide};
use crate::servo::angle_to_duty;

/// Servo angle and per-side motor commands as last written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorState {
    /// Servo angle in degrees (always inside the safe band)
    pub servo_angle: f32,
    /// Servo duty cycle in percent, 0 when the signal is released
    pub servo_duty: f32,
    /// Motor commands indexed by [`MotorSide::index`]
    pub motors: [MotorCommand; 2],
}

impl ActuatorState {
    /// Neutral state: servo centered, both motors stopped
    pub fn neutral(center: f32) -> Self {
        Self {
            servo_angle: center,
            servo_duty: angle_to_duty(center),
            motors: [MotorCommand::STOPPED; 2],
        }
    }

    /// Command for one side
    pub fn motor(&self, side: MotorSide) -> MotorCommand {
        self.motors[side.index()]
    }

    /// Whether either motor is commanded to move
    pub fn any_motor_moving(&self) -> bool {
        self.motors.iter().any(MotorCommand::is_moving)
    }

    /// Whether the servo signal is released (no holding torque)
    pub fn servo_released(&self) -> bool {
        self.servo_duty == 0.0
    }
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self::neutral(90.0)
    }
}
