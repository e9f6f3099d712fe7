//! Motor drive abstraction for the dual DC motor chassis
//!
//! This module provides the platform-independent half of motor control:
//!
//! - Direction and duty-cycle state for one side of the chassis
//! - Duty-cycle clamping to [0, 100] percent
//! - H-bridge direction pin levels per direction
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Writing pin levels
//! and PWM duty belongs in the host crate. Run-state checking is the
//! responsibility of the actuator driver.

use core::fmt;

/// Maximum motor duty cycle (percent)
pub const MAX_MOTOR_DUTY: f32 = 100.0;

/// Drive side of the chassis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSide {
    /// Motor A (left side)
    A,
    /// Motor B (right side)
    B,
}

impl MotorSide {
    /// Both sides in write order
    pub const ALL: [MotorSide; 2] = [MotorSide::A, MotorSide::B];

    /// Array index for per-side storage
    pub fn index(&self) -> usize {
        match self {
            MotorSide::A => 0,
            MotorSide::B => 1,
        }
    }
}

impl fmt::Display for MotorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorSide::A => write!(f, "motor A"),
            MotorSide::B => write!(f, "motor B"),
        }
    }
}

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorDirection {
    Forward,
    Backward,
    /// Coast: both bridge inputs low
    #[default]
    Stopped,
}

impl MotorDirection {
    /// H-bridge input levels `(IN1, IN2)` for this direction
    ///
    /// # L298N Truth Table
    ///
    /// | IN1 | IN2 | Motor State          |
    /// |-----|-----|----------------------|
    /// | 1   | 0   | Forward              |
    /// | 0   | 1   | Backward             |
    /// | 0   | 0   | Stopped (coast)      |
    pub fn pin_levels(&self) -> (bool, bool) {
        match self {
            MotorDirection::Forward => (true, false),
            MotorDirection::Backward => (false, true),
            MotorDirection::Stopped => (false, false),
        }
    }
}

/// Commanded output of one motor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorCommand {
    pub direction: MotorDirection,
    /// Duty cycle in percent [0, 100]
    pub duty: f32,
}

impl MotorCommand {
    /// Motor off, coasting
    pub const STOPPED: MotorCommand = MotorCommand {
        direction: MotorDirection::Stopped,
        duty: 0.0,
    };

    /// Build a command with a clamped duty cycle
    ///
    /// A `Stopped` direction always carries duty 0.
    pub fn new(direction: MotorDirection, duty: f32) -> Self {
        match direction {
            MotorDirection::Stopped => Self::STOPPED,
            _ => Self {
                direction,
                duty: clamp_speed(duty),
            },
        }
    }

    /// Forward at the given duty
    pub fn forward(duty: f32) -> Self {
        Self::new(MotorDirection::Forward, duty)
    }

    /// Backward at the given duty
    pub fn backward(duty: f32) -> Self {
        Self::new(MotorDirection::Backward, duty)
    }

    /// Whether the motor is commanded to move
    pub fn is_moving(&self) -> bool {
        self.direction != MotorDirection::Stopped && self.duty > 0.0
    }
}

/// Clamp a speed request to a motor duty cycle in [0, 100]
///
/// NaN maps to 0 so a corrupt request stops the motor.
pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        return 0.0;
    }
    speed.clamp(0.0, MAX_MOTOR_DUTY)
}
