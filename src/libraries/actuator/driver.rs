//! Actuator driver
//!
//! Turns steering decisions into safe servo and motor writes. The driver is
//! the only writer of [`ActuatorState`]; it clamps every angle and speed
//! before conversion and never rejects out-of-range input.

use line_trace_car_core::actuator::ActuatorState;
use line_trace_car_core::mode::RunState;
use line_trace_car_core::motor::{clamp_speed, MotorCommand, MotorDirection, MotorSide};
use line_trace_car_core::servo::{angle_to_duty, clamp_angle, AngleBand};
use line_trace_car_core::steering::{SteeringClass, SteeringTable};
use line_trace_car_core::traits::Delay;

use super::{ActuatorError, ActuatorPort};

/// Driver calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    /// Class-to-angle table
    pub table: SteeringTable,
    /// Safe servo band
    pub band: AngleBand,
    /// Hold time before a transient servo move releases the signal
    pub settle_ms: u32,
    /// Drop servo duty to 0 on `stop_all()`
    pub release_servo_on_stop: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            table: SteeringTable::default(),
            band: AngleBand::default(),
            settle_ms: 500,
            release_servo_on_stop: false,
        }
    }
}

/// Actuator driver over an [`ActuatorPort`]
pub struct ActuatorDriver<A: ActuatorPort, D: Delay> {
    port: A,
    delay: D,
    config: DriverConfig,
    state: ActuatorState,
}

impl<A: ActuatorPort, D: Delay> ActuatorDriver<A, D> {
    /// Create a driver; nothing is written until [`Self::init`]
    pub fn new(port: A, delay: D, config: DriverConfig) -> Self {
        let center = clamp_angle(config.table.center, &config.band);
        Self {
            port,
            delay,
            config,
            state: ActuatorState::neutral(center),
        }
    }

    /// Drive the hardware to neutral: motors stopped, servo centered
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        let stopped = self.stop_motors();
        let centered = self.center();
        stopped.and(centered)
    }

    /// Apply a steering class
    ///
    /// When `run_state` is not `Running` nothing is steered and the motors
    /// are stopped instead.
    pub fn set_steering(
        &mut self,
        class: SteeringClass,
        speed: f32,
        run_state: RunState,
    ) -> Result<(), ActuatorError> {
        if !run_state.is_running() {
            return self.stop_all();
        }

        let angle = self.config.table.angle_for(class);
        self.set_servo_angle(angle)?;

        let command = MotorCommand::forward(clamp_speed(speed));
        self.apply_motors([command, command])
    }

    /// Stop both motors, optionally releasing the servo
    ///
    /// Every channel is attempted and the recorded state is updated even if
    /// a write fails; the first failure is returned.
    pub fn stop_all(&mut self) -> Result<(), ActuatorError> {
        let mut result = self.stop_motors();

        if self.config.release_servo_on_stop {
            let released = self
                .port
                .set_servo_duty(0.0)
                .map_err(ActuatorError::Servo);
            self.state.servo_duty = 0.0;
            result = result.and(released);
        }

        result
    }

    /// Move the servo and keep holding the position
    pub fn set_servo_angle(&mut self, angle: f32) -> Result<(), ActuatorError> {
        let angle = clamp_angle(angle, &self.config.band);
        let duty = angle_to_duty(angle);
        self.port
            .set_servo_duty(duty)
            .map_err(ActuatorError::Servo)?;

        self.state.servo_angle = angle;
        self.state.servo_duty = duty;
        Ok(())
    }

    /// Move the servo, wait for it to settle, then release the signal
    pub fn set_servo_angle_transient(&mut self, angle: f32) -> Result<(), ActuatorError> {
        self.set_servo_angle(angle)?;
        self.delay.delay_ms(self.config.settle_ms);
        self.port
            .set_servo_duty(0.0)
            .map_err(ActuatorError::Servo)?;
        self.state.servo_duty = 0.0;
        Ok(())
    }

    /// Servo to the table's center angle
    pub fn center(&mut self) -> Result<(), ActuatorError> {
        self.set_servo_angle(self.config.table.center)
    }

    /// Release every output (PWM disabled, pins low)
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        let result = self.port.release().map_err(ActuatorError::Release);
        self.state.servo_duty = 0.0;
        self.state.motors = [MotorCommand::STOPPED; 2];
        result
    }

    /// Last commanded state
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Active calibration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Underlying port
    pub fn port(&self) -> &A {
        &self.port
    }

    /// Mutable underlying port
    pub fn port_mut(&mut self) -> &mut A {
        &mut self.port
    }

    fn stop_motors(&mut self) -> Result<(), ActuatorError> {
        let mut result = Ok(());
        for side in MotorSide::ALL {
            let stopped = self
                .port
                .set_motor(side, MotorDirection::Stopped, 0.0)
                .map_err(|source| ActuatorError::Motor { side, source });
            self.state.motors[side.index()] = MotorCommand::STOPPED;
            result = result.and(stopped);
        }
        result
    }

    fn apply_motors(&mut self, commands: [MotorCommand; 2]) -> Result<(), ActuatorError> {
        for side in MotorSide::ALL {
            let command = commands[side.index()];
            self.port
                .set_motor(side, command.direction, command.duty)
                .map_err(|source| ActuatorError::Motor { side, source })?;
            self.state.motors[side.index()] = command;
        }
        Ok(())
    }
}
