//! H-bridge motor driver implementation
//!
//! This module implements one side of an L298N-style dual H-bridge: an
//! enable line carrying the speed PWM and two direction inputs (IN1, IN2).
//!
//! ## L298N Truth Table
//!
//! | ENA | IN1 | IN2 | Motor State                      |
//! |-----|-----|-----|----------------------------------|
//! | PWM | 1   | 0   | Forward (speed = PWM duty cycle) |
//! | PWM | 0   | 1   | Reverse (speed = PWM duty cycle) |
//! | 0   | 0   | 0   | Coast (motor freewheels)         |
//!
//! Brake (IN1 = IN2 = 1) is never driven.

use core::sync::atomic::{AtomicU32, Ordering};

use line_trace_car_core::motor::{MotorCommand, MAX_MOTOR_DUTY};

use super::Motor;
use crate::platform::{GpioInterface, PwmInterface, Result};

/// Counter for sampling motor command logs
static SET_COMMAND_LOG_COUNTER: AtomicU32 = AtomicU32::new(0);

/// One H-bridge channel
///
/// # Type Parameters
///
/// * `P` - PWM output type for the enable line
/// * `G` - GPIO output type for IN1 / IN2
pub struct HBridgeMotor<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    enable: P,
    in1: G,
    in2: G,
    command: MotorCommand,
}

impl<P, G> HBridgeMotor<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    /// Create a new H-bridge channel
    ///
    /// The enable PWM is started at 0% so the motor coasts until the first
    /// command.
    pub fn new(mut enable: P, in1: G, in2: G) -> Self {
        enable.enable();
        Self {
            enable,
            in1,
            in2,
            command: MotorCommand::STOPPED,
        }
    }

    /// Enable line PWM
    pub fn enable_pwm(&self) -> &P {
        &self.enable
    }

    /// Mutable enable line PWM
    pub fn enable_pwm_mut(&mut self) -> &mut P {
        &mut self.enable
    }

    /// Direction inputs `(IN1, IN2)`
    pub fn direction_pins(&self) -> (&G, &G) {
        (&self.in1, &self.in2)
    }

    /// Mutable direction inputs `(IN1, IN2)`
    pub fn direction_pins_mut(&mut self) -> (&mut G, &mut G) {
        (&mut self.in1, &mut self.in2)
    }

    /// Drive all outputs low and stop the PWM carrier
    ///
    /// Every output is attempted; the first failure is returned.
    pub fn release(&mut self) -> Result<()> {
        let duty = self.enable.set_duty_cycle(0.0);
        self.enable.disable();
        let in1 = self.in1.set_low();
        let in2 = self.in2.set_low();
        self.command = MotorCommand::STOPPED;
        duty.and(in1).and(in2)
    }
}

impl<P, G> Motor for HBridgeMotor<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    /// Apply a command using the L298N truth table
    ///
    /// Duty drops to 0 before the direction pins change, then rises to the
    /// new value, so a reversal never drives the bridge at speed through
    /// an intermediate state.
    #[inline]
    fn set_command(&mut self, command: MotorCommand) -> Result<()> {
        let command = MotorCommand::new(command.direction, command.duty);

        let count = SET_COMMAND_LOG_COUNTER.fetch_add(1, Ordering::Relaxed);
        if count.is_multiple_of(100) {
            crate::log_debug!(
                "Motor set_command: {:?} {:.1}%",
                command.direction,
                command.duty
            );
        }

        if command.direction != self.command.direction && self.command.is_moving() {
            self.enable.set_duty_cycle(0.0)?;
        }

        let (in1, in2) = command.direction.pin_levels();
        self.in1.set_level(in1)?;
        self.in2.set_level(in2)?;
        self.enable.set_duty_cycle(command.duty / MAX_MOTOR_DUTY)?;

        self.command = command;
        Ok(())
    }

    /// Stop motor (coast)
    ///
    /// Attempts the enable line and both direction pins even if one fails.
    #[inline]
    fn stop(&mut self) -> Result<()> {
        let duty = self.enable.set_duty_cycle(0.0);
        let in1 = self.in1.set_low();
        let in2 = self.in2.set_low();
        if duty.is_ok() && in1.is_ok() && in2.is_ok() {
            self.command = MotorCommand::STOPPED;
        }
        duty.and(in1).and(in2)
    }

    fn command(&self) -> MotorCommand {
        self.command
    }
}
