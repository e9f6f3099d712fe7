//! Actuator port: the hardware I/O surface
//!
//! The driver talks to the hardware only through [`ActuatorPort`], so tests
//! swap in mock PWM/GPIO and the binary swaps in the Raspberry Pi binding.

use line_trace_car_core::motor::{MotorCommand, MotorDirection, MotorSide};

use crate::libraries::motor_driver::{HBridgeMotor, Motor};
use crate::libraries::srv_channel::SteeringServo;
use crate::platform::{
    traits::{Platform, PwmConfig},
    GpioInterface, PwmInterface, Result,
};

/// Raw output capability used by the actuator driver
pub trait ActuatorPort {
    /// Write the servo duty cycle in percent (0 releases the servo)
    fn set_servo_duty(&mut self, percent: f32) -> Result<()>;

    /// Write one motor's direction and duty (percent)
    fn set_motor(&mut self, side: MotorSide, direction: MotorDirection, duty: f32) -> Result<()>;

    /// Drive every output low and disable the PWM carriers
    fn release(&mut self) -> Result<()>;
}

/// BCM pin numbers for one H-bridge side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    /// Enable line (speed PWM)
    pub pwm: u8,
    pub in1: u8,
    pub in2: u8,
}

/// BCM pin assignment for the whole chassis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorPins {
    pub servo: u8,
    pub motor_a: MotorPins,
    pub motor_b: MotorPins,
}

impl Default for ActuatorPins {
    fn default() -> Self {
        Self {
            servo: 18,
            motor_a: MotorPins {
                pwm: 12,
                in1: 5,
                in2: 6,
            },
            motor_b: MotorPins {
                pwm: 13,
                in1: 20,
                in2: 21,
            },
        }
    }
}

/// PWM carrier frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortFrequencies {
    /// Servo carrier, 50 Hz for hobby servos
    pub servo_hz: u32,
    /// Motor enable carrier
    pub motor_hz: u32,
}

impl Default for PortFrequencies {
    fn default() -> Self {
        Self {
            servo_hz: 50,
            motor_hz: 1000,
        }
    }
}

/// Servo plus two L298N-style H-bridge sides
pub struct HBridgeActuatorPort<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    servo: SteeringServo<P>,
    motors: [HBridgeMotor<P, G>; 2],
}

impl<P, G> HBridgeActuatorPort<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    /// Assemble a port from already-created outputs
    pub fn new(servo: SteeringServo<P>, motor_a: HBridgeMotor<P, G>, motor_b: HBridgeMotor<P, G>) -> Self {
        Self {
            servo,
            motors: [motor_a, motor_b],
        }
    }

    /// Claim every pin from the platform and build the port
    ///
    /// The servo starts at `initial_servo_duty` percent; motors start
    /// stopped with direction pins low.
    ///
    /// # Errors
    ///
    /// Returns the platform error for the first pin that cannot be claimed.
    pub fn create<PL>(
        platform: &mut PL,
        pins: &ActuatorPins,
        frequencies: &PortFrequencies,
        initial_servo_duty: f32,
    ) -> Result<Self>
    where
        PL: Platform<Pwm = P, Gpio = G>,
    {
        let servo_config = PwmConfig {
            frequency: frequencies.servo_hz,
            duty_cycle: (initial_servo_duty / 100.0).clamp(0.0, 1.0),
        };
        let servo = SteeringServo::new(platform.create_pwm(pins.servo, servo_config)?);

        let mut side = |motor: &MotorPins| -> Result<HBridgeMotor<P, G>> {
            let enable = platform.create_pwm(motor.pwm, PwmConfig::motor(frequencies.motor_hz))?;
            let in1 = platform.create_gpio_output(motor.in1)?;
            let in2 = platform.create_gpio_output(motor.in2)?;
            Ok(HBridgeMotor::new(enable, in1, in2))
        };
        let motor_a = side(&pins.motor_a)?;
        let motor_b = side(&pins.motor_b)?;

        crate::log_info!(
            "Actuator port on {}: servo GPIO{}, motor A GPIO{}/{}/{}, motor B GPIO{}/{}/{}",
            platform.name(),
            pins.servo,
            pins.motor_a.pwm,
            pins.motor_a.in1,
            pins.motor_a.in2,
            pins.motor_b.pwm,
            pins.motor_b.in1,
            pins.motor_b.in2
        );

        Ok(Self::new(servo, motor_a, motor_b))
    }

    /// Steering servo
    pub fn servo(&self) -> &SteeringServo<P> {
        &self.servo
    }

    /// Mutable steering servo
    pub fn servo_mut(&mut self) -> &mut SteeringServo<P> {
        &mut self.servo
    }

    /// One H-bridge side
    pub fn motor(&self, side: MotorSide) -> &HBridgeMotor<P, G> {
        &self.motors[side.index()]
    }

    /// Mutable H-bridge side
    pub fn motor_mut(&mut self, side: MotorSide) -> &mut HBridgeMotor<P, G> {
        &mut self.motors[side.index()]
    }
}

impl<P, G> ActuatorPort for HBridgeActuatorPort<P, G>
where
    P: PwmInterface,
    G: GpioInterface,
{
    fn set_servo_duty(&mut self, percent: f32) -> Result<()> {
        self.servo.set_duty_percent(percent)
    }

    fn set_motor(&mut self, side: MotorSide, direction: MotorDirection, duty: f32) -> Result<()> {
        let motor = &mut self.motors[side.index()];
        match direction {
            MotorDirection::Stopped => motor.stop(),
            _ => motor.set_command(MotorCommand::new(direction, duty)),
        }
    }

    fn release(&mut self) -> Result<()> {
        let servo = self.servo.release();
        let a = self.motors[0].release();
        let b = self.motors[1].release();
        servo.and(a).and(b)
    }
}
