//! Perception-to-actuation control loop
//!
//! ## Behavior
//!
//! - `Running`: each tick takes the next frame, classifies it and steers.
//!   A failed classification holds the last good class and re-applies it;
//!   with no class yet the motors stop for that tick.
//! - `Stopped` / `Paused`: motors stopped once on entry, then idle polling.
//!   While `Stopped`, manual servo presets are applied. Motors never move
//!   outside `Running`.
//! - A frame source that runs dry or fails ends the run (`Stopped`).
//! - An actuator write failure ends the run and stops everything.
//!
//! ## Safety
//!
//! The run state is read again right before each write, so a stop that
//! lands while the classifier is busy is honored in the same tick. On
//! exit, and on every drop of the loop, the actuator guard stops and
//! releases all outputs.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use line_trace_car_core::actuator::ActuatorState;
use line_trace_car_core::mode::{OperatorCommand, RunState, ServoPreset, SharedRunState};
use line_trace_car_core::steering::SteeringClass;
use line_trace_car_core::traits::Delay;

use crate::devices::traits::{FrameError, FrameSource};
use crate::libraries::actuator::{ActuatorDriver, ActuatorGuard, ActuatorPort};
use crate::subsystems::perception::Classifier;

/// Loop timing and drive parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Period of a running tick
    pub tick: Duration,
    /// Wait between ticks while not running
    pub idle_poll: Duration,
    /// Motor duty while driving, percent
    pub speed: f32,
    /// Predictions below this confidence are treated as failures
    pub min_confidence: Option<f32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            idle_poll: Duration::from_millis(50),
            speed: 50.0,
            min_confidence: None,
        }
    }
}

/// Counters since the loop was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    /// Fresh predictions applied
    pub applied: u64,
    /// Ticks that re-applied the last good class
    pub held: u64,
    pub perception_errors: u64,
    pub frame_errors: u64,
    pub actuator_errors: u64,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing steered
    Idle(RunState),
    /// Fresh prediction applied
    Applied(SteeringClass),
    /// Classification failed; last good class re-applied, or motors
    /// stopped if there was none
    Held(Option<SteeringClass>),
    /// Frame source had nothing new; outputs unchanged
    NoFrame,
    /// Frame source ended or failed; run stopped
    SourceEnded,
    /// Actuator write failed; run stopped
    ActuatorFault,
}

/// The control loop
pub struct ControlLoop<A, D, S, C>
where
    A: ActuatorPort,
    D: Delay,
    S: FrameSource,
    C: Classifier,
{
    actuators: ActuatorGuard<A, D>,
    frames: S,
    classifier: C,
    shared: Arc<SharedRunState>,
    manual: Option<Receiver<OperatorCommand>>,
    config: LoopConfig,
    last_class: Option<SteeringClass>,
    last_state: Option<RunState>,
    stats: LoopStats,
}

impl<A, D, S, C> ControlLoop<A, D, S, C>
where
    A: ActuatorPort,
    D: Delay,
    S: FrameSource,
    C: Classifier,
{
    pub fn new(
        driver: ActuatorDriver<A, D>,
        frames: S,
        classifier: C,
        shared: Arc<SharedRunState>,
        config: LoopConfig,
    ) -> Self {
        Self {
            actuators: ActuatorGuard::new(driver),
            frames,
            classifier,
            shared,
            manual: None,
            config,
            last_class: None,
            last_state: None,
            stats: LoopStats::default(),
        }
    }

    /// Receive manual commands from the operator listener
    pub fn with_manual_commands(mut self, manual: Receiver<OperatorCommand>) -> Self {
        self.manual = Some(manual);
        self
    }

    /// Run one iteration
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;
        let state = self.shared.get();
        let entered = self.last_state != Some(state);
        self.last_state = Some(state);

        if !state.is_running() {
            if entered {
                self.enter_idle(state);
            }
            self.drain_manual(state);
            return TickOutcome::Idle(state);
        }

        if entered {
            crate::log_info!("Running at {:.0}% speed", self.config.speed);
        }
        self.discard_manual();

        let frame = match self.frames.next_frame() {
            Ok(frame) => frame,
            Err(FrameError::NotReady) => return TickOutcome::NoFrame,
            Err(e) => {
                self.stats.frame_errors += 1;
                crate::log_error!("Frame source ended: {}", e);
                self.stop_run();
                return TickOutcome::SourceEnded;
            }
        };

        let prediction = self
            .classifier
            .classify(&frame)
            .and_then(|prediction| prediction.require_confidence(self.config.min_confidence));

        let (class, outcome) = match prediction {
            Ok(prediction) => {
                crate::log_debug!(
                    "Frame {}: {} ({:?})",
                    frame.index,
                    prediction.class,
                    prediction.confidence
                );
                (Some(prediction.class), TickOutcome::Applied(prediction.class))
            }
            Err(e) => {
                self.stats.perception_errors += 1;
                crate::log_warn!("Frame {}: classification failed: {}", frame.index, e);
                (self.last_class, TickOutcome::Held(self.last_class))
            }
        };

        // Re-read: the operator may have stopped while the classifier ran
        let run_state = self.shared.get();
        let result = match class {
            Some(class) => self
                .actuators
                .set_steering(class, self.config.speed, run_state),
            None => self.actuators.stop_all(),
        };

        if let Err(e) = result {
            self.stats.actuator_errors += 1;
            crate::log_error!("Actuator failure: {}", e);
            self.stop_run();
            return TickOutcome::ActuatorFault;
        }

        if !run_state.is_running() {
            return TickOutcome::Idle(run_state);
        }

        match outcome {
            TickOutcome::Applied(_) => self.stats.applied += 1,
            _ => self.stats.held += 1,
        }
        if class != self.last_class {
            if let Some(class) = class {
                crate::log_info!("Steering {}", class);
            }
        }
        self.last_class = class;
        outcome
    }

    /// Tick until the shutdown flag is set
    ///
    /// Leaves the motors stopped. Outputs are released when the loop is
    /// dropped.
    pub fn run(&mut self) -> LoopStats {
        crate::log_info!(
            "Control loop started (tick {} ms, idle poll {} ms)",
            self.config.tick.as_millis(),
            self.config.idle_poll.as_millis()
        );

        while !self.shared.is_shutdown() {
            let started = Instant::now();
            let outcome = self.tick();
            let period = match outcome {
                TickOutcome::Idle(_) | TickOutcome::SourceEnded | TickOutcome::ActuatorFault => {
                    self.config.idle_poll
                }
                _ => self.config.tick,
            };
            std::thread::sleep(period.saturating_sub(started.elapsed()));
        }

        if let Err(e) = self.actuators.stop_all() {
            crate::log_error!("Stop on exit failed: {}", e);
        }
        crate::log_info!("Control loop stopped: {:?}", self.stats);
        self.stats
    }

    /// Last commanded actuator state
    pub fn actuator_state(&self) -> ActuatorState {
        self.actuators.state()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Last class applied from a successful or held prediction
    pub fn last_class(&self) -> Option<SteeringClass> {
        self.last_class
    }

    pub fn driver(&self) -> &ActuatorDriver<A, D> {
        &self.actuators
    }

    pub fn driver_mut(&mut self) -> &mut ActuatorDriver<A, D> {
        &mut self.actuators
    }

    fn enter_idle(&mut self, state: RunState) {
        if state == RunState::Stopped {
            self.last_class = None;
        }
        if let Err(e) = self.actuators.stop_all() {
            self.stats.actuator_errors += 1;
            crate::log_error!("Stop on {} failed: {}", state, e);
        }
        crate::log_info!("{}", state);
    }

    /// End the run after a fault and stop the motors
    fn stop_run(&mut self) {
        let (prev, next) = self.shared.apply(OperatorCommand::Stop);
        if prev != next {
            crate::log_info!("Run state {} -> {}", prev, next);
        }
        if let Err(e) = self.actuators.stop_all() {
            crate::log_error!("Stop after fault failed: {}", e);
        }
    }

    fn drain_manual(&mut self, state: RunState) {
        let Some(manual) = &self.manual else {
            return;
        };
        let commands: Vec<OperatorCommand> = manual.try_iter().collect();

        for command in commands {
            if state != RunState::Stopped {
                crate::log_debug!("Ignoring {:?} while {}", command, state);
                continue;
            }
            if let Err(e) = self.apply_manual(command) {
                self.stats.actuator_errors += 1;
                crate::log_error!("Manual {:?} failed: {}", command, e);
            }
        }
    }

    fn discard_manual(&mut self) {
        if let Some(manual) = &self.manual {
            for command in manual.try_iter() {
                crate::log_debug!("Ignoring {:?} while running", command);
            }
        }
    }

    fn apply_manual(
        &mut self,
        command: OperatorCommand,
    ) -> Result<(), crate::libraries::actuator::ActuatorError> {
        let OperatorCommand::Steer(preset) = command else {
            return Ok(());
        };
        let table = self.actuators.config().table;
        let angle = match preset {
            ServoPreset::Left => table.angle_for(SteeringClass::Left),
            ServoPreset::Center => table.center,
            ServoPreset::Right => table.angle_for(SteeringClass::Right),
        };
        self.actuators.set_servo_angle_transient(angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::traits::Frame;
    use crate::libraries::actuator::{
        ActuatorPins, DriverConfig, HBridgeActuatorPort, PortFrequencies,
    };
    use crate::platform::mock::{MockGpio, MockPlatform, MockPwm};
    use crate::subsystems::perception::{FixedClassifier, PerceptionError, Prediction};
    use line_trace_car_core::motor::MotorSide;
    use line_trace_car_core::traits::MockTime;
    use std::sync::mpsc;

    /// Endless numbered frames
    struct CountingFrames(u64);

    impl FrameSource for CountingFrames {
        fn next_frame(&mut self) -> Result<Frame, FrameError> {
            self.0 += 1;
            Ok(Frame::new(self.0 - 1, format!("frame_{}.jpg", self.0 - 1)))
        }
    }

    /// Scripted predictions; `None` is a classification failure
    struct Script(Vec<Option<SteeringClass>>);

    impl Classifier for Script {
        fn classify(&mut self, _frame: &Frame) -> Result<Prediction, PerceptionError> {
            match self.0.remove(0) {
                Some(class) => Ok(Prediction::new(class)),
                None => Err(PerceptionError::Parse("garbage".into())),
            }
        }
    }

    type MockPort = HBridgeActuatorPort<MockPwm, MockGpio>;

    fn driver() -> ActuatorDriver<MockPort, MockTime> {
        let mut platform = MockPlatform::new();
        let port = HBridgeActuatorPort::create(
            &mut platform,
            &ActuatorPins::default(),
            &PortFrequencies::default(),
            0.0,
        )
        .unwrap();
        let mut driver = ActuatorDriver::new(port, MockTime::new(), DriverConfig::default());
        driver.init().unwrap();
        driver
    }

    type TestLoop<C> = ControlLoop<MockPort, MockTime, CountingFrames, C>;

    fn control_loop_with<C: Classifier>(
        classifier: C,
        config: LoopConfig,
    ) -> (TestLoop<C>, Arc<SharedRunState>) {
        let shared = Arc::new(SharedRunState::new());
        let control = ControlLoop::new(
            driver(),
            CountingFrames(0),
            classifier,
            shared.clone(),
            config,
        );
        (control, shared)
    }

    fn control_loop<C: Classifier>(classifier: C) -> (TestLoop<C>, Arc<SharedRunState>) {
        control_loop_with(classifier, LoopConfig::default())
    }

    #[test]
    fn test_idle_when_stopped() {
        let (mut control, _shared) = control_loop(FixedClassifier::new(SteeringClass::Left));
        assert_eq!(control.tick(), TickOutcome::Idle(RunState::Stopped));
        assert!(!control.actuator_state().any_motor_moving());
        assert_eq!(control.stats().applied, 0);
    }

    #[test]
    fn test_running_applies_prediction() {
        let (mut control, shared) = control_loop(FixedClassifier::new(SteeringClass::Left));
        shared.set(RunState::Running);

        assert_eq!(control.tick(), TickOutcome::Applied(SteeringClass::Left));
        let state = control.actuator_state();
        assert_eq!(state.servo_angle, 120.0);
        assert_eq!(state.motor(MotorSide::A).duty, 50.0);
        assert_eq!(control.last_class(), Some(SteeringClass::Left));
    }

    #[test]
    fn test_failure_without_history_stops() {
        let (mut control, shared) = control_loop(Script(vec![None]));
        shared.set(RunState::Running);

        assert_eq!(control.tick(), TickOutcome::Held(None));
        assert!(!control.actuator_state().any_motor_moving());
        assert_eq!(control.stats().perception_errors, 1);
    }

    #[test]
    fn test_pause_stops_motors_and_keeps_class() {
        let (mut control, shared) = control_loop(Script(vec![
            Some(SteeringClass::Right),
            None,
        ]));
        shared.set(RunState::Running);
        control.tick();

        shared.apply(OperatorCommand::TogglePause);
        assert_eq!(control.tick(), TickOutcome::Idle(RunState::Paused));
        assert!(!control.actuator_state().any_motor_moving());

        shared.apply(OperatorCommand::TogglePause);
        assert_eq!(
            control.tick(),
            TickOutcome::Held(Some(SteeringClass::Right))
        );
        assert_eq!(control.actuator_state().servo_angle, 60.0);
    }

    #[test]
    fn test_stop_forgets_class() {
        let (mut control, shared) = control_loop(Script(vec![
            Some(SteeringClass::Left),
            None,
        ]));
        shared.set(RunState::Running);
        control.tick();

        shared.apply(OperatorCommand::Stop);
        control.tick();
        shared.apply(OperatorCommand::Start);
        assert_eq!(control.tick(), TickOutcome::Held(None));
        assert!(!control.actuator_state().any_motor_moving());
    }

    #[test]
    fn test_manual_commands_only_when_stopped() {
        let (control, shared) = control_loop(FixedClassifier::new(SteeringClass::Straight));
        let (tx, rx) = mpsc::channel();
        let mut control = control.with_manual_commands(rx);

        tx.send(OperatorCommand::Steer(ServoPreset::Right)).unwrap();
        control.tick();
        assert_eq!(control.actuator_state().servo_angle, 60.0);

        shared.set(RunState::Paused);
        tx.send(OperatorCommand::Steer(ServoPreset::Left)).unwrap();
        control.tick();
        assert_eq!(control.actuator_state().servo_angle, 60.0);
        assert!(!control.actuator_state().any_motor_moving());
    }

    #[test]
    fn test_manual_servo_preset_is_transient() {
        let (control, _shared) = control_loop(FixedClassifier::new(SteeringClass::Straight));
        let (tx, rx) = mpsc::channel();
        let mut control = control.with_manual_commands(rx);

        tx.send(OperatorCommand::Steer(ServoPreset::Left)).unwrap();
        control.tick();
        let state = control.actuator_state();
        assert_eq!(state.servo_angle, 120.0);
        assert!(state.servo_released());
    }

    #[test]
    fn test_run_exits_on_shutdown() {
        let config = LoopConfig {
            tick: Duration::from_millis(1),
            idle_poll: Duration::from_millis(1),
            ..LoopConfig::default()
        };
        let (mut control, shared) =
            control_loop_with(FixedClassifier::new(SteeringClass::Straight), config);
        shared.set(RunState::Running);

        let stopper = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                shared.request_shutdown();
            })
        };
        let stats = control.run();
        stopper.join().unwrap();

        assert!(stats.applied >= 1);
        assert!(!control.actuator_state().any_motor_moving());
    }
}
