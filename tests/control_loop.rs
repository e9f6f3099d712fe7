//! Control loop tests against the mock platform

use std::fs;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use line_trace_car::car_core::mode::{OperatorCommand, RunState, SharedRunState};
use line_trace_car::car_core::motor::MotorSide;
use line_trace_car::car_core::steering::{LabelMap, SteeringClass};
use line_trace_car::car_core::traits::MockTime;
use line_trace_car::communication::operator::handle_line;
use line_trace_car::devices::camera::FolderSource;
use line_trace_car::devices::traits::{Frame, FrameError, FrameSource};
use line_trace_car::libraries::actuator::{
    ActuatorPins, HBridgeActuatorPort, PortFrequencies,
};
use line_trace_car::libraries::{ActuatorDriver, DriverConfig};
use line_trace_car::platform::mock::{MockGpio, MockPlatform, MockPwm};
use line_trace_car::rover::{ControlLoop, LoopConfig, TickOutcome};
use line_trace_car::subsystems::perception::{
    Classifier, CommandClassifier, LabelFileClassifier, PerceptionError, Prediction,
};

type MockPort = HBridgeActuatorPort<MockPwm, MockGpio>;

/// Endless numbered frames
struct Frames(u64);

impl FrameSource for Frames {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        let index = self.0;
        self.0 += 1;
        Ok(Frame::new(index, format!("frame_{index}.jpg")))
    }
}

/// Replays a fixed list of answers; `None` is a classification failure
struct Scripted {
    answers: Vec<Option<Prediction>>,
}

impl Scripted {
    fn classes(classes: &[Option<SteeringClass>]) -> Self {
        Self {
            answers: classes.iter().map(|c| c.map(Prediction::new)).collect(),
        }
    }
}

impl Classifier for Scripted {
    fn classify(&mut self, _frame: &Frame) -> Result<Prediction, PerceptionError> {
        if self.answers.is_empty() {
            return Ok(Prediction::new(SteeringClass::Straight));
        }
        self.answers
            .remove(0)
            .ok_or_else(|| PerceptionError::Parse("model crashed".into()))
    }
}

/// Stops the run while "inferring", then answers with a turn
struct StopsWhileClassifying {
    shared: Arc<SharedRunState>,
}

impl Classifier for StopsWhileClassifying {
    fn classify(&mut self, _frame: &Frame) -> Result<Prediction, PerceptionError> {
        self.shared.apply(OperatorCommand::Stop);
        Ok(Prediction::new(SteeringClass::Left))
    }
}

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

fn running() -> Arc<SharedRunState> {
    let shared = Arc::new(SharedRunState::new());
    shared.apply(OperatorCommand::Start);
    shared
}

fn motor_history<S: FrameSource, C: Classifier>(
    control: &ControlLoop<MockPort, MockTime, S, C>,
    side: MotorSide,
) -> Vec<f32> {
    control
        .driver()
        .port()
        .motor(side)
        .enable_pwm()
        .history()
        .to_vec()
}

#[test]
fn test_scripted_run_steers_and_holds() {
    let shared = running();
    let classifier = Scripted::classes(&[
        Some(SteeringClass::Straight),
        Some(SteeringClass::Left),
        None,
        Some(SteeringClass::Right),
    ]);
    let mut control = ControlLoop::new(
        driver(),
        Frames(0),
        classifier,
        shared,
        LoopConfig::default(),
    );

    let mut angles = Vec::new();
    for _ in 0..4 {
        control.tick();
        angles.push(control.actuator_state().servo_angle);
    }

    assert_eq!(angles, [90.0, 120.0, 120.0, 60.0]);
    let stats = control.stats();
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.held, 1);
    assert_eq!(stats.perception_errors, 1);
    assert_eq!(control.actuator_state().motor(MotorSide::B).duty, 50.0);
}

#[test]
fn test_no_motor_duty_after_stop() {
    let shared = running();
    let classifier = Scripted::classes(&[Some(SteeringClass::Left); 8]);
    let mut control = ControlLoop::new(
        driver(),
        Frames(0),
        classifier,
        shared.clone(),
        LoopConfig::default(),
    );

    control.tick();
    control.tick();
    assert!(control.actuator_state().any_motor_moving());

    shared.apply(OperatorCommand::Stop);
    let before = motor_history(&control, MotorSide::A).len();
    for _ in 0..5 {
        assert_eq!(control.tick(), TickOutcome::Idle(RunState::Stopped));
    }

    let after = motor_history(&control, MotorSide::A);
    assert!(after[before..].iter().all(|duty| *duty == 0.0));
    assert_eq!(*after.last().unwrap(), 0.0);
    assert!(!control.actuator_state().any_motor_moving());
}

#[test]
fn test_stop_during_classification_is_honored() {
    let shared = running();
    let classifier = StopsWhileClassifying {
        shared: shared.clone(),
    };
    let mut control = ControlLoop::new(
        driver(),
        Frames(0),
        classifier,
        shared.clone(),
        LoopConfig::default(),
    );

    assert_eq!(control.tick(), TickOutcome::Idle(RunState::Stopped));
    assert!(motor_history(&control, MotorSide::A)
        .iter()
        .all(|duty| *duty == 0.0));
    assert_eq!(control.actuator_state().servo_angle, 90.0);
}

#[test]
fn test_low_confidence_holds_last_class() {
    let shared = running();
    let classifier = Scripted {
        answers: vec![
            Some(Prediction::with_confidence(SteeringClass::Right, 0.9)),
            Some(Prediction::with_confidence(SteeringClass::Left, 0.2)),
        ],
    };
    let config = LoopConfig {
        min_confidence: Some(0.5),
        ..LoopConfig::default()
    };
    let mut control = ControlLoop::new(driver(), Frames(0), classifier, shared, config);

    assert_eq!(control.tick(), TickOutcome::Applied(SteeringClass::Right));
    assert_eq!(control.tick(), TickOutcome::Held(Some(SteeringClass::Right)));
    assert_eq!(control.actuator_state().servo_angle, 60.0);
}

#[test]
fn test_actuator_failure_stops_run() {
    let shared = running();
    let classifier = Scripted::classes(&[]);
    let mut control = ControlLoop::new(
        driver(),
        Frames(0),
        classifier,
        shared.clone(),
        LoopConfig::default(),
    );

    control
        .driver_mut()
        .port_mut()
        .motor_mut(MotorSide::A)
        .enable_pwm_mut()
        .set_fail_writes(true);

    assert_eq!(control.tick(), TickOutcome::ActuatorFault);
    assert_eq!(shared.get(), RunState::Stopped);
    assert_eq!(control.stats().actuator_errors, 1);
    assert!(!control.actuator_state().any_motor_moving());
    // Motor B was still reachable and must end at zero
    assert_eq!(
        motor_history(&control, MotorSide::B).last().copied(),
        Some(0.0)
    );
}

#[test]
fn test_labeled_folder_replay() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    fs::create_dir(&frames).unwrap();
    for name in ["frame_0.jpg", "frame_1.jpg", "frame_2.jpg"] {
        fs::write(frames.join(name), b"jpeg").unwrap();
    }
    let labels = "filename,label\n\
                  frame_0.jpg,straight\n\
                  frame_1.jpg,right\n\
                  frame_2.jpg,left\n";

    let shared = running();
    let classifier = LabelFileClassifier::parse(labels, &LabelMap::default()).unwrap();
    let mut control = ControlLoop::new(
        driver(),
        FolderSource::open(&frames).unwrap(),
        classifier,
        shared.clone(),
        LoopConfig::default(),
    );

    let outcomes: Vec<TickOutcome> = (0..4).map(|_| control.tick()).collect();
    assert_eq!(
        outcomes,
        [
            TickOutcome::Applied(SteeringClass::Straight),
            TickOutcome::Applied(SteeringClass::Right),
            TickOutcome::Applied(SteeringClass::Left),
            TickOutcome::SourceEnded,
        ]
    );
    assert_eq!(shared.get(), RunState::Stopped);
    assert!(!control.actuator_state().any_motor_moving());
    assert_eq!(control.actuator_state().servo_angle, 120.0);
}

#[test]
fn test_unlabeled_frame_is_held() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
    fs::write(dir.path().join("b.jpg"), b"jpeg").unwrap();
    let classifier =
        LabelFileClassifier::parse("a.jpg,left\n", &LabelMap::default()).unwrap();

    let mut control = ControlLoop::new(
        driver(),
        FolderSource::open(dir.path()).unwrap(),
        classifier,
        running(),
        LoopConfig::default(),
    );

    control.tick();
    assert_eq!(control.tick(), TickOutcome::Held(Some(SteeringClass::Left)));
    assert_eq!(control.stats().perception_errors, 1);
}

#[test]
fn test_drive_keys_do_not_move_stopped_car() {
    let shared = Arc::new(SharedRunState::new());
    let (tx, rx) = mpsc::channel();
    let mut control = ControlLoop::new(
        driver(),
        Frames(0),
        Scripted::classes(&[]),
        shared.clone(),
        LoopConfig::default(),
    )
    .with_manual_commands(rx);

    for key in ["w", "b", "a", "d", "k"] {
        assert!(handle_line(key, &shared, &tx));
        assert_eq!(control.tick(), TickOutcome::Idle(RunState::Stopped));
    }

    assert!(!control.actuator_state().any_motor_moving());
    for side in [MotorSide::A, MotorSide::B] {
        assert!(motor_history(&control, side).iter().all(|duty| *duty == 0.0));
    }
    assert_eq!(control.actuator_state().servo_angle, 60.0);
}

#[cfg(unix)]
#[test]
fn test_hung_model_does_not_block_shutdown() {
    let shared = running();
    let classifier = CommandClassifier::new(
        "sh",
        vec!["-c".to_string(), "sleep 5; echo left".to_string()],
        LabelMap::default(),
    )
    .with_timeout(Duration::from_millis(200));
    let config = LoopConfig {
        tick: Duration::from_millis(10),
        idle_poll: Duration::from_millis(10),
        ..LoopConfig::default()
    };
    let mut control = ControlLoop::new(driver(), Frames(0), classifier, shared.clone(), config);

    let stopper = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            shared.request_shutdown();
        })
    };
    let started = Instant::now();
    let stats = control.run();
    stopper.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(stats.perception_errors >= 1);
    assert_eq!(stats.applied, 0);
    assert!(!control.actuator_state().any_motor_moving());
}
