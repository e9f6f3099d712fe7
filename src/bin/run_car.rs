//! Line trace car runner.
//!
//! Loads the TOML configuration, claims the actuator pins, and runs the
//! control loop until the operator quits or Ctrl-C is pressed. Operator
//! keys are read from stdin, one per line.
//!
//! Usage:
//!   cargo run --bin run_car -- [OPTIONS]
//!   cargo run --release --features rpi --bin run_car -- --config car.toml
//!
//! Options:
//!   -c, --config <PATH>  Configuration file (default: built-in defaults)
//!   --mock               Use the mock platform even when built with `rpi`
//!   --start              Begin in Running instead of Stopped
//!   -h, --help           Show this help

use std::env;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use anyhow::Context;

use line_trace_car::car_core::mode::{OperatorCommand, RunState, SharedRunState};
use line_trace_car::communication::OperatorListener;
use line_trace_car::devices::camera::{CameraSource, CommandCapture, FolderSource, FrameRecorder};
use line_trace_car::devices::traits::FrameSource;
use line_trace_car::libraries::actuator::HBridgeActuatorPort;
use line_trace_car::libraries::ActuatorDriver;
use line_trace_car::logging::{init_logging, DEFAULT_FILTER};
use line_trace_car::parameters::{CarConfig, ClassifierKind, FrameSourceKind};
use line_trace_car::platform::{Platform, SystemClock};
use line_trace_car::rover::{ControlLoop, LoopConfig, LoopStats};
use line_trace_car::subsystems::perception::{
    Classifier, CommandClassifier, FixedClassifier, LabelFileClassifier,
};
use line_trace_car::{log_error, log_info, log_warn};

struct Args {
    config: Option<PathBuf>,
    mock: bool,
    start: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        mock: false,
        start: false,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                let Some(path) = raw.get(i) else {
                    eprintln!("Error: --config requires a value");
                    process::exit(1);
                };
                args.config = Some(PathBuf::from(path));
            }
            "--mock" => args.mock = true,
            "--start" => args.start = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn print_usage() {
    eprintln!(
        "Usage: run_car [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -c, --config <PATH>  Configuration file (default: built-in defaults)\n\
         \x20 --mock               Use the mock platform even when built with `rpi`\n\
         \x20 --start              Begin in Running instead of Stopped\n\
         \x20 -h, --help           Show this help"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging(DEFAULT_FILTER);

    // `load` sanitizes; the defaults are already in range
    let config = match &args.config {
        Some(path) => CarConfig::load(path)?,
        None => {
            log_info!("No --config given, using defaults");
            CarConfig::default()
        }
    };

    let shared = Arc::new(SharedRunState::new());
    if args.start {
        shared.set(RunState::Running);
    }

    let (manual_tx, manual_rx) = mpsc::channel();
    let listener = OperatorListener::spawn(
        BufReader::new(std::io::stdin()),
        shared.clone(),
        manual_tx,
    )
    .context("starting operator listener")?;

    let recorder = if config.recorder.enabled {
        let capture = CommandCapture::from_command_line(config.recorder_capture_command())
            .context("recorder capture command is empty")?
            .with_timeout(config.capture_timeout());
        Some(
            FrameRecorder::spawn(
                capture,
                &config.recorder.dir,
                config.recorder_interval(),
                shared.clone(),
            )
            .context("starting frame recorder")?,
        )
    } else {
        None
    };

    let mut control = {
        let shared = shared.clone();
        let use_mock = args.mock;
        tokio::task::spawn_blocking(move || run_on_platform(&config, shared, manual_rx, use_mock))
    };

    let result = tokio::select! {
        result = &mut control => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                log_warn!("Ctrl-C handler failed: {}", e);
            }
            log_info!("Interrupted, shutting down");
            shared.request_shutdown();
            control.await
        }
    };

    // The loop may have exited on its own error; stop the other threads too
    shared.request_shutdown();
    if let Some(recorder) = recorder {
        log_info!("Recorder saved {} frames", recorder.join());
    }
    if !listener.is_finished() {
        log_info!("Operator listener still waiting on stdin; exiting anyway");
    }

    match result.context("control loop task panicked")? {
        Ok(stats) => {
            log_info!(
                "Done: {} ticks, {} applied, {} held, {} perception errors",
                stats.ticks,
                stats.applied,
                stats.held,
                stats.perception_errors
            );
            Ok(())
        }
        Err(e) => {
            log_error!("Control loop failed: {:#}", e);
            Err(e)
        }
    }
}

#[cfg(feature = "rpi")]
fn run_on_platform(
    config: &CarConfig,
    shared: Arc<SharedRunState>,
    manual: Receiver<OperatorCommand>,
    use_mock: bool,
) -> anyhow::Result<LoopStats> {
    if use_mock {
        return run_mock(config, shared, manual);
    }
    let platform = line_trace_car::platform::rpi::RpiPlatform::init()
        .context("opening Raspberry Pi GPIO")?;
    run_control_loop(platform, config, shared, manual)
}

#[cfg(not(feature = "rpi"))]
fn run_on_platform(
    config: &CarConfig,
    shared: Arc<SharedRunState>,
    manual: Receiver<OperatorCommand>,
    use_mock: bool,
) -> anyhow::Result<LoopStats> {
    if !use_mock {
        log_warn!("Built without the `rpi` feature, using the mock platform");
    }
    run_mock(config, shared, manual)
}

#[cfg(feature = "mock")]
fn run_mock(
    config: &CarConfig,
    shared: Arc<SharedRunState>,
    manual: Receiver<OperatorCommand>,
) -> anyhow::Result<LoopStats> {
    let platform = line_trace_car::platform::mock::MockPlatform::new();
    run_control_loop(platform, config, shared, manual)
}

#[cfg(not(feature = "mock"))]
fn run_mock(
    _config: &CarConfig,
    _shared: Arc<SharedRunState>,
    _manual: Receiver<OperatorCommand>,
) -> anyhow::Result<LoopStats> {
    anyhow::bail!("mock platform not available; rebuild with the `mock` feature")
}

fn run_control_loop<PL: Platform>(
    mut platform: PL,
    config: &CarConfig,
    shared: Arc<SharedRunState>,
    manual: Receiver<OperatorCommand>,
) -> anyhow::Result<LoopStats> {
    let driver_config = config.driver_config();
    let initial_duty = line_trace_car::car_core::servo::angle_to_duty(
        line_trace_car::car_core::servo::clamp_angle(driver_config.table.center, &driver_config.band),
    );
    let port = HBridgeActuatorPort::create(
        &mut platform,
        &config.pins(),
        &config.frequencies(),
        initial_duty,
    )
    .context("claiming actuator pins")?;
    let driver = ActuatorDriver::new(port, SystemClock::new(), driver_config);

    let frames = open_frames(config)?;
    let classifier = open_classifier(config)?;
    let loop_config = LoopConfig {
        tick: config.tick_period(),
        idle_poll: config.idle_poll(),
        speed: config.motor.speed,
        min_confidence: config.control.min_confidence,
    };

    let mut control = ControlLoop::new(driver, frames, classifier, shared, loop_config)
        .with_manual_commands(manual);
    control
        .driver_mut()
        .init()
        .context("moving actuators to neutral")?;

    Ok(control.run())
}

fn open_frames(config: &CarConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    let frames = &config.frames;
    match frames.source {
        FrameSourceKind::Folder => {
            let mut source = FolderSource::open(&frames.folder)
                .with_context(|| format!("opening frame folder {}", frames.folder.display()))?;
            if frames.watch {
                source = source.watch(config.idle_poll());
            }
            Ok(Box::new(source))
        }
        FrameSourceKind::Camera => {
            let capture = CommandCapture::from_command_line(&frames.capture_command)
                .context("frames.capture_command is empty")?
                .with_timeout(config.capture_timeout());
            log_info!("Camera source: {}", frames.capture_command);
            Ok(Box::new(CameraSource::new(capture, &frames.staging_path)))
        }
    }
}

fn open_classifier(config: &CarConfig) -> anyhow::Result<Box<dyn Classifier>> {
    let labels = config.label_map();
    match config.classifier.kind {
        ClassifierKind::Command => {
            let classifier = CommandClassifier::from_command_line(&config.classifier.command, labels)
                .context("classifier.command is empty")?
                .with_timeout(config.classifier_timeout());
            log_info!(
                "Command classifier: {} (timeout {} ms)",
                config.classifier.command,
                config.classifier.timeout_ms
            );
            Ok(Box::new(classifier))
        }
        ClassifierKind::Labels => {
            let path = &config.classifier.labels_path;
            let classifier = LabelFileClassifier::load(path, &labels)
                .with_context(|| format!("loading labels from {}", path.display()))?;
            log_info!("Label file classifier: {} entries", classifier.len());
            Ok(Box::new(classifier))
        }
        ClassifierKind::Fixed => {
            let class = config.fixed_class();
            log_info!("Fixed classifier: always {}", class);
            Ok(Box::new(FixedClassifier::new(class)))
        }
    }
}
