//! Car configuration file
//!
//! TOML, every section and key optional:
//!
//! ```toml
//! [servo]
//! center = 90.0
//! left_offset = 30.0
//! right_offset = 30.0
//! min_angle = 5.0
//! max_angle = 135.0
//! settle_ms = 500
//! release_on_stop = false
//!
//! [motor]
//! speed = 50.0
//! frequency_hz = 1000
//!
//! [pins]          # BCM numbering
//! servo = 18
//! motor_a_pwm = 12
//!
//! [control]
//! tick_ms = 100
//! label_map = ["straight", "left", "right"]
//!
//! [frames]
//! source = "folder"
//! folder = "frames"
//!
//! [classifier]
//! kind = "command"
//! command = "python3 predict.py"
//! ```
//!
//! Out-of-range values are clamped with a warning rather than rejected, so
//! a typo never leaves the car without a configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use line_trace_car_core::servo::AngleBand;
use line_trace_car_core::steering::{LabelMap, SteeringClass, SteeringTable, MAX_OFFSET_DEG, MIN_OFFSET_DEG};

use crate::libraries::actuator::{ActuatorPins, DriverConfig, MotorPins, PortFrequencies};

/// Configuration load failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `[servo]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoSection {
    pub center: f32,
    pub left_offset: f32,
    pub right_offset: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    pub settle_ms: u32,
    pub frequency_hz: u32,
    pub release_on_stop: bool,
}

impl Default for ServoSection {
    fn default() -> Self {
        Self {
            center: 90.0,
            left_offset: 30.0,
            right_offset: 30.0,
            min_angle: 5.0,
            max_angle: 135.0,
            settle_ms: 500,
            frequency_hz: 50,
            release_on_stop: false,
        }
    }
}

/// `[motor]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorSection {
    /// Drive duty in percent
    pub speed: f32,
    pub frequency_hz: u32,
}

impl Default for MotorSection {
    fn default() -> Self {
        Self {
            speed: 50.0,
            frequency_hz: 1000,
        }
    }
}

/// `[pins]`, BCM numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinSection {
    pub servo: u8,
    pub motor_a_pwm: u8,
    pub motor_a_in1: u8,
    pub motor_a_in2: u8,
    pub motor_b_pwm: u8,
    pub motor_b_in1: u8,
    pub motor_b_in2: u8,
}

impl Default for PinSection {
    fn default() -> Self {
        let pins = ActuatorPins::default();
        Self {
            servo: pins.servo,
            motor_a_pwm: pins.motor_a.pwm,
            motor_a_in1: pins.motor_a.in1,
            motor_a_in2: pins.motor_a.in2,
            motor_b_pwm: pins.motor_b.pwm,
            motor_b_in1: pins.motor_b.in1,
            motor_b_in2: pins.motor_b.in2,
        }
    }
}

/// `[control]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSection {
    pub tick_ms: u64,
    pub idle_poll_ms: u64,
    /// Class for each classifier output index
    pub label_map: Vec<String>,
    pub min_confidence: Option<f32>,
}

impl Default for ControlSection {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            idle_poll_ms: 50,
            label_map: LabelMap::default()
                .classes()
                .iter()
                .map(|class| class.name().to_string())
                .collect(),
            min_confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSourceKind {
    #[default]
    Folder,
    Camera,
}

/// `[frames]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSection {
    pub source: FrameSourceKind,
    pub folder: PathBuf,
    /// Keep polling the folder for new images
    pub watch: bool,
    /// Still-capture command writing JPEG to stdout
    pub capture_command: String,
    /// The capture command is killed after this long
    pub capture_timeout_ms: u64,
    /// Where live frames are staged for the classifier
    pub staging_path: PathBuf,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            source: FrameSourceKind::Folder,
            folder: PathBuf::from("frames"),
            watch: false,
            capture_command: "rpicam-still -n -t 1 --width 640 --height 480 -o -".to_string(),
            capture_timeout_ms: 5000,
            staging_path: std::env::temp_dir().join("line_trace_car_frame.jpg"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Command,
    Labels,
    #[default]
    Fixed,
}

/// `[classifier]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub kind: ClassifierKind,
    /// Inference command; the frame path is appended
    pub command: String,
    /// The inference command is killed after this long
    pub timeout_ms: u64,
    /// `filename,label` file for replay
    pub labels_path: PathBuf,
    pub fixed_class: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Fixed,
            command: String::new(),
            timeout_ms: 2000,
            labels_path: PathBuf::from("labeled_data.csv"),
            fixed_class: SteeringClass::Straight.name().to_string(),
        }
    }
}

/// `[recorder]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSection {
    pub enabled: bool,
    pub dir: PathBuf,
    pub interval_ms: u64,
    /// Defaults to `frames.capture_command`
    pub capture_command: Option<String>,
}

impl Default for RecorderSection {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("captured"),
            interval_ms: 1000,
            capture_command: None,
        }
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub servo: ServoSection,
    pub motor: MotorSection,
    pub pins: PinSection,
    pub control: ControlSection,
    pub frames: FrameSection,
    pub classifier: ClassifierSection,
    pub recorder: RecorderSection,
}

impl CarConfig {
    /// Read, parse and sanitize a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        crate::log_info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and sanitize TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CarConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Clamp every value into its valid range, warning about each change
    pub fn sanitized(mut self) -> Self {
        let servo = &mut self.servo;
        servo.center = clamp_warn("servo.center", servo.center, 0.0, 180.0);
        servo.left_offset = clamp_warn("servo.left_offset", servo.left_offset, 0.0, 90.0);
        servo.right_offset = clamp_warn("servo.right_offset", servo.right_offset, 0.0, 90.0);
        servo.min_angle = clamp_warn("servo.min_angle", servo.min_angle, 0.0, 180.0);
        servo.max_angle = clamp_warn("servo.max_angle", servo.max_angle, 0.0, 180.0);
        if servo.min_angle > servo.max_angle {
            crate::log_warn!(
                "Config: servo.min_angle {} > servo.max_angle {}, swapping",
                servo.min_angle,
                servo.max_angle
            );
            core::mem::swap(&mut servo.min_angle, &mut servo.max_angle);
        }
        servo.settle_ms = clamp_warn("servo.settle_ms", servo.settle_ms, 0, 5_000);
        servo.frequency_hz = clamp_warn("servo.frequency_hz", servo.frequency_hz, 40, 400);
        if !self.steering_table().offsets_in_observed_range() {
            crate::log_warn!(
                "Config: steering offsets outside the usual {}..{} degree range",
                MIN_OFFSET_DEG,
                MAX_OFFSET_DEG
            );
        }

        let motor = &mut self.motor;
        motor.speed = clamp_warn("motor.speed", motor.speed, 0.0, 100.0);
        motor.frequency_hz = clamp_warn("motor.frequency_hz", motor.frequency_hz, 1, 20_000);

        let control = &mut self.control;
        control.tick_ms = clamp_warn("control.tick_ms", control.tick_ms, 10, 10_000);
        control.idle_poll_ms = clamp_warn("control.idle_poll_ms", control.idle_poll_ms, 1, 1_000);
        control.min_confidence = control
            .min_confidence
            .map(|min| clamp_warn("control.min_confidence", min, 0.0, 1.0));

        self.recorder.interval_ms =
            clamp_warn("recorder.interval_ms", self.recorder.interval_ms, 100, 3_600_000);

        self.frames.capture_timeout_ms = clamp_warn(
            "frames.capture_timeout_ms",
            self.frames.capture_timeout_ms,
            10,
            60_000,
        );
        self.classifier.timeout_ms =
            clamp_warn("classifier.timeout_ms", self.classifier.timeout_ms, 10, 60_000);

        self
    }

    /// Class-to-angle table
    pub fn steering_table(&self) -> SteeringTable {
        SteeringTable {
            center: self.servo.center,
            left_offset: self.servo.left_offset,
            right_offset: self.servo.right_offset,
        }
    }

    /// Actuator driver calibration
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            table: self.steering_table(),
            band: AngleBand::new(self.servo.min_angle, self.servo.max_angle),
            settle_ms: self.servo.settle_ms,
            release_servo_on_stop: self.servo.release_on_stop,
        }
    }

    pub fn pins(&self) -> ActuatorPins {
        let pins = &self.pins;
        ActuatorPins {
            servo: pins.servo,
            motor_a: MotorPins {
                pwm: pins.motor_a_pwm,
                in1: pins.motor_a_in1,
                in2: pins.motor_a_in2,
            },
            motor_b: MotorPins {
                pwm: pins.motor_b_pwm,
                in1: pins.motor_b_in1,
                in2: pins.motor_b_in2,
            },
        }
    }

    pub fn frequencies(&self) -> PortFrequencies {
        PortFrequencies {
            servo_hz: self.servo.frequency_hz,
            motor_hz: self.motor.frequency_hz,
        }
    }

    /// Classifier index-to-class map
    ///
    /// Falls back to the default map if the configured one is not three
    /// known labels.
    pub fn label_map(&self) -> LabelMap {
        let classes: Option<Vec<SteeringClass>> = self
            .control
            .label_map
            .iter()
            .map(|label| SteeringClass::from_label(label))
            .collect();

        match classes.as_deref() {
            Some(&[a, b, c]) => LabelMap::new([a, b, c]),
            _ => {
                crate::log_warn!(
                    "Config: control.label_map {:?} is not three of left/straight/right, using default",
                    self.control.label_map
                );
                LabelMap::default()
            }
        }
    }

    /// Class for the fixed classifier, straight if unknown
    pub fn fixed_class(&self) -> SteeringClass {
        SteeringClass::from_label(&self.classifier.fixed_class).unwrap_or_else(|| {
            crate::log_warn!(
                "Config: unknown classifier.fixed_class {:?}, using straight",
                self.classifier.fixed_class
            );
            SteeringClass::Straight
        })
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.control.tick_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.control.idle_poll_ms)
    }

    pub fn recorder_interval(&self) -> Duration {
        Duration::from_millis(self.recorder.interval_ms)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier.timeout_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.frames.capture_timeout_ms)
    }

    /// Capture command for the recorder
    pub fn recorder_capture_command(&self) -> &str {
        self.recorder
            .capture_command
            .as_deref()
            .unwrap_or(&self.frames.capture_command)
    }
}

fn clamp_warn<T>(name: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + core::fmt::Display,
{
    // NaN fails both comparisons and maps to min
    let clamped = if value > max {
        max
    } else if value >= min {
        value
    } else {
        min
    };
    if clamped != value {
        crate::log_warn!("Config: {} = {} out of range, using {}", name, value, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CarConfig::from_toml_str("").unwrap();
        assert_eq!(config, CarConfig::default());
        assert_eq!(config.steering_table(), SteeringTable::default());
        assert_eq!(config.label_map(), LabelMap::default());
        assert_eq!(config.pins(), ActuatorPins::default());
        assert_eq!(config.tick_period(), Duration::from_millis(100));
        assert_eq!(config.idle_poll(), Duration::from_millis(50));
        assert_eq!(config.classifier_timeout(), Duration::from_millis(2000));
        assert_eq!(config.capture_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_partial_sections() {
        let config = CarConfig::from_toml_str(
            r#"
            [servo]
            center = 85.0
            left_offset = 25.0

            [control]
            label_map = ["left", "straight", "right"]
            min_confidence = 0.6

            [frames]
            source = "camera"

            [classifier]
            kind = "labels"
            labels_path = "run1/labels.csv"
            "#,
        )
        .unwrap();

        let table = config.steering_table();
        assert_eq!(table.center, 85.0);
        assert_eq!(table.left_offset, 25.0);
        assert_eq!(table.right_offset, 30.0);
        assert_eq!(config.label_map().class_for(0), Some(SteeringClass::Left));
        assert_eq!(config.control.min_confidence, Some(0.6));
        assert_eq!(config.frames.source, FrameSourceKind::Camera);
        assert_eq!(config.classifier.kind, ClassifierKind::Labels);
        assert_eq!(config.motor.speed, 50.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = CarConfig::from_toml_str(
            r#"
            [servo]
            center = 200.0
            min_angle = 150.0
            max_angle = 30.0

            [motor]
            speed = 140.0

            [control]
            tick_ms = 0
            min_confidence = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.servo.center, 180.0);
        assert_eq!(config.servo.min_angle, 30.0);
        assert_eq!(config.servo.max_angle, 150.0);
        assert_eq!(config.motor.speed, 100.0);
        assert_eq!(config.control.tick_ms, 10);
        assert_eq!(config.control.min_confidence, Some(1.0));
    }

    #[test]
    fn test_bad_label_map_falls_back() {
        let config = CarConfig::from_toml_str(
            r#"
            [control]
            label_map = ["left", "right"]
            "#,
        )
        .unwrap();
        assert_eq!(config.label_map(), LabelMap::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            CarConfig::from_toml_str("[servo]\ncenter = \"ninety\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CarConfig::load(dir.path().join("car.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.toml");
        std::fs::write(&path, "[motor]\nspeed = 35.0\n").unwrap();
        let config = CarConfig::load(&path).unwrap();
        assert_eq!(config.motor.speed, 35.0);
    }

    #[test]
    fn test_load_returns_sanitized_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.toml");
        std::fs::write(
            &path,
            "[motor]\nspeed = 250.0\n\n[classifier]\ntimeout_ms = 0\n\n[frames]\ncapture_timeout_ms = 900000\n",
        )
        .unwrap();

        let config = CarConfig::load(&path).unwrap();
        assert_eq!(config.motor.speed, 100.0);
        assert_eq!(config.classifier_timeout(), Duration::from_millis(10));
        assert_eq!(config.capture_timeout(), Duration::from_secs(60));
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_recorder_command_fallback() {
        let mut config = CarConfig::default();
        assert_eq!(
            config.recorder_capture_command(),
            config.frames.capture_command
        );
        config.recorder.capture_command = Some("fswebcam -".to_string());
        assert_eq!(config.recorder_capture_command(), "fswebcam -");
    }
}
