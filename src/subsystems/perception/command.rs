//! External inference command
//!
//! Runs the trained model as a child process once per frame:
//! `<program> <args...> <frame path>`. The first non-empty stdout line is
//! parsed with [`parse_prediction`]. A model that misses its deadline is
//! killed and the tick reports [`PerceptionError::Timeout`].

use std::time::Duration;

use line_trace_car_core::steering::LabelMap;

use super::{parse_prediction, Classifier, PerceptionError, Prediction};
use crate::devices::traits::Frame;
use crate::libraries::ext_command::{CommandError, ExternalCommand};

/// Deadline for one inference when none is configured
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Classifier backed by an external command
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    command: ExternalCommand,
    labels: LabelMap,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>, labels: LabelMap) -> Self {
        Self {
            command: ExternalCommand::new(program, args).with_timeout(DEFAULT_CLASSIFY_TIMEOUT),
            labels,
        }
    }

    /// Split a whitespace-separated command line
    ///
    /// Returns `None` for an empty line.
    pub fn from_command_line(line: &str, labels: LabelMap) -> Option<Self> {
        let command = ExternalCommand::from_command_line(line)?;
        Some(Self {
            command: command.with_timeout(DEFAULT_CLASSIFY_TIMEOUT),
            labels,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command = self.command.with_timeout(timeout);
        self
    }

    pub fn command(&self) -> &ExternalCommand {
        &self.command
    }
}

impl Classifier for CommandClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, PerceptionError> {
        let stdout = self
            .command
            .run([&frame.path])
            .map_err(|error| match error {
                CommandError::TimedOut { timeout, .. } => PerceptionError::Timeout(timeout),
                other => PerceptionError::Command(other.to_string()),
            })?;

        let stdout = String::from_utf8_lossy(&stdout);
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("");
        let prediction = parse_prediction(line, &self.labels)?;

        crate::log_trace!(
            "Frame {} classified as {} ({:?})",
            frame.index,
            prediction.class,
            prediction.confidence
        );
        Ok(prediction)
    }
}
