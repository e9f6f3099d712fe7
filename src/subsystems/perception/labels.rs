//! Recorded label replay
//!
//! Reads the `filename,label` files written while labeling training images
//! and answers with the recorded label for each frame. Used to replay a
//! labeled folder through the control loop without the model.

use std::collections::HashMap;
use std::path::Path;

use line_trace_car_core::steering::{LabelMap, SteeringClass};

use super::{parse_prediction, Classifier, PerceptionError, Prediction};
use crate::devices::traits::Frame;

/// Classifier answering from a `filename,label` table
#[derive(Debug, Clone, Default)]
pub struct LabelFileClassifier {
    labels: HashMap<String, SteeringClass>,
}

impl LabelFileClassifier {
    /// Load a label file
    ///
    /// Blank lines, `#` comments and a `filename,label` header are skipped.
    /// Labels may be names (`left`) or indices into `label_map`.
    ///
    /// # Errors
    ///
    /// Returns `PerceptionError::Io` if the file cannot be read, and
    /// `Parse` / `UnknownLabel` for the first malformed row.
    pub fn load(path: impl AsRef<Path>, label_map: &LabelMap) -> Result<Self, PerceptionError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let classifier = Self::parse(&text, label_map)?;
        crate::log_info!(
            "Loaded {} labels from {}",
            classifier.len(),
            path.as_ref().display()
        );
        Ok(classifier)
    }

    /// Parse label file contents
    pub fn parse(text: &str, label_map: &LabelMap) -> Result<Self, PerceptionError> {
        let mut labels = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((name, label)) = line.split_once(',') else {
                return Err(PerceptionError::Parse(line.to_string()));
            };
            let (name, label) = (name.trim(), label.trim());
            if name.eq_ignore_ascii_case("filename") && label.eq_ignore_ascii_case("label") {
                continue;
            }

            let prediction = parse_prediction(label, label_map)?;
            labels.insert(name.to_string(), prediction.class);
        }
        Ok(Self { labels })
    }

    /// Number of labeled frames
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Classifier for LabelFileClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, PerceptionError> {
        let name = frame
            .file_name()
            .ok_or_else(|| PerceptionError::MissingLabel(frame.path.display().to_string()))?;
        self.labels
            .get(name)
            .map(|class| Prediction::new(*class))
            .ok_or_else(|| PerceptionError::MissingLabel(name.to_string()))
    }
}
