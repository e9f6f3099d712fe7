//! Perception subsystem
//!
//! Wraps the externally trained steering classifier. The model itself is
//! opaque: it receives a frame and answers with a class index or label and
//! an optional confidence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Frame    ┌──────────────────────┐  Prediction  ┌─────────────┐
//! │ FrameSource  │──────────►│  Classifier (trait)  │────────────►│ ControlLoop │
//! └──────────────┘            └──────────┬───────────┘              └─────────────┘
//!                                        │
//!                   ┌────────────────────┼────────────────────┐
//!                   ▼                    ▼                    ▼
//!          ┌─────────────────┐ ┌──────────────────────┐ ┌─────────────────┐
//!          │CommandClassifier│ │ LabelFileClassifier  │ │ FixedClassifier │
//!          │ (model process) │ │ (recorded labels)    │ │ (bench)         │
//!          └─────────────────┘ └──────────────────────┘ └─────────────────┘
//! ```

pub mod command;
pub mod labels;

pub use command::CommandClassifier;
pub use labels::LabelFileClassifier;

use std::time::Duration;

use line_trace_car_core::steering::{LabelMap, SteeringClass};

use crate::devices::traits::Frame;

/// Classification failures
///
/// Any of these makes the control loop hold its last good class.
#[derive(Debug, thiserror::Error)]
pub enum PerceptionError {
    /// The inference command could not be run or exited unsuccessfully
    #[error("classifier command failed: {0}")]
    Command(String),

    /// Classifier output could not be parsed
    #[error("unparseable classifier output: {0:?}")]
    Parse(String),

    /// Index or label outside the label map
    #[error("unknown label {0:?}")]
    UnknownLabel(String),

    /// No recorded label for this frame
    #[error("no label recorded for {0}")]
    MissingLabel(String),

    /// The inference command missed its deadline and was killed
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    /// Prediction below the configured confidence floor
    #[error("confidence {confidence:.2} below minimum {min:.2}")]
    LowConfidence { confidence: f32, min: f32 },

    #[error("label file error: {0}")]
    Io(#[from] std::io::Error),
}

/// One classification result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class: SteeringClass,
    /// Probability of `class` in [0, 1], if the model reports one
    pub confidence: Option<f32>,
}

impl Prediction {
    pub fn new(class: SteeringClass) -> Self {
        Self {
            class,
            confidence: None,
        }
    }

    pub fn with_confidence(class: SteeringClass, confidence: f32) -> Self {
        Self {
            class,
            confidence: Some(confidence),
        }
    }

    /// Reject predictions below `min`
    ///
    /// Predictions without a confidence always pass.
    pub fn require_confidence(self, min: Option<f32>) -> Result<Self, PerceptionError> {
        match (self.confidence, min) {
            (Some(confidence), Some(min)) if confidence < min => {
                Err(PerceptionError::LowConfidence { confidence, min })
            }
            _ => Ok(self),
        }
    }
}

/// Steering classifier
pub trait Classifier {
    /// Classify one frame
    ///
    /// # Errors
    ///
    /// Returns a `PerceptionError` when no class can be determined.
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, PerceptionError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, PerceptionError> {
        (**self).classify(frame)
    }
}

/// Always predicts the same class
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    class: SteeringClass,
}

impl FixedClassifier {
    pub fn new(class: SteeringClass) -> Self {
        Self { class }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&mut self, _frame: &Frame) -> Result<Prediction, PerceptionError> {
        Ok(Prediction::new(self.class))
    }
}

/// Parse one classifier answer
///
/// Accepted forms, whitespace or comma separated:
///
/// - `<index> [confidence]`: class index into `labels`
/// - `<label> [confidence]`: `left` / `straight` / `right` (or `l` / `s` / `r`)
/// - `<p0> <p1> <p2>`: one score per label map entry, integer one-hot
///   included; the largest wins
pub fn parse_prediction(output: &str, labels: &LabelMap) -> Result<Prediction, PerceptionError> {
    let tokens: Vec<&str> = output
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();

    let Some(first) = tokens.first() else {
        return Err(PerceptionError::Parse(output.trim().to_string()));
    };

    if tokens.len() == labels.classes().len() {
        if let Some(probabilities) = parse_probabilities(&tokens) {
            return argmax_prediction(&probabilities, labels);
        }
    }

    if tokens.len() > 2 {
        return Err(PerceptionError::Parse(output.trim().to_string()));
    }

    let class = match first.parse::<usize>() {
        Ok(index) => labels
            .class_for(index)
            .ok_or_else(|| PerceptionError::UnknownLabel(first.to_string()))?,
        Err(_) => SteeringClass::from_label(first)
            .ok_or_else(|| PerceptionError::UnknownLabel(first.to_string()))?,
    };

    match tokens.get(1) {
        None => Ok(Prediction::new(class)),
        Some(raw) => {
            let confidence = raw
                .parse::<f32>()
                .ok()
                .filter(|c| c.is_finite())
                .ok_or_else(|| PerceptionError::Parse(output.trim().to_string()))?;
            Ok(Prediction::with_confidence(class, confidence))
        }
    }
}

fn parse_probabilities(tokens: &[&str]) -> Option<Vec<f32>> {
    tokens
        .iter()
        .map(|token| token.parse::<f32>().ok().filter(|p| p.is_finite()))
        .collect()
}

fn argmax_prediction(probabilities: &[f32], labels: &LabelMap) -> Result<Prediction, PerceptionError> {
    let (index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });
    let class = labels
        .class_for(index)
        .ok_or_else(|| PerceptionError::UnknownLabel(index.to_string()))?;
    Ok(Prediction::with_confidence(class, confidence))
}
