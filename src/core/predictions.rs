//! Prediction result types.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One labeled class score produced by ranking a model's output.
///
/// The label is shared with the [`LabelTable`](crate::utils::LabelTable), so
/// results for the same class always point at the same string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Raw score reported by the model for this class
    pub score: f32,
    /// Human-readable class name
    pub label: Arc<str>,
    /// Position of the class in the model output and label table
    pub class_id: usize,
}

impl PredictionResult {
    /// Creates a new prediction result.
    pub fn new(score: f32, label: Arc<str>, class_id: usize) -> Self {
        Self {
            score,
            label,
            class_id,
        }
    }

    /// Returns the label as a string slice.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Formats as `87.25% -> tabby cat`, the form shown on the preview overlay.
impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% -> {}", self.score, self.label)
    }
}
