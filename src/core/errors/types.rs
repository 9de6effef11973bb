//! Error type definitions for the classifier.

use std::path::PathBuf;
use thiserror::Error;

/// Enum representing the errors that can occur while loading resources,
/// normalizing frames, or running the model.
///
/// Per-frame failures are normally carried inside
/// [`Prediction::Failed`](crate::predictor::Prediction::Failed) rather than
/// returned, so callers see this type directly only from constructors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The model artifact could not be opened or turned into a session.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path of the model file.
        model_path: String,
        /// Why loading failed.
        reason: String,
        /// Optional hint, already formatted with a leading separator.
        suggestion: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The label file could not be read.
    #[error("failed to load labels from '{}'", .path.display())]
    LabelLoad {
        /// Path of the label file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The model runtime returned an error for a frame.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The model runtime panicked while scoring a frame.
    #[error("model '{model_name}' panicked during inference: {message}")]
    ModelPanic {
        /// Name of the model that panicked.
        model_name: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating a buffer is too small.
    #[error("buffer too small: expected at least {expected} bytes, got {actual} bytes")]
    BufferTooSmall {
        /// The expected minimum buffer size.
        expected: usize,
        /// The actual buffer size.
        actual: usize,
    },

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

impl From<crate::core::config::ConfigError> for ClassifierError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

/// A plain message error, used where a source is required but the failure
/// has no underlying error of its own.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new `SimpleError` from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
