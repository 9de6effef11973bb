//! Error types for the classifier.
//!
//! Construction-time failures (missing model, unreadable label file, bad
//! configuration) are returned as [`ClassifierError`]. Per-frame failures are
//! absorbed by the gate and surfaced inside its `Prediction` value.
//!
//! # Usage
//!
//! ```rust
//! use live_classifier::core::errors::ClassifierError;
//!
//! let config_error = ClassifierError::config_error("Missing required model path");
//! let validation_error = ClassifierError::validation_error(
//!     "FrameNormalizer",
//!     "input_shape",
//!     "non-zero dimensions",
//!     "(0, 224)",
//! );
//! ```

pub mod constructors;
pub mod types;

pub use types::{ClassifierError, SimpleError};

/// Convenient result alias for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;
