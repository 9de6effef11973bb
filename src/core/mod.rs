//! Core building blocks of the classifier.
//!
//! This module contains:
//! - Configuration management
//! - Error handling
//! - Model runtime integration
//! - Prediction result types

pub mod config;
pub mod errors;
pub mod inference;
pub mod predictions;

pub use config::{ConfigError, ConfigValidator, OrtSessionConfig, PredictorConfig};
pub use errors::{ClassifierError, ClassifierResult};
pub use inference::{OrtModel, ScoreModel, load_session};
pub use predictions::PredictionResult;
