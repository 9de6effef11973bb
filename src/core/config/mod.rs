//! Configuration types for the classifier.
//!
//! * [`errors`] - `ConfigError` and the `ConfigValidator` trait
//! * [`onnx`] - ONNX Runtime session settings
//! * [`predictor`] - predictor configuration, loadable from JSON

pub mod errors;
pub mod onnx;
pub mod predictor;

pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use onnx::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
pub use predictor::{DEFAULT_INPUT_SHAPE, DEFAULT_TOPK, PredictorConfig};
