//! Error constructor helpers.
//!
//! These keep error construction at call sites short and consistent:
//!
//! ```rust
//! use live_classifier::core::ClassifierError;
//!
//! let error = ClassifierError::model_load_error(
//!     "models/mobilenet.onnx",
//!     "failed to create ONNX session",
//!     Some("verify model file exists and is readable"),
//!     None::<std::io::Error>,
//! );
//! assert!(error.to_string().contains("suggested fix"));
//! ```

use super::types::{ClassifierError, SimpleError};
use std::path::Path;

impl ClassifierError {
    /// Creates a model loading error.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path of the model that failed to load.
    /// * `reason` - Short description of the failure.
    /// * `suggestion` - Optional hint appended to the message.
    /// * `source` - Optional underlying error.
    pub fn model_load_error(
        model_path: impl AsRef<Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a label loading error.
    pub fn label_load_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::LabelLoad {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an inference error for the named model.
    pub fn inference_error(
        model_name: impl Into<String>,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an inference error that has no underlying source error.
    pub fn inference_message(model_name: impl Into<String>, context: impl Into<String>) -> Self {
        let context = context.into();
        Self::inference_error(model_name, context.clone(), SimpleError::new(context))
    }

    /// Creates an error describing a panic inside the model runtime.
    ///
    /// String payloads (from `panic!("...")`) are preserved; anything else is
    /// reported as an opaque panic.
    pub fn model_panic(
        model_name: impl Into<String>,
        payload: &(dyn std::any::Any + Send),
    ) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::ModelPanic {
            model_name: model_name.into(),
            message,
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    ///
    /// # Arguments
    ///
    /// * `component` - The component where validation failed.
    /// * `field` - The field that failed validation.
    /// * `expected` - Description of the expected value.
    /// * `actual` - The value that was observed.
    pub fn validation_error(component: &str, field: &str, expected: &str, actual: &str) -> Self {
        Self::InvalidInput {
            message: format!(
                "Validation failed in {}: field '{}' expected {}, but got '{}'",
                component, field, expected, actual
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_load_error_includes_suggestion() {
        let err = ClassifierError::model_load_error(
            "missing.onnx",
            "failed to create ONNX session",
            Some("check the path"),
            None::<std::io::Error>,
        );
        let message = err.to_string();
        assert!(message.contains("missing.onnx"));
        assert!(message.contains("suggested fix: check the path"));
    }

    #[test]
    fn test_model_panic_preserves_string_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = ClassifierError::model_panic("fake", payload.as_ref());
        assert!(err.to_string().contains("boom"));

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        let err = ClassifierError::model_panic("fake", payload.as_ref());
        assert!(err.to_string().contains("owned boom"));

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u32);
        let err = ClassifierError::model_panic("fake", payload.as_ref());
        assert!(err.to_string().contains("non-string panic payload"));
    }

    #[test]
    fn test_validation_error_message() {
        let err = ClassifierError::validation_error("Predictor", "buffer", "150528 values", "12");
        assert!(err.to_string().contains("field 'buffer'"));
    }
}
