//! Predictor configuration.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::ClassifierResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of ranked results the frame callback asks for by default.
pub const DEFAULT_TOPK: usize = 2;

/// Default square input resolution expected by the bundled classifier.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (224, 224);

/// Configuration for building a [`Predictor`](crate::predictor::Predictor).
///
/// Every field is optional so partial JSON files can be layered under
/// command-line overrides; [`PredictorConfig::validate`] enforces what is
/// actually required.
///
/// ```json
/// {
///   "model_path": "models/mobilenet_v2.onnx",
///   "labels_path": "models/imagenet_labels.txt",
///   "topk": 3,
///   "ort_session": { "intra_threads": 2 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Path to the ONNX model file
    pub model_path: Option<PathBuf>,
    /// Path to the newline-delimited label file
    pub labels_path: Option<PathBuf>,
    /// Model name used in logs and errors; defaults to the model file stem
    pub model_name: Option<String>,
    /// Number of results returned by `predict_top`
    pub topk: Option<usize>,
    /// Model input shape as (width, height)
    pub input_shape: Option<(u32, u32)>,
    /// ONNX Runtime session settings
    pub ort_session: Option<OrtSessionConfig>,
}

impl PredictorConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> ClassifierResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Fills every unset field of `self` from `base`.
    pub fn or(self, base: PredictorConfig) -> Self {
        Self {
            model_path: self.model_path.or(base.model_path),
            labels_path: self.labels_path.or(base.labels_path),
            model_name: self.model_name.or(base.model_name),
            topk: self.topk.or(base.topk),
            input_shape: self.input_shape.or(base.input_shape),
            ort_session: self.ort_session.or(base.ort_session),
        }
    }

    /// Returns the configured top-k or the default.
    pub fn effective_topk(&self) -> usize {
        self.topk.unwrap_or(DEFAULT_TOPK)
    }

    /// Returns the configured input shape or the default.
    pub fn effective_input_shape(&self) -> (u32, u32) {
        self.input_shape.unwrap_or(DEFAULT_INPUT_SHAPE)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate(self)
    }
}

impl ConfigValidator for PredictorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let model_path = self
            .model_path
            .as_deref()
            .ok_or(ConfigError::MissingField {
                field: "model_path",
            })?;
        self.validate_model_path(model_path)?;

        let labels_path = self
            .labels_path
            .as_deref()
            .ok_or(ConfigError::MissingField {
                field: "labels_path",
            })?;
        self.validate_label_path(labels_path)?;

        if let Some(topk) = self.topk {
            self.validate_positive_usize(topk, "topk")?;
        }

        if let Some((width, height)) = self.input_shape {
            self.validate_image_dimensions(width, height)?;
        }

        if let Some(ort) = &self.ort_session {
            if ort.intra_threads == Some(0) || ort.inter_threads == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    message: "ORT thread counts must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self {
            topk: Some(DEFAULT_TOPK),
            input_shape: Some(DEFAULT_INPUT_SHAPE),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = PredictorConfig::from_json_str(r#"{ "topk": 5 }"#).unwrap();
        assert_eq!(cfg.topk, Some(5));
        assert_eq!(cfg.model_path, None);
        assert_eq!(cfg.effective_input_shape(), (224, 224));
    }

    #[test]
    fn test_validate_requires_paths() {
        let err = PredictorConfig::new().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "model_path"
            }
        ));
    }

    #[test]
    fn test_validate_missing_model_file() {
        let cfg = PredictorConfig {
            model_path: Some(PathBuf::from("/nonexistent/model.onnx")),
            labels_path: Some(PathBuf::from("/nonexistent/labels.txt")),
            ..PredictorConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ModelPathNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_topk_and_shape() {
        let model = NamedTempFile::new().unwrap();
        let labels = NamedTempFile::new().unwrap();
        let base = PredictorConfig {
            model_path: Some(model.path().to_path_buf()),
            labels_path: Some(labels.path().to_path_buf()),
            ..PredictorConfig::default()
        };
        assert!(base.validate().is_ok());

        let zero_topk = PredictorConfig {
            topk: Some(0),
            ..base.clone()
        };
        assert!(zero_topk.validate().is_err());

        let zero_shape = PredictorConfig {
            input_shape: Some((0, 224)),
            ..base
        };
        assert!(zero_shape.validate().is_err());
    }

    #[test]
    fn test_or_prefers_explicit_values() {
        let explicit = PredictorConfig {
            topk: Some(1),
            ..PredictorConfig::default()
        };
        let file = PredictorConfig {
            topk: Some(5),
            model_name: Some("mobilenet".to_string()),
            ..PredictorConfig::default()
        };
        let merged = explicit.or(file);
        assert_eq!(merged.topk, Some(1));
        assert_eq!(merged.model_name.as_deref(), Some("mobilenet"));
    }
}
