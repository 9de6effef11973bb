//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required path was not configured.
    #[error("missing required setting: {field}")]
    MissingField { field: &'static str },

    /// Error indicating that a model path does not exist.
    #[error("model path does not exist: {path}")]
    ModelPathNotFound { path: std::path::PathBuf },

    /// Error indicating that a label path does not exist.
    #[error("label path does not exist: {path}")]
    LabelPathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that validation failed.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Checks that a path exists and is a regular file.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            })
        } else if !path.is_file() {
            Err(ConfigError::InvalidConfig {
                message: format!("Model path is not a file: {}", path.display()),
            })
        } else {
            Ok(())
        }
    }

    /// Checks that a label file exists and is a regular file.
    fn validate_label_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            Err(ConfigError::LabelPathNotFound {
                path: path.to_path_buf(),
            })
        } else if !path.is_file() {
            Err(ConfigError::InvalidConfig {
                message: format!("Label path is not a file: {}", path.display()),
            })
        } else {
            Ok(())
        }
    }

    /// Validates image dimensions.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!(
                    "Image dimensions must be positive, got {}x{}",
                    width, height
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a value is a positive integer.
    fn validate_positive_usize(&self, value: usize, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0", field_name),
            })
        } else {
            Ok(())
        }
    }
}

/// Extension trait that converts validation failures into [`ClassifierError`](crate::core::ClassifierError).
pub trait ConfigValidatorExt: ConfigValidator + Sized {
    /// Validates the configuration and returns it on success.
    fn validate_and_wrap(self) -> Result<Self, crate::core::ClassifierError> {
        self.validate()?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}
