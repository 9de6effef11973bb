//! ONNX Runtime backed [`ScoreModel`].

use super::model::ScoreModel;
use super::session::load_session_with_config;
use crate::core::config::{DEFAULT_INPUT_SHAPE, OrtSessionConfig};
use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::processors::ChannelOrder;
use ndarray::ArrayView4;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A classification model loaded into a single ONNX Runtime session.
///
/// The session expects one 4D input of shape `[1, C, H, W]` (or `[1, H, W, C]`)
/// and produces one output whose values are the per-class scores.
pub struct OrtModel {
    session: Session,
    input_name: String,
    output_name: String,
    input_dims: (usize, usize, usize, usize),
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_dims", &self.input_dims)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtModel {
    /// Loads a model with default session settings and a 224x224 fallback
    /// input size.
    pub fn from_file(model_path: impl AsRef<Path>) -> ClassifierResult<Self> {
        Self::from_file_with(model_path, None, None, DEFAULT_INPUT_SHAPE)
    }

    /// Loads a model.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file
    /// * `model_name` - Name used in logs; defaults to the file stem
    /// * `ort_config` - Optional ONNX Runtime session settings
    /// * `fallback_shape` - (width, height) used for dynamic spatial dimensions
    pub fn from_file_with(
        model_path: impl AsRef<Path>,
        model_name: Option<&str>,
        ort_config: Option<&OrtSessionConfig>,
        fallback_shape: (u32, u32),
    ) -> ClassifierResult<Self> {
        let path = model_path.as_ref();
        let session = load_session_with_config(path, ort_config)?;

        let model_name = model_name
            .map(str::to_string)
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        let input = session.inputs.first().ok_or_else(|| {
            ClassifierError::model_load_error(
                path,
                "model declares no inputs",
                None,
                None::<std::io::Error>,
            )
        })?;
        let input_name = input.name.clone();
        let declared: Vec<i64> = match &input.input_type {
            ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
            other => {
                return Err(ClassifierError::model_load_error(
                    path,
                    format!("expected a tensor input, found {:?}", other),
                    None,
                    None::<std::io::Error>,
                ));
            }
        };
        let input_dims = resolve_input_dims(&declared, fallback_shape).ok_or_else(|| {
            ClassifierError::model_load_error(
                path,
                format!("unsupported input shape {:?}; expected 4 dimensions", declared),
                None,
                None::<std::io::Error>,
            )
        })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                ClassifierError::model_load_error(
                    path,
                    "model declares no outputs",
                    None,
                    None::<std::io::Error>,
                )
            })?;

        info!(
            "Loaded model '{}' from {} (input '{}' {:?}, output '{}')",
            model_name,
            path.display(),
            input_name,
            input_dims,
            output_name
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            input_dims,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the resolved input dimensions, batch first.
    pub fn input_dims(&self) -> (usize, usize, usize, usize) {
        self.input_dims
    }

    /// Returns the spatial input size as (width, height).
    pub fn input_size(&self) -> (u32, u32) {
        let (_, d1, d2, d3) = self.input_dims;
        match self.channel_order() {
            ChannelOrder::CHW => (d3 as u32, d2 as u32),
            ChannelOrder::HWC => (d2 as u32, d1 as u32),
        }
    }

    /// Infers the memory layout the model expects from its input shape.
    pub fn channel_order(&self) -> ChannelOrder {
        let (_, d1, _, d3) = self.input_dims;
        if d1 != 3 && d3 == 3 {
            ChannelOrder::HWC
        } else {
            ChannelOrder::CHW
        }
    }
}

/// Replaces dynamic dimensions: batch becomes 1, a dynamic channel axis
/// becomes 3, and dynamic spatial axes take the fallback size.
fn resolve_input_dims(
    declared: &[i64],
    (width, height): (u32, u32),
) -> Option<(usize, usize, usize, usize)> {
    if declared.len() != 4 {
        return None;
    }
    let fixed = |value: i64, fallback: usize| {
        if value > 0 { value as usize } else { fallback }
    };
    let channels_last = declared[3] == 3 && declared[1] != 3;
    if channels_last {
        Some((
            1,
            fixed(declared[1], height as usize),
            fixed(declared[2], width as usize),
            3,
        ))
    } else {
        Some((
            1,
            fixed(declared[1], 3),
            fixed(declared[2], height as usize),
            fixed(declared[3], width as usize),
        ))
    }
}

impl ScoreModel for OrtModel {
    fn predict(&mut self, input: &[f32]) -> ClassifierResult<Vec<f32>> {
        let view = ArrayView4::from_shape(self.input_dims, input)?;
        let tensor = TensorRef::from_array_view(view).map_err(|e| {
            ClassifierError::inference_error(
                &self.model_name,
                format!("failed to wrap input of shape {:?}", self.input_dims),
                e,
            )
        })?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| {
                ClassifierError::inference_error(
                    &self.model_name,
                    format!(
                        "ONNX Runtime inference failed with input '{}' -> output '{}'",
                        self.input_name, self.output_name
                    ),
                    e,
                )
            })?;

        let (shape, scores) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::inference_error(
                    &self.model_name,
                    format!("failed to extract output '{}' as f32", self.output_name),
                    e,
                )
            })?;
        debug!("Model '{}' produced output shape {:?}", self.model_name, shape);

        Ok(scores.to_vec())
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn input_len(&self) -> Option<usize> {
        let (n, a, b, c) = self.input_dims;
        Some(n * a * b * c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dynamic_batch() {
        assert_eq!(
            resolve_input_dims(&[-1, 3, 224, 224], (320, 320)),
            Some((1, 3, 224, 224))
        );
    }

    #[test]
    fn test_resolve_dynamic_spatial_uses_fallback() {
        assert_eq!(
            resolve_input_dims(&[1, 3, -1, -1], (256, 192)),
            Some((1, 3, 192, 256))
        );
    }

    #[test]
    fn test_resolve_channels_last() {
        assert_eq!(
            resolve_input_dims(&[1, 224, 224, 3], (224, 224)),
            Some((1, 224, 224, 3))
        );
    }

    #[test]
    fn test_resolve_rejects_non_4d() {
        assert_eq!(resolve_input_dims(&[1, 1000], (224, 224)), None);
    }

    #[test]
    fn test_missing_model_file_is_model_load_error() {
        let err = OrtModel::from_file("/nonexistent/mobilenet.onnx").unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }
}
