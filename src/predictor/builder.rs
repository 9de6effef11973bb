//! Builder for [`Predictor`].

use super::gate::Predictor;
use crate::core::config::{ConfigValidator, ConfigValidatorExt, OrtSessionConfig, PredictorConfig};
use crate::core::{ClassifierError, ClassifierResult, ConfigError, OrtModel, ScoreModel};
use crate::processors::FrameNormalizer;
use crate::utils::LabelTable;
use std::path::PathBuf;
use tracing::info;

/// Builder for a [`Predictor`] backed by an ONNX model.
///
/// Every resource is loaded in [`build`](PredictorBuilder::build); a missing
/// model or label file fails there instead of on the first frame.
///
/// ```rust,no_run
/// use live_classifier::predictor::PredictorBuilder;
///
/// let predictor = PredictorBuilder::new()
///     .model_path("models/mobilenet_v2.onnx")
///     .labels_path("models/imagenet_labels.txt")
///     .topk(3)
///     .build()?;
/// # Ok::<(), live_classifier::core::ClassifierError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PredictorBuilder {
    config: PredictorConfig,
}

impl PredictorBuilder {
    /// Creates a builder with no paths set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Sets the ONNX model path.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    /// Sets the label file path.
    pub fn labels_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.labels_path = Some(path.into());
        self
    }

    /// Sets the model name used in logs and errors.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.config.model_name = Some(name.into());
        self
    }

    /// Sets the default number of ranked results.
    pub fn topk(mut self, topk: usize) -> Self {
        self.config.topk = Some(topk);
        self
    }

    /// Sets the input shape used when the model declares dynamic spatial
    /// dimensions.
    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.config.input_shape = Some(shape);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.config.ort_session = Some(config);
        self
    }

    /// Returns the configuration collected so far.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Validates the configuration, then loads the labels and the model.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is missing or does not exist, if a value is
    /// out of range, if the label file is empty, or if ONNX Runtime cannot
    /// load the model.
    pub fn build(self) -> ClassifierResult<Predictor<OrtModel>> {
        self.build_with_normalizer().map(|(predictor, _)| predictor)
    }

    /// Like [`build`](PredictorBuilder::build), also returning a
    /// [`FrameNormalizer`] that produces buffers of the size and layout the
    /// loaded model expects.
    pub fn build_with_normalizer(self) -> ClassifierResult<(Predictor<OrtModel>, FrameNormalizer)> {
        let config = self.config.validate_and_wrap()?;
        let model_path = config.model_path.as_deref().ok_or(ConfigError::MissingField {
            field: "model_path",
        })?;
        let labels_path = config.labels_path.as_deref().ok_or(ConfigError::MissingField {
            field: "labels_path",
        })?;

        let labels = LabelTable::from_file(labels_path)?;
        let model = OrtModel::from_file_with(
            model_path,
            config.model_name.as_deref(),
            config.ort_session.as_ref(),
            config.effective_input_shape(),
        )?;
        let normalizer =
            FrameNormalizer::imagenet(model.input_size())?.with_order(model.channel_order());

        let predictor = Predictor::new(model, labels)?.with_default_topk(config.effective_topk());
        info!(
            "Predictor ready: model '{}', {} labels, top-{}",
            predictor.model_name(),
            predictor.labels().len(),
            predictor.default_topk()
        );
        Ok((predictor, normalizer))
    }

    /// Wraps an already constructed model with the configured labels and
    /// top-k. The model path is ignored.
    pub fn build_with_model<M: ScoreModel>(self, model: M) -> ClassifierResult<Predictor<M>> {
        let config = self.config;
        let labels_path = config
            .labels_path
            .as_deref()
            .ok_or(ConfigError::MissingField {
                field: "labels_path",
            })?;
        config.validate_label_path(labels_path)?;
        if let Some(topk) = config.topk {
            config.validate_positive_usize(topk, "topk")?;
        }

        let labels = LabelTable::from_file(labels_path)?;
        Ok(Predictor::new(model, labels)?.with_default_topk(config.effective_topk()))
    }
}

impl TryFrom<PredictorBuilder> for Predictor<OrtModel> {
    type Error = ClassifierError;

    fn try_from(builder: PredictorBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
