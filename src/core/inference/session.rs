//! Helpers for creating ONNX Runtime sessions.

use crate::core::config::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::ClassifierError;
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::{
    Session,
    builder::{GraphOptimizationLevel, SessionBuilder},
};
use std::path::Path;
use tracing::warn;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

/// Loads a session with default logging configuration.
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session, ClassifierError> {
    load_session_with_config(model_path, None)
}

/// Loads a session, applying the given ORT settings when present.
///
/// Fails fast: a missing or unreadable model file is reported as
/// [`ClassifierError::ModelLoad`] before ONNX Runtime is asked to parse it.
pub fn load_session_with_config(
    model_path: impl AsRef<Path>,
    config: Option<&OrtSessionConfig>,
) -> Result<Session, ClassifierError> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(ClassifierError::model_load_error(
            path,
            "model file not found",
            Some("verify model file exists and is readable"),
            None::<std::io::Error>,
        ));
    }

    let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
    let builder = match config {
        Some(cfg) => apply_ort_config(builder, cfg)?,
        None => builder,
    };
    builder.commit_from_file(path).map_err(|e| {
        ClassifierError::model_load_error(
            path,
            SESSION_CREATION_FAILURE,
            Some("check execution provider configuration and model file"),
            Some(e),
        )
    })
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(par) = cfg.parallel_execution {
        builder = builder.with_parallel_execution(par)?;
    }
    if let Some(level) = cfg.optimization_level {
        let mapped = match level {
            OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
            OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    if let Some(eps) = &cfg.execution_providers {
        let providers = build_execution_providers(eps);
        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers)?;
        }
    }
    Ok(builder)
}

fn build_execution_providers(eps: &[OrtExecutionProvider]) -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::with_capacity(eps.len());

    for ep in eps {
        match ep {
            OrtExecutionProvider::CPU => {
                providers.push(ort::execution_providers::CPUExecutionProvider::default().build());
            }
            #[cfg(feature = "cuda")]
            OrtExecutionProvider::CUDA { device_id } => {
                let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                if let Some(id) = device_id {
                    cuda = cuda.with_device_id(*id);
                }
                providers.push(cuda.build());
            }
            #[cfg(feature = "coreml")]
            OrtExecutionProvider::CoreML => {
                providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
            }
            #[cfg(feature = "xnnpack")]
            OrtExecutionProvider::XNNPACK => {
                providers
                    .push(ort::execution_providers::XNNPACKExecutionProvider::default().build());
            }
            #[allow(unreachable_patterns)]
            other => {
                warn!(
                    "Execution provider {:?} requested but its feature is not enabled; skipping",
                    other
                );
            }
        }
    }

    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_fails_fast() {
        let err = load_session("/nonexistent/model.onnx").unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_cpu_provider_is_always_built() {
        let providers = build_execution_providers(&[OrtExecutionProvider::CPU]);
        assert_eq!(providers.len(), 1);
    }
}
