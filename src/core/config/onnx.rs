//! ONNX Runtime configuration types.

use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Execution providers for ONNX Runtime.
///
/// Providers other than CPU are only honoured when the matching cargo feature
/// is enabled; otherwise they are skipped with a warning and ONNX Runtime
/// falls back to CPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
    /// CoreML execution provider (macOS/iOS only)
    CoreML,
    /// XNNPACK execution provider (mobile CPUs)
    XNNPACK,
}

/// Configuration for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode
    pub parallel_execution: Option<bool>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = Some(enabled);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Sets the execution providers in order of preference.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Appends a single execution provider.
    pub fn add_execution_provider(mut self, provider: OrtExecutionProvider) -> Self {
        self.execution_providers
            .get_or_insert_with(Vec::new)
            .push(provider);
        self
    }

    /// Parses a device string such as `cpu`, `cuda`, `cuda:1`, `coreml`
    /// or `xnnpack` into a provider list with a CPU fallback.
    pub fn for_device(device: &str) -> Result<Self, crate::core::ClassifierError> {
        let device = device.trim().to_lowercase();
        let primary = match device.as_str() {
            "cpu" => None,
            "cuda" | "gpu" => Some(OrtExecutionProvider::CUDA { device_id: Some(0) }),
            "coreml" => Some(OrtExecutionProvider::CoreML),
            "xnnpack" => Some(OrtExecutionProvider::XNNPACK),
            other => match other.strip_prefix("cuda:") {
                Some(id) => {
                    let device_id: i32 = id.parse().map_err(|_| {
                        crate::core::ClassifierError::config_error(format!(
                            "Invalid CUDA device ordinal: {}",
                            id
                        ))
                    })?;
                    Some(OrtExecutionProvider::CUDA {
                        device_id: Some(device_id),
                    })
                }
                None => {
                    return Err(crate::core::ClassifierError::config_error(format!(
                        "Unsupported device: {}. Supported devices: cpu, cuda, cuda:N, coreml, xnnpack",
                        other
                    )));
                }
            },
        };

        let providers = primary
            .into_iter()
            .chain(std::iter::once(OrtExecutionProvider::CPU))
            .collect();
        Ok(Self::new().with_execution_providers(providers))
    }
}
