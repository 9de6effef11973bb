//! # Live Classifier
//!
//! Real-time image classification for camera frames using ONNX models.
//!
//! Frames arrive faster than a model can score them. The [`Predictor`](predictor::Predictor)
//! gate lets exactly one frame reach the model at a time and drops every frame
//! that arrives while an inference is in flight. Served frames are ranked into
//! the top-k labeled class scores.
//!
//! ## Features
//!
//! - Single-flight inference gate with drop-on-busy semantics
//! - Top-k ranking paired with a newline-delimited label file
//! - ImageNet-style frame normalization from decoded images or raw BGRA buffers
//! - ONNX Runtime integration with CPU, CUDA, CoreML and XNNPACK providers
//! - JSON configuration and a fluent builder
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, the model capability and result types
//! * [`predictor`] - The inference gate, its builder and statistics
//! * [`processors`] - Frame normalization and score ranking
//! * [`utils`] - Label tables, image loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use live_classifier::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (predictor, normalizer) = PredictorBuilder::new()
//!     .model_path("models/mobilenet_v2.onnx")
//!     .labels_path("models/imagenet_labels.txt")
//!     .build_with_normalizer()?;
//!
//! let frame = load_image(Path::new("frame.jpg"))?;
//! let buffer = normalizer.normalize_rgb(&frame);
//!
//! match predictor.predict(&buffer, 2) {
//!     Prediction::Ranked(results) => {
//!         for result in results {
//!             println!("{}", result);
//!         }
//!     }
//!     Prediction::Busy => println!("frame dropped"),
//!     Prediction::Failed(err) => eprintln!("inference failed: {}", err),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust,no_run
//! use live_classifier::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PredictorConfig::from_json_str(r#"
//! {
//!   "model_path": "models/mobilenet_v2.onnx",
//!   "labels_path": "models/imagenet_labels.txt",
//!   "topk": 3,
//!   "ort_session": { "intra_threads": 2 }
//! }
//! "#)?;
//!
//! let predictor = PredictorBuilder::from_config(config).build()?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use live_classifier::prelude::*;
/// ```
///
/// Included items cover the common path from a frame to a ranked result. For
/// session tuning or custom models, import from [`core`](crate::core)
/// directly.
pub mod prelude {
    // Gate
    pub use crate::predictor::{Prediction, Predictor, PredictorBuilder};

    // Configuration and results
    pub use crate::core::{PredictionResult, PredictorConfig};

    // Error Handling
    pub use crate::core::{ClassifierError, ClassifierResult};

    // Frames
    pub use crate::processors::FrameNormalizer;
    pub use crate::utils::{LabelTable, load_image, load_images};
}
