//! Live Classification Demo
//!
//! Treats each input image as a camera frame: every frame is normalized and
//! offered to the inference gate, and the top prediction of each served frame
//! is printed. With more than one worker, frames are offered concurrently and
//! the ones that arrive while the model is busy are dropped.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin live_classify -- [OPTIONS] <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-m, --model-path` - Path to the ONNX classification model
//! * `-l, --labels-path` - Path to the newline-delimited label file
//! * `-c, --config` - JSON configuration file; explicit flags take precedence
//! * `--topk` - Number of ranked results per frame
//! * `--device` - Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0', 'coreml')
//! * `--workers` - Number of threads offering frames to the gate
//! * `<IMAGES>...` - Images standing in for camera frames
//!
//! # Example
//!
//! ```bash
//! cargo run --bin live_classify -- \
//!     -m models/mobilenet_v2.onnx \
//!     -l models/imagenet_labels.txt \
//!     --workers 4 \
//!     frame1.jpg frame2.jpg frame3.jpg
//! ```

use clap::Parser;
use live_classifier::core::OrtSessionConfig;
use live_classifier::prelude::*;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

/// Command-line arguments for the live classification demo
#[derive(Parser)]
#[command(name = "live_classify")]
#[command(about = "Live classification demo - ranks frames through a single-flight inference gate")]
struct Args {
    /// Path to the ONNX classification model
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// Path to the newline-delimited label file
    #[arg(short, long)]
    labels_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Images standing in for camera frames
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Number of ranked results per frame (default: 2)
    #[arg(long)]
    topk: Option<usize>,

    /// Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0', 'coreml', 'xnnpack')
    #[arg(long)]
    device: Option<String>,

    /// Number of threads offering frames to the gate
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Layers explicit flags over the optional JSON file.
    fn predictor_config(&self) -> ClassifierResult<PredictorConfig> {
        let base = match &self.config {
            Some(path) => PredictorConfig::from_json_file(path)?,
            None => PredictorConfig::default(),
        };

        let mut ort_session = base.ort_session.clone();
        if let Some(device) = &self.device {
            let providers = OrtSessionConfig::for_device(device)?.execution_providers;
            ort_session.get_or_insert_with(OrtSessionConfig::default).execution_providers =
                providers;
        }

        let explicit = PredictorConfig {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            topk: self.topk,
            ort_session,
            ..PredictorConfig::default()
        };
        Ok(explicit.or(base))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    live_classifier::utils::init_tracing();

    let args = Args::parse();

    info!("Live Classification Demo");

    if args.workers == 0 {
        error!("--workers must be at least 1");
        return Err("Invalid worker count".into());
    }

    let config = args.predictor_config()?;
    let topk = config.effective_topk();

    if args.verbose {
        info!("Predictor Configuration:");
        if let Some(path) = &config.model_path {
            info!("  Model: {}", path.display());
        }
        if let Some(path) = &config.labels_path {
            info!("  Labels: {}", path.display());
        }
        info!("  Top-k: {}", topk);
        info!("  Workers: {}", args.workers);
        if let Some(ort) = &config.ort_session {
            info!("  ORT session: {:?}", ort);
        }
    }

    let (predictor, normalizer) = PredictorBuilder::from_config(config).build_with_normalizer()?;
    info!(
        "Predictor built: '{}' with {} labels, input {:?}",
        predictor.model_name(),
        predictor.labels().len(),
        normalizer.input_size()
    );

    // Decode every frame up front so the gate only ever sees ready buffers.
    let frames: Vec<(PathBuf, Vec<f32>)> = args
        .images
        .iter()
        .zip(load_images(&args.images))
        .filter_map(|(path, loaded)| match loaded {
            Ok(image) => {
                if args.verbose {
                    info!(
                        "Loaded frame: {} ({}x{})",
                        path.display(),
                        image.width(),
                        image.height()
                    );
                }
                Some((path.clone(), normalizer.normalize_rgb(&image)))
            }
            Err(e) => {
                error!("Failed to load frame {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    if frames.is_empty() {
        error!("No frames could be loaded for processing");
        return Err("No frames could be loaded".into());
    }

    info!(
        "Offering {} frames to the gate from {} worker(s)...",
        frames.len(),
        args.workers
    );
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build()?;
    let outcomes: Vec<(&PathBuf, Prediction)> = pool.install(|| {
        frames
            .par_iter()
            .map(|(path, buffer)| (path, predictor.predict(buffer, topk)))
            .collect()
    });

    info!("Processed frames in {:.2?}", start.elapsed());

    for (path, outcome) in outcomes {
        match outcome {
            Prediction::Ranked(results) => match results.first() {
                Some(top) => {
                    println!("{}: {}", path.display(), top);
                    if args.verbose {
                        for (rank, result) in results.iter().enumerate().skip(1) {
                            info!("  #{} {}", rank + 1, result);
                        }
                    }
                }
                None => warn!("{}: no classes ranked", path.display()),
            },
            Prediction::Busy => info!("{}: dropped (gate busy)", path.display()),
            Prediction::Failed(e) => error!("{}: inference failed: {}", path.display(), e),
        }
    }

    info!("{}", predictor.stats());
    Ok(())
}
