mod utils;
mod error;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod serve;

use std::io::{BufRead, Write};
use std::time::Instant;
use anyhow::Context;
use crate::common::ModelConfig;
use crate::data::LabelMap;
use crate::detection_runners::{BvrSsd, OrtEngine};

pub use error::BvrError;
pub use serve::{serve, FrameDetector, ServeStats};

pub type Result<T, E = BvrError> = std::result::Result<T, E>;

/// Loads the model and label map described by `model_details` and warms the session up.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<BvrSsd<OrtEngine>> {
    model_details.validate()?;
    log::debug!("Model configuration:\n{}", model_details);

    let labels = LabelMap::load(&model_details.labels_path)?;

    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    let engine = OrtEngine::new(model_details)?;
    let mut detector = BvrSsd::new(engine, labels, model_details)?;

    let now = Instant::now();
    detector.warmup(model_details.num_dry_run).context("Warm-up run failed")?;
    log::info!("Warm-up ({} runs) took {:?}", model_details.num_dry_run, now.elapsed());

    Ok(detector)
}

/// Initializes the detector and serves `input` until end of stream.
pub fn run_bridge<R: BufRead, W: Write, E: Write>(
    model_details: &ModelConfig,
    input: R,
    output: W,
    diagnostics: E,
) -> anyhow::Result<ServeStats> {
    let mut detector = init_detector(model_details)?;
    serve(&mut detector, input, output, diagnostics)
}
