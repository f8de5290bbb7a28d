use std::io;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use bvr_bridge::common::{
    DetectionLayout, InferenceDevice, ModelConfig, DEFAULT_CONF_THRESHOLD, DEFAULT_INPUT_MEAN,
    DEFAULT_INPUT_SIZE, DEFAULT_INPUT_STD, DEFAULT_LABELS_PATH, DEFAULT_WEIGHTS_PATH,
};

/// Reads encoded images as comma-separated byte lines on stdin and writes one JSON line of
/// detections per image on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ONNX model file
    #[arg(long, env = "BVR_MODEL", default_value = DEFAULT_WEIGHTS_PATH)]
    model: String,

    /// Label map, one class name per line
    #[arg(long, env = "BVR_LABELS", default_value = DEFAULT_LABELS_PATH)]
    labels: String,

    /// ONNX Runtime shared library to load
    #[arg(long = "ort-lib", env = "ORT_DYLIB_PATH")]
    ort_lib: Option<String>,

    /// Execution provider
    #[arg(long, env = "BVR_DEVICE", default_value = "cpu",
          value_parser = clap::builder::PossibleValuesParser::new(InferenceDevice::all_inference_devices()))]
    device: String,

    /// Accelerator ordinal for cuda and tensorrt
    #[arg(long = "device-id", env = "BVR_DEVICE_ID", default_value_t = 0)]
    device_id: usize,

    /// Minimum confidence, exclusive
    #[arg(long, env = "BVR_THRESHOLD", default_value_t = DEFAULT_CONF_THRESHOLD)]
    threshold: f32,

    /// Input width when the model leaves it dynamic
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    width: u32,

    /// Input height when the model leaves it dynamic
    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    height: u32,

    /// Float models only
    #[arg(long = "input-mean", default_value_t = DEFAULT_INPUT_MEAN)]
    input_mean: f32,

    /// Float models only
    #[arg(long = "input-std", default_value_t = DEFAULT_INPUT_STD)]
    input_std: f32,

    /// Output indices of the boxes, classes and scores tensors
    #[arg(long, env = "BVR_OUTPUTS", default_value = "1,3,0")]
    outputs: DetectionLayout,

    /// Warm-up passes before serving
    #[arg(long = "dry-runs", default_value_t = 1)]
    dry_runs: usize,

    /// Log per-frame stage timings
    #[arg(long)]
    profile: bool,
}

impl Args {
    fn model_config(&self) -> anyhow::Result<ModelConfig> {
        let device = InferenceDevice::from_str(&self.device, self.device_id)
            .with_context(|| format!("Unknown device '{}'", self.device))?;

        Ok(ModelConfig::new(&self.model, &self.labels)
            .with_ort_lib_path(self.ort_lib.clone())
            .with_device(device)
            .with_layout(self.outputs)
            .with_threshold(self.threshold)
            .with_input_size(self.width, self.height)
            .with_normalization(self.input_mean, self.input_std)
            .with_dry_run(self.dry_runs)
            .with_profile(self.profile))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.model_config()?;

    let stats = bvr_bridge::run_bridge(&config, io::stdin().lock(), io::stdout().lock(), io::stderr())?;

    log::info!("Input closed. {}", stats);
    Ok(())
}
