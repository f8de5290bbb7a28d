use std::fmt;
use crate::common::detection_layout::DetectionLayout;
use crate::common::inference_device::InferenceDevice;

pub const DEFAULT_WEIGHTS_PATH: &str = "best.onnx";
pub const DEFAULT_LABELS_PATH: &str = "labelmap.txt";
pub const DEFAULT_INPUT_SIZE: u32 = 320;
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;
pub const DEFAULT_INPUT_MEAN: f32 = 127.5;
pub const DEFAULT_INPUT_STD: f32 = 127.5;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: String,
    pub labels_path: String,
    pub ort_lib_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub layout: DetectionLayout,
    pub conf_threshold: f32,
    /// Input resolution used when the model leaves its spatial dimensions dynamic.
    pub width: u32,
    pub height: u32,
    pub input_mean: f32,
    pub input_std: f32,
    pub num_dry_run: usize,
    pub profile: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: DEFAULT_WEIGHTS_PATH.to_string(),
            labels_path: DEFAULT_LABELS_PATH.to_string(),
            ort_lib_path: None,
            inference_device: InferenceDevice::CPU,
            layout: DetectionLayout::default(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            input_mean: DEFAULT_INPUT_MEAN,
            input_std: DEFAULT_INPUT_STD,
            num_dry_run: 1,
            profile: false,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: &str, labels_path: &str) -> Self {
        Self {
            weights_path: weights_path.to_string(),
            labels_path: labels_path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: Option<String>) -> Self {
        self.ort_lib_path = ort_lib_path;
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_layout(mut self, layout: DetectionLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_threshold(mut self, conf_threshold: f32) -> Self {
        self.conf_threshold = conf_threshold;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_normalization(mut self, mean: f32, std: f32) -> Self {
        self.input_mean = mean;
        self.input_std = std;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn get_threshold(&self) -> f32 {
        self.conf_threshold
    }

    /// Checks the values that would otherwise only fail once frames start arriving.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.conf_threshold) {
            anyhow::bail!("Confidence threshold must be in [0, 1), got {}", self.conf_threshold);
        }
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("Model input resolution must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.input_std == 0. || !self.input_std.is_finite() || !self.input_mean.is_finite() {
            anyhow::bail!("Invalid input normalization: mean={} std={}", self.input_mean, self.input_std);
        }
        if !self.layout.is_distinct() {
            anyhow::bail!("Output indices must be distinct, got {}", self.layout);
        }
        Ok(())
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Output Layout (boxes,classes,scores): {}\n\
        Fallback Input Resolution: {}x{}\n\
        Input Normalization: mean={} std={}\n\
        Detection Threshold: {}",
               self.weights_path, self.labels_path,
               self.ort_lib_path.as_deref().unwrap_or("<default>"),
               self.inference_device, self.layout,
               self.width, self.height,
               self.input_mean, self.input_std, self.conf_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_artifact() {
        let config = ModelConfig::default();
        assert_eq!(config.weights_path, "best.onnx");
        assert_eq!(config.labels_path, "labelmap.txt");
        assert_eq!((config.width, config.height), (320, 320));
        assert_eq!(config.get_threshold(), 0.5);
        assert_eq!(config.layout, DetectionLayout::new(1, 3, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(ModelConfig::default().with_threshold(1.0).validate().is_err());
        assert!(ModelConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(ModelConfig::default().with_threshold(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_zero_std_and_size() {
        assert!(ModelConfig::default().with_normalization(127.5, 0.).validate().is_err());
        assert!(ModelConfig::default().with_input_size(0, 320).validate().is_err());
    }
}
