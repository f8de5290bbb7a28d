use std::time::Duration;
use crate::common::{BvrBox, BvrDetection, BvrImage, DetectionLayout, ModelConfig};
use crate::data::{FrameLine, LabelMap, TimeCalc, Xs, X, CROSS_MARK};
use crate::detection_runners::image_ops;
use crate::detection_runners::inference_engine::InferenceEngine;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::serve::FrameDetector;
use crate::{BvrError, Result};

/// Single-shot detector with the TFLite post-processing baked into the graph: one tensor of
/// normalized `[ymin, xmin, ymax, xmax]` boxes, one of class indices and one of scores.
#[derive(Debug)]
pub struct BvrSsd<E> {
    engine: E,
    labels: LabelMap,
    layout: DetectionLayout,
    conf_threshold: f32,
    profile: bool,
    ts: TimeCalc,
}

impl<E: InferenceEngine> BvrSsd<E> {
    pub fn new(engine: E, labels: LabelMap, config: &ModelConfig) -> anyhow::Result<Self> {
        let outputs = engine.output_names();
        if config.layout.max_index() >= outputs.len() {
            anyhow::bail!(
                "{CROSS_MARK} Output indices {} do not fit the model, which has {} outputs {:?}",
                config.layout,
                outputs.len(),
                outputs
            );
        }
        if labels.is_empty() {
            log::warn!("Label map is empty, every detection above threshold will fail to resolve");
        }

        log::info!(
            "Detector ready | Boxes: '{}' | Classes: '{}' | Scores: '{}' | Labels: {} | Threshold: {}",
            outputs[config.layout.boxes],
            outputs[config.layout.classes],
            outputs[config.layout.scores],
            labels.len(),
            config.conf_threshold
        );

        Ok(Self {
            engine,
            labels,
            layout: config.layout,
            conf_threshold: config.conf_threshold,
            profile: config.profile,
            ts: TimeCalc::default(),
        })
    }

    /// Runs `n` forward passes on a blank frame so the first real frame doesn't pay for
    /// session warm-up. Outputs are discarded.
    pub fn warmup(&mut self, n: usize) -> anyhow::Result<()> {
        let spec = *self.engine.input_spec();
        let blank = BvrImage::blank(spec.width, spec.height);
        for i in 0..n {
            let x = self.preprocess(&blank)?;
            self.inference(x)?;
            log::debug!("Dry run {}/{} done", i + 1, n);
        }
        Ok(())
    }

    pub fn detect(&mut self, frame: &BvrImage) -> Result<Vec<BvrDetection>> {
        let profile = self.profile;
        self.forward(frame, profile)
    }

    /// Decodes one encoded image (JPEG, PNG, ...) and detects on it.
    pub fn detect_encoded(&mut self, encoded: &[u8]) -> Result<Vec<BvrDetection>> {
        let frame = BvrImage::decode(encoded)?;
        self.detect(&frame)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn ts(&self) -> &TimeCalc {
        &self.ts
    }
}

impl<E: InferenceEngine> InferenceProcess for BvrSsd<E> {
    type Input = BvrImage;
    type Output = Vec<BvrDetection>;

    fn preprocess(&self, x: &BvrImage) -> Result<X> {
        image_ops::preprocess(x, self.engine.input_spec())
    }

    fn inference(&mut self, x: X) -> Result<Xs> {
        self.engine.engine_run(x)
    }

    fn postprocess(&self, xs: Xs, x0: &BvrImage) -> Result<Vec<BvrDetection>> {
        postprocess_detections(
            &xs,
            &self.layout,
            &self.labels,
            self.conf_threshold,
            x0.get_img_width(),
            x0.get_img_height(),
        )
    }

    fn record_stage(&mut self, i: usize, elapsed: Duration) {
        self.ts.add_or_push(i, elapsed);
    }
}

impl<E: InferenceEngine> FrameDetector for BvrSsd<E> {
    fn detect_frame(&mut self, line: &FrameLine) -> Result<Vec<BvrDetection>> {
        let encoded = line.to_bytes()?;
        self.detect_encoded(&encoded)
    }

    fn timings(&self) -> Option<&TimeCalc> {
        Some(&self.ts)
    }
}

/// Turns the raw box/class/score tensors into detections on an `img_width` x `img_height` frame.
///
/// A slot is kept when `threshold < score <= 1.0`. Kept detections stay in model order.
pub fn postprocess_detections(
    xs: &Xs,
    layout: &DetectionLayout,
    labels: &LabelMap,
    threshold: f32,
    img_width: u32,
    img_height: u32,
) -> Result<Vec<BvrDetection>> {
    let boxes = xs.require(layout.boxes)?;
    let classes = xs.require(layout.classes)?;
    let scores = xs.require(layout.scores)?;

    // batch of one, so flattening is enough
    let boxes: Vec<f32> = boxes.iter().copied().collect();
    let classes: Vec<f32> = classes.iter().copied().collect();
    let scores: Vec<f32> = scores.iter().copied().collect();

    let n = scores.len();
    if classes.len() != n || boxes.len() % 4 != 0 || boxes.len() / 4 < n {
        return Err(BvrError::OutputShape(format!(
            "{} scores, {} classes and {} box values do not line up",
            n,
            classes.len(),
            boxes.len()
        )));
    }

    let mut detections = Vec::new();
    for (i, &score) in scores.iter().enumerate() {
        if !(threshold < score && score <= 1.0) {
            continue;
        }

        let row = [boxes[4 * i], boxes[4 * i + 1], boxes[4 * i + 2], boxes[4 * i + 3]];
        let bbox = BvrBox::from_normalized_yxyx(row, img_width, img_height);
        let (class_id, label) = labels.resolve(classes[i])?;

        detections.push(BvrDetection::new(class_id, bbox, label, score));
    }

    Ok(detections)
}
