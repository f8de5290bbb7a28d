#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::{Array, IxDyn};
use bvr_bridge::common::ModelConfig;
use bvr_bridge::data::{InputLayout, InputSpec, InputType, LabelMap, Xs, X};
use bvr_bridge::detection_runners::{BvrSsd, InferenceEngine};
use bvr_bridge::{BvrError, Result};

/// Stands in for the ONNX session: replays scripted outputs and keeps every input it was fed.
#[derive(Debug)]
pub struct FakeEngine {
    spec: InputSpec,
    names: Vec<String>,
    script: VecDeque<Result<Xs>>,
    fallback: Xs,
    pub inputs: Vec<X>,
}

impl FakeEngine {
    pub fn new(ty: InputType) -> Self {
        Self {
            spec: InputSpec::new(ty, InputLayout::Nhwc, 320, 320),
            names: ["scores", "boxes", "count", "classes"].map(String::from).to_vec(),
            script: VecDeque::new(),
            fallback: ssd_outputs(&[], &[], &[]),
            inputs: Vec::new(),
        }
    }

    /// Output for every run once the script is used up.
    pub fn replying(mut self, xs: Xs) -> Self {
        self.fallback = xs;
        self
    }

    pub fn then(mut self, reply: Result<Xs>) -> Self {
        self.script.push_back(reply);
        self
    }

    pub fn runs(&self) -> usize {
        self.inputs.len()
    }
}

impl InferenceEngine for FakeEngine {
    fn input_spec(&self) -> &InputSpec {
        &self.spec
    }

    fn output_names(&self) -> &[String] {
        &self.names
    }

    fn engine_run(&mut self, x: X) -> Result<Xs> {
        self.inputs.push(x);
        match self.script.pop_front() {
            Some(reply) => reply,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Outputs in the order of a converted TFLite SSD: scores, boxes, count, classes.
pub fn ssd_outputs(boxes: &[[f32; 4]], classes: &[f32], scores: &[f32]) -> Xs {
    let n = scores.len();
    let flat: Vec<f32> = boxes.iter().flatten().copied().collect();
    let mut xs = Xs::new();
    xs.push_kv("scores", Array::from_shape_vec(IxDyn(&[1, n]), scores.to_vec()).unwrap());
    xs.push_kv("boxes", Array::from_shape_vec(IxDyn(&[1, boxes.len(), 4]), flat).unwrap());
    xs.push_kv("count", Array::from_elem(IxDyn(&[1]), n as f32));
    xs.push_kv("classes", Array::from_shape_vec(IxDyn(&[1, classes.len()]), classes.to_vec()).unwrap());
    xs
}

pub fn engine_failure() -> Result<Xs> {
    Err(BvrError::OutputShape("session lost".to_string()))
}

pub fn detector(engine: FakeEngine, labels: &[&str]) -> BvrSsd<FakeEngine> {
    BvrSsd::new(engine, LabelMap::from(labels), &ModelConfig::default()).unwrap()
}

pub fn solid(width: u32, height: u32, px: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(px))
}

pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&solid(width, height, [90, 120, 200]), ImageFormat::Png)
}
