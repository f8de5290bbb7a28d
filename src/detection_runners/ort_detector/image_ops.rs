//! File adapted from: https://github.com/jamjamjon
//!
//! Functions to preprocess frames into model input tensors.

use fast_image_resize::{
    images::{Image as FirImage, ImageRef},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use ndarray::{Array, IxDyn};
use crate::common::BvrImage;
use crate::data::X;
use crate::Result;

/// Element type the model expects on its image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// `f32`, normalized with `(raw - mean) / std`.
    Float32,
    /// `u8`, raw pixel values.
    Uint8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[1, H, W, 3]`, the layout TFLite-derived detectors use.
    Nhwc,
    /// `[1, 3, H, W]`
    Nchw,
}

/// Everything preprocessing needs to know about the model's image input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSpec {
    pub ty: InputType,
    pub layout: InputLayout,
    pub width: u32,
    pub height: u32,
    pub mean: f32,
    pub std: f32,
}

impl InputSpec {
    pub fn new(ty: InputType, layout: InputLayout, width: u32, height: u32) -> Self {
        Self {
            ty,
            layout,
            width,
            height,
            mean: 127.5,
            std: 127.5,
        }
    }

    pub fn with_normalization(mut self, mean: f32, std: f32) -> Self {
        self.mean = mean;
        self.std = std;
        self
    }

    /// Full input shape, batch of one.
    pub fn shape(&self) -> [usize; 4] {
        let (h, w) = (self.height as usize, self.width as usize);
        match self.layout {
            InputLayout::Nhwc => [1, h, w, 3],
            InputLayout::Nchw => [1, 3, h, w],
        }
    }
}

/// Main preprocessing entry point: resize to the model resolution and lay the pixels out
/// the way the model wants them.
pub fn preprocess(frame: &BvrImage, spec: &InputSpec) -> Result<X> {
    let resized = resize_image(frame, spec.width, spec.height)?;
    let buf = resized.buffer();

    let x = match spec.ty {
        InputType::Float32 => {
            let (mean, std) = (spec.mean, spec.std);
            let data = arrange(buf, spec, |v| (v as f32 - mean) / std);
            X::from(Array::from_shape_vec(IxDyn(&spec.shape()), data)?)
        }
        InputType::Uint8 => {
            let data = arrange(buf, spec, |v| v);
            X::from(Array::from_shape_vec(IxDyn(&spec.shape()), data)?)
        }
    };

    Ok(x)
}

fn resize_image<'a>(frame: &BvrImage, target_w: u32, target_h: u32) -> Result<FirImage<'a>> {
    let src = ImageRef::new(frame.width(), frame.height(), frame.as_raw(), PixelType::U8x3)?;
    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom));
    let mut resizer = Resizer::new();
    resizer.resize(&src, &mut dst, &options)?;

    Ok(dst)
}

/// Maps every subpixel of an interleaved RGB buffer through `f`, in the model's input layout.
fn arrange<T: Copy + Default>(buf: &[u8], spec: &InputSpec, f: impl Fn(u8) -> T) -> Vec<T> {
    match spec.layout {
        InputLayout::Nhwc => buf.iter().map(|&v| f(v)).collect(),
        InputLayout::Nchw => {
            let hw = buf.len() / 3;
            let mut out = vec![T::default(); buf.len()];
            for i in 0..hw {
                out[i] = f(buf[3 * i]);             // Channel 0
                out[i + hw] = f(buf[3 * i + 1]);    // Channel 1
                out[i + 2 * hw] = f(buf[3 * i + 2]); // Channel 2
            }
            out
        }
    }
}
