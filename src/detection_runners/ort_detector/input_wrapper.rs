//! File/code adapted from https://github.com/jamjamjon/usls

use ndarray::{Array, IxDyn};

/// Model input. Float models get normalized values; quantized models get the raw pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum X {
    Float(Array<f32, IxDyn>),
    Quantized(Array<u8, IxDyn>),
}

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self::Float(x)
    }
}

impl From<Array<u8, IxDyn>> for X {
    fn from(x: Array<u8, IxDyn>) -> Self {
        Self::Quantized(x)
    }
}

impl X {
    pub fn shape(&self) -> &[usize] {
        match self {
            X::Float(x) => x.shape(),
            X::Quantized(x) => x.shape(),
        }
    }

    pub fn is_quantized(&self) -> bool {
        matches!(self, X::Quantized(_))
    }

    pub fn as_float(&self) -> Option<&Array<f32, IxDyn>> {
        match self {
            X::Float(x) => Some(x),
            X::Quantized(_) => None,
        }
    }

    pub fn as_quantized(&self) -> Option<&Array<u8, IxDyn>> {
        match self {
            X::Quantized(x) => Some(x),
            X::Float(_) => None,
        }
    }
}
