//! File/code adapted from https://github.com/jamjamjon/usls

use ndarray::{Array, IxDyn};
use crate::{BvrError, Result};

/// Model outputs in the order the model declares them, each converted to `f32`.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    names: Vec<String>,
    values: Vec<Array<f32, IxDyn>>,
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push_kv(&mut self, name: &str, value: Array<f32, IxDyn>) {
        self.names.push(name.to_string());
        self.values.push(value);
    }

    pub fn get(&self, i: usize) -> Option<&Array<f32, IxDyn>> {
        self.values.get(i)
    }

    /// Output `i`, or an error naming the outputs that do exist.
    pub fn require(&self, i: usize) -> Result<&Array<f32, IxDyn>> {
        self.values.get(i).ok_or_else(|| {
            BvrError::OutputShape(format!(
                "model produced {} outputs {:?}, output #{} is missing",
                self.values.len(),
                self.names,
                i
            ))
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = Array<f32, IxDyn>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}
