use std::path::Path;
use anyhow::Context;
use crate::{BvrError, Result};

/// Ordered class names; the class id is the 0-based line number in the label file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl From<Vec<String>> for LabelMap {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl From<&[&str]> for LabelMap {
    fn from(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|x| x.to_string()).collect(),
        }
    }
}

impl LabelMap {
    /// Reads a newline-delimited label file. Every line is trimmed; empty lines are kept so
    /// that the remaining labels keep their index.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read label map from '{}'", path.display()))?;

        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        Self {
            names: content.lines().map(|s| s.trim().to_string()).collect(),
        }
    }

    /// Resolves a raw class value from the model. The value is truncated toward zero first,
    /// matching how the model's float class tensor is read.
    pub fn resolve(&self, class_value: f32) -> Result<(usize, &str)> {
        if !class_value.is_finite() {
            return Err(BvrError::OutputShape(format!("non-finite class value {class_value}")));
        }
        let class_id = class_value.trunc() as i64;
        usize::try_from(class_id)
            .ok()
            .and_then(|idx| self.names.get(idx).map(|name| (idx, name.as_str())))
            .ok_or(BvrError::UnknownClass {
                class_id,
                labels: self.names.len(),
            })
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_label_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cat").unwrap();
        writeln!(file, "  dog \r").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "bird").unwrap();

        let labels = LabelMap::load(file.path()).unwrap();
        assert_eq!(labels.names(), &["cat", "dog", "", "bird"]);
        assert_eq!(labels.get(3), Some("bird"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelMap::load(dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn resolves_float_class_values() {
        let labels = LabelMap::from(&["cat", "dog"][..]);
        assert_eq!(labels.resolve(1.0).unwrap(), (1, "dog"));
        assert_eq!(labels.resolve(0.7).unwrap(), (0, "cat"));
    }

    #[test]
    fn out_of_range_class_is_an_error() {
        let labels = LabelMap::from(&["cat", "dog"][..]);
        assert!(matches!(labels.resolve(2.0), Err(BvrError::UnknownClass { class_id: 2, labels: 2 })));
        assert!(matches!(labels.resolve(-1.0), Err(BvrError::UnknownClass { class_id: -1, .. })));
        assert!(matches!(labels.resolve(f32::NAN), Err(BvrError::OutputShape(_))));
    }
}
