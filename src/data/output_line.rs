use serde::{Deserialize, Serialize};
use crate::common::BvrDetection;

/// What gets written back to the host for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputLine {
    Detections(Vec<BvrDetection>),
    Error { error: String },
}

impl OutputLine {
    pub fn error(err: impl std::fmt::Display) -> Self {
        OutputLine::Error { error: err.to_string() }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Vec<BvrDetection>> for OutputLine {
    fn from(detections: Vec<BvrDetection>) -> Self {
        OutputLine::Detections(detections)
    }
}
