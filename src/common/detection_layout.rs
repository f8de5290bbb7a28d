use std::fmt;
use std::str::FromStr;

/// Which model outputs hold the boxes, class indices and scores.
///
/// SSD-style detectors exported from TFLite do not name their outputs in a way that can be
/// relied on, so the positions are part of the model's configuration. The default matches
/// the ordering of the stock TFLite detection postprocess op as exported by the training
/// pipeline: scores, boxes, count, classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionLayout {
    pub boxes: usize,
    pub classes: usize,
    pub scores: usize,
}

impl Default for DetectionLayout {
    fn default() -> Self {
        Self {
            boxes: 1,
            classes: 3,
            scores: 0,
        }
    }
}

impl DetectionLayout {
    pub fn new(boxes: usize, classes: usize, scores: usize) -> Self {
        Self { boxes, classes, scores }
    }

    /// Largest output index referenced by this layout.
    pub fn max_index(&self) -> usize {
        self.boxes.max(self.classes).max(self.scores)
    }

    pub fn is_distinct(&self) -> bool {
        self.boxes != self.classes && self.boxes != self.scores && self.classes != self.scores
    }
}

/// Parses `"boxes,classes,scores"`, e.g. `"1,3,0"`.
impl FromStr for DetectionLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let idx: Vec<usize> = s
            .split(',')
            .map(|x| x.trim().parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid output index in '{s}': {e}"))?;

        match idx[..] {
            [boxes, classes, scores] => {
                let layout = Self::new(boxes, classes, scores);
                if !layout.is_distinct() {
                    return Err(format!("output indices must be distinct, got '{s}'"));
                }
                Ok(layout)
            }
            _ => Err(format!("expected three indices 'boxes,classes,scores', got '{s}'")),
        }
    }
}

impl fmt::Display for DetectionLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.boxes, self.classes, self.scores)
    }
}
