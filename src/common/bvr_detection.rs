use serde::{Deserialize, Serialize};
use crate::common::BvrBox;

/// One detection as it is written to the host, one JSON object per detection.
///
/// Field names and order are part of the output protocol.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct BvrDetection {
    pub object_name: String,
    pub confidence: f32,
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
    #[serde(skip)]
    pub class_id: usize,
}

impl BvrDetection {
    pub fn new(class_id: usize, bbox: BvrBox, label: &str, confidence: f32) -> Self {
        Self::default()
            .with_class_id(class_id)
            .with_bbox(bbox)
            .with_label(label)
            .with_confidence(confidence)
    }

    /// Sets the pixel corners from a [`BvrBox`], truncating toward zero.
    pub fn with_bbox(mut self, bbox: BvrBox) -> Self {
        let (xmin, ymin, xmax, ymax) = bbox.as_x1y1_x2y2_i32();
        self.xmin = xmin;
        self.ymin = ymin;
        self.xmax = xmax;
        self.ymax = ymax;
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.object_name = label.to_string();
        self
    }

    /// Returns the bounding box as `(x, y, w, h)`.
    pub fn as_xy_wh_i32(&self) -> (i32, i32, i32, i32) {
        (self.xmin, self.ymin, self.xmax - self.xmin, self.ymax - self.ymin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_protocol_order() {
        let det = BvrDetection::new(1, BvrBox::new(32., 32., 160., 160.), "dog", 0.9);
        let json = serde_json::to_string(&det).unwrap();
        assert_eq!(json, r#"{"object_name":"dog","confidence":0.9,"xmin":32,"ymin":32,"xmax":160,"ymax":160}"#);
    }

    #[test]
    fn class_id_is_not_serialized() {
        let det = BvrDetection::default().with_class_id(7).with_label("kite");
        let value: serde_json::Value = serde_json::to_value(&det).unwrap();
        assert!(value.get("class_id").is_none());
        assert_eq!(value["object_name"], "kite");
    }

    #[test]
    fn xy_wh_from_corners() {
        let det = BvrDetection::default().with_bbox(BvrBox::new(10., 20., 50., 80.));
        assert_eq!(det.as_xy_wh_i32(), (10, 20, 40, 60));
    }
}
