use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates of the original frame.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct BvrBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w: f32,
    pub h: f32,
}

impl BvrBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// Builds a box from a normalized `[ymin, xmin, ymax, xmax]` row, scaled to an image of
    /// `img_width` x `img_height` pixels.
    ///
    /// The top-left corner is floored at 1 and the bottom-right corner is capped at the image
    /// size. A box that sits entirely outside the frame can therefore collapse (x2 <= x1).
    pub fn from_normalized_yxyx(row: [f32; 4], img_width: u32, img_height: u32) -> Self {
        let (w, h) = (img_width as f32, img_height as f32);
        let [ymin, xmin, ymax, xmax] = row;

        let y1 = (ymin * h).max(1.);
        let x1 = (xmin * w).max(1.);
        let y2 = (ymax * h).min(h);
        let x2 = (xmax * w).min(w);

        Self::new(x1, y1, x2, y2)
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f32 {
        self.w
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f32 {
        self.h
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.h * self.w
    }

    /// Whether the clamped box still has a positive extent on both axes.
    pub fn is_collapsed(&self) -> bool {
        self.w <= 0. || self.h <= 0.
    }

    /// Corners as `(x1, y1, x2, y2)`, truncated toward zero.
    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.x1.trunc() as i32,
         self.y1.trunc() as i32,
         self.x2.trunc() as i32,
         self.y2.trunc() as i32)
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)` and calculates width and height.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;

        self.w = x2 - x1;
        self.h = y2 - y1;
        self
    }
}
